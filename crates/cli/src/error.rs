use thiserror::Error;

/// Errors raised by the shell. Everything except [`ShellError::Binding`] is
/// detected before any native call is made.
#[derive(Debug, Error)]
pub enum ShellError {
    /// An argument has the wrong shape: a handle of the wrong kind, an
    /// unknown handle, a malformed string.
    #[error("type error: {0}")]
    Type(String),

    #[error("arity mismatch: {command} expects {expected} argument(s), got {got}")]
    Arity {
        command: String,
        expected: usize,
        got: usize,
    },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Binding(#[from] binding::Error),
}
