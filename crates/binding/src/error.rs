use std::fmt;
use thiserror::Error;

/// The kind of native resource an operation was attempted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Database,
    Iterator,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Database => f.write_str("database"),
            Resource::Iterator => f.write_str("iterator"),
        }
    }
}

/// Errors surfaced by database and iterator operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The wrapped engine reported a failure. The message is the engine's,
    /// unchanged.
    #[error("{0}")]
    Engine(String),

    /// The database or iterator has been closed.
    #[error("{0} is not open")]
    NotOpen(Resource),

    /// A key or value was read while the cursor was not on an entry.
    #[error("invalid iterator")]
    InvalidPosition,
}

impl From<sled::Error> for Error {
    fn from(e: sled::Error) -> Self {
        Error::Engine(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
