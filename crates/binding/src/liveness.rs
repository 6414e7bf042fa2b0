//! Open/Closed tracking shared between a resource and its observers.
//!
//! A [`Liveness`] is owned by exactly one resource. Closing it is a single
//! compare-and-swap, so when an explicit close races a finalizer only one of
//! them gets `true` back and goes on to release the native handle.
//!
//! Children observe their parent through a [`Watch`], which holds a weak
//! reference: it never keeps the parent's state alive and reads as closed
//! once the parent is gone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

#[derive(Debug)]
pub struct Liveness {
    open: Arc<AtomicBool>,
}

impl Liveness {
    pub fn new() -> Self {
        Self {
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Flips Open -> Closed. Returns `true` only for the caller that performed
    /// the transition; every later (or concurrent, losing) caller gets `false`
    /// and must not release anything.
    #[must_use = "only the caller that wins the close may release the handle"]
    pub fn close(&self) -> bool {
        self.open
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns a non-owning observer of this token.
    pub fn watch(&self) -> Watch {
        Watch {
            open: Arc::downgrade(&self.open),
        }
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Weak observer of another resource's [`Liveness`].
#[derive(Debug, Clone)]
pub struct Watch {
    open: Weak<AtomicBool>,
}

impl Watch {
    /// `false` once the observed resource is closed or dropped.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
            .upgrade()
            .is_some_and(|open| open.load(Ordering::Acquire))
    }
}
