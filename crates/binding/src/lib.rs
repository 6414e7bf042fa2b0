//! # Binding - handle-safe access to an embedded key-value engine
//!
//! Exposes the `sled` engine through two native handle types, [`Database`]
//! and [`DbIterator`], whose lifecycle is safe no matter in which order a
//! host closes or finalizes them.
//!
//! ## Lifecycle
//!
//! ```text
//!   open(path) ──► Database ──iter()──► DbIterator (0..n)
//!                     │                      │
//!                 close / drop           close / drop
//!                     │                      │
//!                     ▼                      ▼
//!                  Closed ─── invalidates ──► Closed
//! ```
//!
//! Both types share a two-state machine, `Open -> Closed`, and closing is
//! idempotent. A database owns its engine handle; iterators only observe it
//! weakly and pin it for the length of one call. Closing a database releases
//! the engine once calls already in flight return, and an iterator created
//! from it reports [`Error::NotOpen`] from then on. Closing such an orphaned iterator never hands its cursor back to the
//! engine, because the engine is already gone.
//!
//! | Module       | Purpose                                              |
//! |--------------|------------------------------------------------------|
//! | [`liveness`] | Open/Closed token with compare-and-swap close        |
//! | `engine`     | Calls into `sled`, cursor accounting                 |
//! | `database`   | [`Database`]: open, close, put, get, delete, iter    |
//! | `iterator`   | [`DbIterator`]: seek, next, prev, key, value, close  |
//! | `error`      | [`Error`] taxonomy                                   |
//!
//! ## Example
//!
//! ```rust,no_run
//! use binding::Database;
//!
//! let mut db = Database::open("data/db").unwrap();
//! db.put(b"name", b"alice").unwrap();
//!
//! let mut it = db.iter().unwrap();
//! it.seek_first().unwrap();
//! while it.valid().unwrap() {
//!     println!("{:?} = {:?}", it.key().unwrap(), it.value().unwrap());
//!     it.next().unwrap();
//! }
//!
//! db.close().unwrap();
//! it.close(); // fine: the database already released the cursor
//! ```
mod database;
mod engine;
mod error;
mod iterator;
pub mod liveness;

use std::path::Path;
use tracing::debug;

pub use config::Options;
pub use database::Database;
pub use error::{Error, Resource, Result};
pub use iterator::DbIterator;

/// Irreversibly removes all on-disk state at `path`.
///
/// Does not need (and does not look at) any open [`Database`]. Destroying a
/// path that is currently open is a caller error.
///
/// # Errors
///
/// [`Error::Engine`] if the files cannot be removed.
pub fn destroy<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), "destroying database");
    engine::Engine::destroy(path)
}

#[cfg(test)]
mod tests;
