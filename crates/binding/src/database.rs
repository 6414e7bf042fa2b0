use config::Options;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::engine::Engine;
use crate::error::{Error, Resource, Result};
use crate::iterator::DbIterator;
use crate::liveness::Liveness;

/// An open connection to an engine database.
///
/// The database owns its engine handle. Iterators created from it keep weak
/// references and pin the engine only for the length of a single call, so
/// after [`Database::close`] the engine is released as soon as any iterator
/// call already in flight on another thread returns. Those iterators then
/// report [`Error::NotOpen`].
///
/// Dropping a `Database` runs the same path as [`Database::close`].
pub struct Database {
    path: PathBuf,
    options: Options,
    liveness: Liveness,
    engine: Option<Arc<Engine>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .field("options", &self.options)
            .field("engine", &self.engine)
            .finish()
    }
}

impl Database {
    /// Opens (creating if absent) the database at `path` with default options.
    ///
    /// # Errors
    ///
    /// [`Error::Engine`] with the engine's message if the open fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, Options::default())
    }

    /// Opens the database at `path` with explicit options.
    pub fn open_with<P: AsRef<Path>>(path: P, options: Options) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "opening database");
        let engine = Engine::open(&path, &options)?;

        Ok(Self {
            path,
            options,
            liveness: Liveness::new(),
            engine: Some(Arc::new(engine)),
        })
    }

    /// Closes the database. Calling it again is a no-op.
    ///
    /// The closed flag is set before the engine handle is released, so a
    /// concurrent or later close never releases twice. Any iterator created
    /// from this database becomes unusable.
    ///
    /// # Errors
    ///
    /// [`Error::Engine`] if the final flush fails. The database is closed
    /// regardless.
    pub fn close(&mut self) -> Result<()> {
        if !self.liveness.close() {
            return Ok(());
        }
        debug!(path = %self.path.display(), "closing database");

        match self.engine.take() {
            Some(engine) => {
                let flushed = engine.flush();
                drop(engine);
                flushed
            }
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.liveness.is_open()
    }

    /// Where the database lives on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The options the database was opened with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    fn engine(&self) -> Result<&Arc<Engine>> {
        if !self.liveness.is_open() {
            return Err(Error::NotOpen(Resource::Database));
        }
        self.engine
            .as_ref()
            .ok_or(Error::NotOpen(Resource::Database))
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.engine()?.put(key, value)
    }

    /// Looks up `key`.
    ///
    /// Returns `None` when the key is absent (never written, or deleted) and
    /// `Some` with the exact stored bytes otherwise, which may be empty.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.engine()?.get(key)
    }

    /// Removes `key`. Removing a missing key succeeds.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.engine()?.delete(key)
    }

    /// Forces buffered writes to disk.
    pub fn flush(&self) -> Result<()> {
        self.engine()?.flush()
    }

    /// Creates an unpositioned iterator over this database.
    pub fn iter(&self) -> Result<DbIterator> {
        let engine = self.engine()?;
        Ok(DbIterator::new(engine, self.liveness.watch()))
    }

    /// Number of iterator cursors the engine has handed out for this database
    /// and not yet taken back.
    pub fn live_iterators(&self) -> Result<usize> {
        Ok(self.engine()?.live_cursors())
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(path = %self.path.display(), error = %e, "close during drop failed");
        }
    }
}
