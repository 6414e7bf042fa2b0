use std::sync::{Arc, Weak};
use tracing::debug;

use crate::engine::{Cursor, Engine};
use crate::error::{Error, Resource, Result};
use crate::liveness::{Liveness, Watch};

/// A cursor over a database's keyspace, in ascending byte order of keys.
///
/// The iterator does not keep its database alive. Every call first checks
/// its own state and then the parent's; once either is closed all calls fail
/// with [`Error::NotOpen`].
///
/// Moving past either end of the keyspace is not an error: the cursor just
/// becomes invalid, and [`DbIterator::key`] / [`DbIterator::value`] report
/// [`Error::InvalidPosition`] until it is seeked again.
///
/// The iterator is not a snapshot. A seek or move copies the entry it lands
/// on, and [`DbIterator::key`] / [`DbIterator::value`] return that copy even
/// if the entry is overwritten or deleted afterwards. The next move starts
/// from the copied key and reads the database as it is at that moment.
#[derive(Debug)]
pub struct DbIterator {
    liveness: Liveness,
    parent: Watch,
    engine: Weak<Engine>,
    cursor: Option<Cursor>,
}

impl DbIterator {
    pub(crate) fn new(engine: &Arc<Engine>, parent: Watch) -> Self {
        let cursor = engine.create_cursor();
        Self {
            liveness: Liveness::new(),
            parent,
            engine: Arc::downgrade(engine),
            cursor: Some(cursor),
        }
    }

    /// `true` once this iterator or its database has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.liveness.is_open() || !self.parent.is_open()
    }

    fn cursor(&self) -> Result<&Cursor> {
        if self.is_closed() {
            return Err(Error::NotOpen(Resource::Iterator));
        }
        self.cursor.as_ref().ok_or(Error::NotOpen(Resource::Iterator))
    }

    /// Checks liveness and pins the engine for the duration of one call.
    fn parts(&mut self) -> Result<(Arc<Engine>, &mut Cursor)> {
        if self.is_closed() {
            return Err(Error::NotOpen(Resource::Iterator));
        }
        let engine = self
            .engine
            .upgrade()
            .ok_or(Error::NotOpen(Resource::Iterator))?;
        let cursor = self
            .cursor
            .as_mut()
            .ok_or(Error::NotOpen(Resource::Iterator))?;
        Ok((engine, cursor))
    }

    pub fn seek_first(&mut self) -> Result<()> {
        let (engine, cursor) = self.parts()?;
        engine.seek_first(cursor)
    }

    pub fn seek_last(&mut self) -> Result<()> {
        let (engine, cursor) = self.parts()?;
        engine.seek_last(cursor)
    }

    /// Positions at the first key greater than or equal to `key`.
    pub fn seek(&mut self, key: &[u8]) -> Result<()> {
        let (engine, cursor) = self.parts()?;
        engine.seek(cursor, key)
    }

    /// Moves to the next key. A no-op on an invalid cursor.
    pub fn next(&mut self) -> Result<()> {
        let (engine, cursor) = self.parts()?;
        engine.next(cursor)
    }

    /// Moves to the previous key. A no-op on an invalid cursor.
    pub fn prev(&mut self) -> Result<()> {
        let (engine, cursor) = self.parts()?;
        engine.prev(cursor)
    }

    pub fn valid(&self) -> Result<bool> {
        Ok(self.cursor()?.is_valid())
    }

    /// Copy of the key under the cursor.
    pub fn key(&self) -> Result<Vec<u8>> {
        self.cursor()?
            .key()
            .map(<[u8]>::to_vec)
            .ok_or(Error::InvalidPosition)
    }

    /// Copy of the value under the cursor.
    pub fn value(&self) -> Result<Vec<u8>> {
        self.cursor()?
            .value()
            .map(<[u8]>::to_vec)
            .ok_or(Error::InvalidPosition)
    }

    /// Closes the iterator. Calling it again is a no-op.
    ///
    /// The cursor goes back to the engine only while the database is still
    /// open. Once the database has closed, the engine has already let go of
    /// everything it handed out, so only the local flag changes.
    pub fn close(&mut self) {
        if !self.liveness.close() {
            return;
        }
        let cursor = self.cursor.take();

        if !self.parent.is_open() {
            debug!("database already closed; skipping cursor release");
            return;
        }
        if let (Some(engine), Some(cursor)) = (self.engine.upgrade(), cursor) {
            engine.release_cursor(cursor);
        }
    }
}

impl Drop for DbIterator {
    fn drop(&mut self) {
        self.close();
    }
}
