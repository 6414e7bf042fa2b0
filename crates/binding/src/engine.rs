/// Thin wrapper over the `sled` engine.
///
/// Everything that talks to the wrapped library lives here; `Database` and
/// `DbIterator` only decide *whether* a call may happen. Cursors are owned
/// by their iterator but accounted for here, so the engine knows how many it
/// has handed out and which ones were given back.
use config::Options;
use sled::IVec;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

use crate::error::{Error, Result};

pub(crate) struct Engine {
    db: sled::Db,
    path: PathBuf,
    live_cursors: AtomicUsize,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("path", &self.path)
            .field("entries", &self.db.len())
            .field("live_cursors", &self.live_cursors())
            .finish()
    }
}

/// A position in the keyspace. `entry` is `None` while the cursor is not on
/// a valid entry (never seeked, or moved past either end).
#[derive(Debug, Default)]
pub(crate) struct Cursor {
    entry: Option<(IVec, IVec)>,
}

impl Cursor {
    pub(crate) fn is_valid(&self) -> bool {
        self.entry.is_some()
    }

    pub(crate) fn key(&self) -> Option<&[u8]> {
        self.entry.as_ref().map(|(k, _)| k.as_ref())
    }

    pub(crate) fn value(&self) -> Option<&[u8]> {
        self.entry.as_ref().map(|(_, v)| v.as_ref())
    }
}

/// Files sled writes into every database directory it opens. Unrelated
/// files in the directory do not make it a database.
const MARKER_FILES: [&str; 2] = ["conf", "db"];

/// True if `path` is a directory sled has already opened as a database.
fn holds_database(path: &Path) -> bool {
    MARKER_FILES.iter().any(|name| path.join(name).is_file())
}

impl Engine {
    pub(crate) fn open(path: &Path, options: &Options) -> Result<Self> {
        let exists = holds_database(path);
        if !exists && !options.create_if_missing {
            return Err(Error::Engine(format!(
                "Invalid argument: {}: does not exist (create_if_missing is false)",
                path.display()
            )));
        }
        if exists && options.error_if_exists {
            return Err(Error::Engine(format!(
                "Invalid argument: {}: exists (error_if_exists is true)",
                path.display()
            )));
        }

        let db = sled::Config::new()
            .path(path)
            .cache_capacity(options.cache_capacity)
            .flush_every_ms(options.flush_every_ms)
            .open()?;

        Ok(Self {
            db,
            path: path.to_path_buf(),
            live_cursors: AtomicUsize::new(0),
        })
    }

    /// Removes every file the engine keeps under `path`. A missing path is
    /// already destroyed.
    pub(crate) fn destroy(path: &Path) -> Result<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Engine(format!(
                "IO error: {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub(crate) fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    pub(crate) fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    pub(crate) fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db.insert(key, value)?;
        Ok(())
    }

    pub(crate) fn delete(&self, key: &[u8]) -> Result<()> {
        self.db.remove(key)?;
        Ok(())
    }

    pub(crate) fn create_cursor(&self) -> Cursor {
        self.live_cursors.fetch_add(1, Ordering::AcqRel);
        Cursor::default()
    }

    /// Gives a cursor back to the engine. Must only be called while the
    /// engine is still open.
    pub(crate) fn release_cursor(&self, cursor: Cursor) {
        drop(cursor);
        let before = self.live_cursors.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(before > 0, "released more cursors than were created");
        debug!(
            path = %self.path.display(),
            remaining = before.saturating_sub(1),
            "released cursor"
        );
    }

    pub(crate) fn live_cursors(&self) -> usize {
        self.live_cursors.load(Ordering::Acquire)
    }

    pub(crate) fn seek_first(&self, cursor: &mut Cursor) -> Result<()> {
        cursor.entry = self.db.first()?;
        Ok(())
    }

    pub(crate) fn seek_last(&self, cursor: &mut Cursor) -> Result<()> {
        cursor.entry = self.db.last()?;
        Ok(())
    }

    /// Positions at the first entry whose key is `>= key`.
    pub(crate) fn seek(&self, cursor: &mut Cursor, key: &[u8]) -> Result<()> {
        cursor.entry = self.db.range::<&[u8], _>(key..).next().transpose()?;
        Ok(())
    }

    pub(crate) fn next(&self, cursor: &mut Cursor) -> Result<()> {
        if let Some((key, _)) = cursor.entry.take() {
            cursor.entry = self.db.get_gt(&key)?;
        }
        Ok(())
    }

    pub(crate) fn prev(&self, cursor: &mut Cursor) -> Result<()> {
        if let Some((key, _)) = cursor.entry.take() {
            cursor.entry = self.db.get_lt(&key)?;
        }
        Ok(())
    }
}
