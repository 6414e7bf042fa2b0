use crate::{Database, Options};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Options for tests: no background flusher thread.
pub fn test_options() -> Options {
    Options::default().flush_every_ms(None)
}

pub fn db_path(dir: &Path) -> PathBuf {
    dir.join("db")
}

pub fn open_in(dir: &Path) -> Result<Database> {
    Ok(Database::open_with(db_path(dir), test_options())?)
}

/// Drains an iterator from its current position, collecting keys.
pub fn collect_keys(it: &mut crate::DbIterator) -> Result<Vec<Vec<u8>>> {
    let mut keys = Vec::new();
    while it.valid()? {
        keys.push(it.key()?);
        it.next()?;
    }
    Ok(keys)
}
