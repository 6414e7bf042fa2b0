//! Handle table of the shell.
//!
//! Values created by the shell (databases, iterators) live here and are
//! referred to by name: `db<N>` or `it<N>`. Ids are never reused, so a name
//! whose value has been forgotten stays dead instead of silently pointing at
//! a newer value.
//!
//! Forgetting a handle drops its value, which runs the same close path as an
//! explicit close. This is the shell's counterpart of a garbage collector
//! finalizing an unreachable object.

use binding::{Database, DbIterator};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::ShellError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Database,
    Iterator,
}

impl Kind {
    fn prefix(self) -> &'static str {
        match self {
            Kind::Database => "db",
            Kind::Iterator => "it",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Kind::Database => "database",
            Kind::Iterator => "iterator",
        }
    }
}

#[derive(Debug)]
enum Value {
    Database(Database),
    Iterator(DbIterator),
}

impl Value {
    fn kind(&self) -> Kind {
        match self {
            Value::Database(_) => Kind::Database,
            Value::Iterator(_) => Kind::Iterator,
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            Value::Database(db) => db.is_closed(),
            Value::Iterator(it) => it.is_closed(),
        }
    }
}

/// One row of [`Registry::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: &'static str,
    pub closed: bool,
}

#[derive(Debug, Default)]
pub struct Registry {
    next_id: u64,
    values: BTreeMap<u64, Value>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, value: Value) -> String {
        self.next_id += 1;
        let name = format!("{}{}", value.kind().prefix(), self.next_id);
        self.values.insert(self.next_id, value);
        name
    }

    pub fn insert_database(&mut self, db: Database) -> String {
        self.insert(Value::Database(db))
    }

    pub fn insert_iterator(&mut self, it: DbIterator) -> String {
        self.insert(Value::Iterator(it))
    }

    /// Parses `name`, requiring it to name a value of `kind`.
    fn resolve(name: &[u8], kind: Kind) -> Result<u64, ShellError> {
        let text = String::from_utf8_lossy(name);
        match parse_name(&text) {
            Some((found, id)) if found == kind => Ok(id),
            _ => Err(ShellError::Type(format!(
                "expected {} handle, got {}",
                kind.noun(),
                text
            ))),
        }
    }

    pub fn database(&self, name: &[u8]) -> Result<&Database, ShellError> {
        let id = Self::resolve(name, Kind::Database)?;
        match self.values.get(&id) {
            Some(Value::Database(db)) => Ok(db),
            _ => Err(unknown_handle(name)),
        }
    }

    pub fn database_mut(&mut self, name: &[u8]) -> Result<&mut Database, ShellError> {
        let id = Self::resolve(name, Kind::Database)?;
        match self.values.get_mut(&id) {
            Some(Value::Database(db)) => Ok(db),
            _ => Err(unknown_handle(name)),
        }
    }

    pub fn iterator(&self, name: &[u8]) -> Result<&DbIterator, ShellError> {
        let id = Self::resolve(name, Kind::Iterator)?;
        match self.values.get(&id) {
            Some(Value::Iterator(it)) => Ok(it),
            _ => Err(unknown_handle(name)),
        }
    }

    pub fn iterator_mut(&mut self, name: &[u8]) -> Result<&mut DbIterator, ShellError> {
        let id = Self::resolve(name, Kind::Iterator)?;
        match self.values.get_mut(&id) {
            Some(Value::Iterator(it)) => Ok(it),
            _ => Err(unknown_handle(name)),
        }
    }

    /// Drops the value behind `name`, finalizing it.
    pub fn forget(&mut self, name: &[u8]) -> Result<(), ShellError> {
        let id = parse_name(&String::from_utf8_lossy(name))
            .filter(|(kind, id)| self.values.get(id).is_some_and(|v| v.kind() == *kind))
            .map(|(_, id)| id)
            .ok_or_else(|| unknown_handle(name))?;

        if let Some(value) = self.values.remove(&id) {
            debug!(handle = %String::from_utf8_lossy(name), "finalizing handle");
            drop(value);
        }
        Ok(())
    }

    pub fn list(&self) -> Vec<Entry> {
        self.values
            .iter()
            .map(|(id, v)| Entry {
                name: format!("{}{}", v.kind().prefix(), id),
                kind: v.kind().noun(),
                closed: v.is_closed(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

fn unknown_handle(name: &[u8]) -> ShellError {
    ShellError::Type(format!("unknown handle {}", String::from_utf8_lossy(name)))
}

fn parse_name(name: &str) -> Option<(Kind, u64)> {
    let (kind, digits) = if let Some(rest) = name.strip_prefix("db") {
        (Kind::Database, rest)
    } else if let Some(rest) = name.strip_prefix("it") {
        (Kind::Iterator, rest)
    } else {
        return None;
    };
    digits.parse().ok().map(|id| (kind, id))
}
