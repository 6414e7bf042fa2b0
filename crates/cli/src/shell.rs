/// Command dispatch for the shell.
///
/// Each line is tokenized into byte strings, the first token picks the
/// command (case-insensitive) and the rest are its arguments. Argument count
/// and handle kinds are checked before anything touches a database, so a
/// rejected command has no effect.
use binding::{destroy, Database, Options};
use std::path::PathBuf;
use tracing::debug;

use crate::error::ShellError;
use crate::registry::Registry;
use crate::token::{quote, tokenize};

/// Usage line and one-line description for every command, in `HELP` order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("OPEN path", "Opens or creates a database. Returns a database handle."),
    ("CLOSE db", "Closes a database. Closing twice is fine."),
    ("PUT db key value", "Puts a key/value pair."),
    ("GET db key", "Gets the value of a key, or (nil)."),
    ("DELETE db key", "Deletes a key/value pair. Alias: DEL."),
    ("FLUSH db", "Writes buffered changes to disk."),
    ("DESTROY path", "Destroys the database stored at path."),
    ("ITER-CREATE db", "Creates a new iterator. Returns an iterator handle."),
    ("ITER-SEEK it key", "Seeks the iterator to the first key >= key."),
    ("ITER-SEEK-FIRST it", "Seeks the iterator to the first key."),
    ("ITER-SEEK-LAST it", "Seeks the iterator to the last key."),
    ("ITER-NEXT it", "Moves the iterator to the next key."),
    ("ITER-PREV it", "Moves the iterator to the previous key."),
    ("ITER-VALID it", "Tells whether the iterator is on an entry."),
    ("ITER-KEY it", "Prints the key under the iterator."),
    ("ITER-VALUE it", "Prints the value under the iterator."),
    ("ITER-CLOSE it", "Closes an iterator. Alias: ITER/CLOSE."),
    ("FORGET handle", "Drops a handle, finalizing its value."),
    ("HANDLES", "Lists live handles."),
    ("STATS db", "Prints where a database lives, its options and live iterators."),
    ("HELP", "Prints this table."),
    ("EXIT", "Closes everything and quits. Alias: QUIT."),
];

/// What the caller should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Print(String),
    Silent,
    Exit,
}

fn ok() -> Result<Reply, ShellError> {
    Ok(Reply::Print("OK".into()))
}

fn arity(command: &str, args: &[Vec<u8>], expected: usize) -> Result<(), ShellError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ShellError::Arity {
            command: command.to_string(),
            expected,
            got: args.len(),
        })
    }
}

fn path_arg(arg: &[u8]) -> Result<PathBuf, ShellError> {
    std::str::from_utf8(arg)
        .map(PathBuf::from)
        .map_err(|_| ShellError::Type(format!("expected a UTF-8 path, got {}", quote(arg))))
}

pub struct Shell {
    options: Options,
    registry: Registry,
}

impl Shell {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            registry: Registry::new(),
        }
    }

    pub fn execute(&mut self, line: &str) -> Result<Reply, ShellError> {
        let mut tokens = tokenize(line)?;
        if tokens.is_empty() {
            return Ok(Reply::Silent);
        }
        let command = String::from_utf8_lossy(&tokens.remove(0)).to_uppercase();
        let args = tokens;
        debug!(command = %command, args = args.len(), "dispatch");

        match command.as_str() {
            "OPEN" => {
                arity(&command, &args, 1)?;
                let path = path_arg(&args[0])?;
                let db = Database::open_with(path, self.options.clone())?;
                Ok(Reply::Print(self.registry.insert_database(db)))
            }
            "CLOSE" => {
                arity(&command, &args, 1)?;
                self.registry.database_mut(&args[0])?.close()?;
                ok()
            }
            "PUT" => {
                arity(&command, &args, 3)?;
                self.registry.database(&args[0])?.put(&args[1], &args[2])?;
                ok()
            }
            "GET" => {
                arity(&command, &args, 2)?;
                match self.registry.database(&args[0])?.get(&args[1])? {
                    Some(v) => Ok(Reply::Print(quote(&v))),
                    None => Ok(Reply::Print("(nil)".into())),
                }
            }
            "DELETE" | "DEL" => {
                arity(&command, &args, 2)?;
                self.registry.database(&args[0])?.delete(&args[1])?;
                ok()
            }
            "FLUSH" => {
                arity(&command, &args, 1)?;
                self.registry.database(&args[0])?.flush()?;
                ok()
            }
            "DESTROY" => {
                arity(&command, &args, 1)?;
                destroy(path_arg(&args[0])?)?;
                ok()
            }
            "ITER-CREATE" => {
                arity(&command, &args, 1)?;
                let it = self.registry.database(&args[0])?.iter()?;
                Ok(Reply::Print(self.registry.insert_iterator(it)))
            }
            "ITER-SEEK" => {
                arity(&command, &args, 2)?;
                self.registry.iterator_mut(&args[0])?.seek(&args[1])?;
                ok()
            }
            "ITER-SEEK-FIRST" => {
                arity(&command, &args, 1)?;
                self.registry.iterator_mut(&args[0])?.seek_first()?;
                ok()
            }
            "ITER-SEEK-LAST" => {
                arity(&command, &args, 1)?;
                self.registry.iterator_mut(&args[0])?.seek_last()?;
                ok()
            }
            "ITER-NEXT" => {
                arity(&command, &args, 1)?;
                self.registry.iterator_mut(&args[0])?.next()?;
                ok()
            }
            "ITER-PREV" => {
                arity(&command, &args, 1)?;
                self.registry.iterator_mut(&args[0])?.prev()?;
                ok()
            }
            "ITER-VALID" => {
                arity(&command, &args, 1)?;
                let valid = self.registry.iterator(&args[0])?.valid()?;
                Ok(Reply::Print(valid.to_string()))
            }
            "ITER-KEY" => {
                arity(&command, &args, 1)?;
                let key = self.registry.iterator(&args[0])?.key()?;
                Ok(Reply::Print(quote(&key)))
            }
            "ITER-VALUE" => {
                arity(&command, &args, 1)?;
                let value = self.registry.iterator(&args[0])?.value()?;
                Ok(Reply::Print(quote(&value)))
            }
            "ITER-CLOSE" | "ITER/CLOSE" => {
                arity(&command, &args, 1)?;
                self.registry.iterator_mut(&args[0])?.close();
                ok()
            }
            "FORGET" => {
                arity(&command, &args, 1)?;
                self.registry.forget(&args[0])?;
                ok()
            }
            "HANDLES" => {
                arity(&command, &args, 0)?;
                let mut lines: Vec<String> = self
                    .registry
                    .list()
                    .into_iter()
                    .map(|e| {
                        let state = if e.closed { "closed" } else { "open" };
                        format!("{} {} {}", e.name, e.kind, state)
                    })
                    .collect();
                lines.push(format!("({} handles)", self.registry.len()));
                Ok(Reply::Print(lines.join("\n")))
            }
            "STATS" => {
                arity(&command, &args, 1)?;
                let db = self.registry.database(&args[0])?;
                let opts = db.options();
                let iterators = db
                    .live_iterators()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|_| "-".into());
                let lines = [
                    format!("path: {}", db.path().display()),
                    format!("closed: {}", db.is_closed()),
                    format!("create_if_missing: {}", opts.create_if_missing),
                    format!("error_if_exists: {}", opts.error_if_exists),
                    format!("cache_capacity: {}", opts.cache_capacity),
                    format!("live iterators: {}", iterators),
                ];
                Ok(Reply::Print(lines.join("\n")))
            }
            "HELP" => {
                let width = COMMANDS.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
                let lines: Vec<String> = COMMANDS
                    .iter()
                    .map(|(usage, doc)| format!("{:width$}  {}", usage, doc, width = width))
                    .collect();
                Ok(Reply::Print(lines.join("\n")))
            }
            "EXIT" | "QUIT" => Ok(Reply::Exit),
            other => Err(ShellError::UnknownCommand(other.to_string())),
        }
    }
}
