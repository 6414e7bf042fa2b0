//! # CLI - Sluice interactive shell
//!
//! A REPL host for the `binding` crate. Databases and iterators are created
//! by commands and referred to by handle names (`db1`, `it2`); every native
//! operation is one command. Reads commands from stdin and prints results to
//! stdout, so it can be scripted by piping commands in.
//!
//! ## Commands
//!
//! ```text
//! OPEN path              DESTROY path
//! CLOSE db               ITER-CREATE db
//! PUT db key value       ITER-SEEK it key
//! GET db key             ITER-SEEK-FIRST it | ITER-SEEK-LAST it
//! DELETE db key          ITER-NEXT it | ITER-PREV it | ITER-VALID it
//! FORGET handle          ITER-KEY it | ITER-VALUE it | ITER-CLOSE it
//! HANDLES | STATS db     HELP | EXIT
//! ```
//!
//! Keys and values are byte strings: quote them to include whitespace and
//! use `\xNN` escapes for arbitrary bytes.
//!
//! ## Configuration
//!
//! Engine options come from `SLUICE_*` environment variables (see the
//! `config` crate). Log output goes to stderr and is filtered by `RUST_LOG`
//! (default: `warn`).
//!
//! ## Example
//!
//! ```text
//! $ cargo run -p cli
//! Sluice shell (create_if_missing=true, error_if_exists=false, cache=64MiB)
//! > OPEN /tmp/demo
//! db1
//! > PUT db1 name Alice
//! OK
//! > ITER-CREATE db1
//! it2
//! > ITER-SEEK-FIRST it2
//! OK
//! > ITER-KEY it2
//! "name"
//! > EXIT
//! bye
//! ```

mod error;
mod registry;
mod shell;
mod token;

use anyhow::Result;
use config::Options;
use shell::{Reply, Shell};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let options = Options::from_env();
    println!(
        "Sluice shell (create_if_missing={}, error_if_exists={}, cache={}MiB)",
        options.create_if_missing,
        options.error_if_exists,
        options.cache_capacity / (1024 * 1024)
    );
    println!("Type HELP for commands.");
    print!("> ");
    io::stdout().flush().ok();

    let mut shell = Shell::new(options);
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        match shell.execute(&line) {
            Ok(Reply::Print(out)) => println!("{}", out),
            Ok(Reply::Silent) => {}
            Ok(Reply::Exit) => {
                println!("bye");
                break;
            }
            Err(e) => println!("ERR {}", e),
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    // Dropping the shell finalizes every handle still registered.
    drop(shell);
    Ok(())
}
