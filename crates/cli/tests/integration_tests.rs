/// End-to-end tests for the Sluice shell binary.
/// Commands are piped through stdin; assertions look at stdout.
use std::path::Path;
use tempfile::tempdir;

/// Helper to run shell commands and capture output
fn run_cli_command(command: &str) -> String {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let mut child = Command::new(env!("CARGO_BIN_EXE_cli"))
        .env("SLUICE_FLUSH_MS", "0")
        .env("SLUICE_CACHE_MB", "8")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    {
        let stdin = child.stdin.as_mut().expect("Failed to open stdin");
        stdin
            .write_all(command.as_bytes())
            .expect("Failed to write to stdin");
        stdin.write_all(b"EXIT\n").expect("Failed to write EXIT");
    }

    let output = child.wait_with_output().expect("Failed to read output");
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn open_line(path: &Path) -> String {
    format!("OPEN {}\n", path.display())
}

#[test]
fn test_put_get() {
    let dir = tempdir().unwrap();
    let mut commands = open_line(&dir.path().join("db"));
    commands.push_str("PUT db1 key1 value1\nGET db1 key1\n");

    let output = run_cli_command(&commands);

    assert!(output.contains("db1"));
    assert!(output.contains("OK"));
    assert!(output.contains("\"value1\""));
    assert!(output.contains("bye"));
}

#[test]
fn test_delete_then_get_is_nil() {
    let dir = tempdir().unwrap();
    let mut commands = open_line(&dir.path().join("db"));
    commands.push_str("PUT db1 k v\nDELETE db1 k\nGET db1 k\n");

    let output = run_cli_command(&commands);
    assert!(output.contains("(nil)"));
}

#[test]
fn test_iteration_is_sorted() {
    let dir = tempdir().unwrap();
    let mut commands = open_line(&dir.path().join("db"));
    commands.push_str("PUT db1 c 3\nPUT db1 a 1\nPUT db1 b 2\n");
    commands.push_str("ITER-CREATE db1\nITER-SEEK-FIRST it2\n");
    for _ in 0..3 {
        commands.push_str("ITER-KEY it2\nITER-NEXT it2\n");
    }
    commands.push_str("ITER-VALID it2\n");

    let output = run_cli_command(&commands);

    let a = output.find("\"a\"").expect("a missing");
    let b = output.find("\"b\"").expect("b missing");
    let c = output.find("\"c\"").expect("c missing");
    assert!(a < b && b < c, "keys out of order:\n{output}");
    assert!(output.contains("> false"));
}

#[test]
fn test_unseeked_iterator_errors() {
    let dir = tempdir().unwrap();
    let mut commands = open_line(&dir.path().join("db"));
    commands.push_str("PUT db1 k v\nITER-CREATE db1\nITER-KEY it2\n");

    let output = run_cli_command(&commands);
    assert!(output.contains("ERR invalid iterator"));
}

#[test]
fn test_close_database_before_iterator() {
    let dir = tempdir().unwrap();
    let mut commands = open_line(&dir.path().join("db"));
    commands.push_str("ITER-CREATE db1\nCLOSE db1\nITER-CLOSE it2\nITER-CLOSE it2\n");
    commands.push_str("GET db1 k\n");

    let output = run_cli_command(&commands);

    assert!(output.contains("ERR database is not open"));
    assert!(output.contains("bye"), "shell did not exit cleanly:\n{output}");
}

#[test]
fn test_data_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db");

    let mut first = open_line(&path);
    first.push_str("PUT db1 durable yes\n");
    run_cli_command(&first);

    let mut second = open_line(&path);
    second.push_str("GET db1 durable\n");
    let output = run_cli_command(&second);
    assert!(output.contains("\"yes\""));
}

#[test]
fn test_destroy_clears_data() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db");

    let mut commands = open_line(&path);
    commands.push_str("PUT db1 k v\nCLOSE db1\n");
    commands.push_str(&format!("DESTROY {}\n", path.display()));
    commands.push_str(&open_line(&path));
    commands.push_str("GET db2 k\n");

    let output = run_cli_command(&commands);
    assert!(output.contains("(nil)"));
}

#[test]
fn test_type_and_arity_errors() {
    let dir = tempdir().unwrap();
    let mut commands = open_line(&dir.path().join("db"));
    commands.push_str("ITER-CREATE db1\nPUT it2 k v\nGET db1\nNOPE\n");

    let output = run_cli_command(&commands);

    assert!(output.contains("ERR type error: expected database handle, got it2"));
    assert!(output.contains("ERR arity mismatch: GET expects 2 argument(s), got 1"));
    assert!(output.contains("ERR unknown command: NOPE"));
}

#[test]
fn test_error_if_exists_from_env() {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let dir = tempdir().unwrap();
    let path = dir.path().join("db");
    run_cli_command(&open_line(&path));

    let mut child = Command::new(env!("CARGO_BIN_EXE_cli"))
        .env("SLUICE_ERROR_IF_EXISTS", "true")
        .env("SLUICE_FLUSH_MS", "0")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(format!("{}EXIT\n", open_line(&path)).as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("error_if_exists=true"));
    assert!(stdout.contains("exists (error_if_exists is true)"));
}
