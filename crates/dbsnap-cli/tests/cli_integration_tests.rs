//! CLI integration tests
//!
//! Drive the `dbsnap` binary against SQLite files built in a temp dir.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SCHEMA: &str = "
    CREATE TABLE movie (id INTEGER PRIMARY KEY, title TEXT, year INTEGER);
    CREATE TABLE tag (label TEXT);
";

fn database(dir: &TempDir, name: &str, data: &str) -> PathBuf {
    let path = dir.path().join(name);
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn.execute_batch(data).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dbsnap"))
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "CLI command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_snapshot_table_prints_json() {
    // GIVEN a database with two movies
    let dir = TempDir::new().unwrap();
    let db = database(
        &dir,
        "cinema.db",
        "INSERT INTO movie VALUES (2, 'Avatar', 2009), (1, 'Alien', 1979);",
    );

    // WHEN the table is snapshot with one column excluded
    let output = run(&["snapshot", "--db", arg(&db), "--table", "movie", "--exclude", "year"]);

    // THEN the JSON carries columns, keys and rows in key order
    let json = stdout_json(&output);
    assert_eq!(json["source"]["kind"], "TABLE");
    assert_eq!(json["columns"], serde_json::json!(["id", "title"]));
    assert_eq!(json["primary_keys"], serde_json::json!(["id"]));
    assert_eq!(json["rows"][0]["title"]["value"], "Alien");
    assert_eq!(json["rows"][1]["title"]["type"], "TEXT");
}

#[test]
fn test_snapshot_query() {
    let dir = TempDir::new().unwrap();
    let db = database(&dir, "cinema.db", "INSERT INTO movie VALUES (1, 'Alien', 1979);");

    let output = run(&["snapshot", "--db", arg(&db), "--query", "SELECT title FROM movie"]);

    let json = stdout_json(&output);
    assert_eq!(json["source"]["kind"], "REQUEST");
    assert_eq!(json["columns"], serde_json::json!(["title"]));
}

#[test]
fn test_diff_json_lists_changes() {
    let dir = TempDir::new().unwrap();
    let before = database(
        &dir,
        "before.db",
        "INSERT INTO movie VALUES (1, 'Alien', 1979), (2, 'Avatar', 2009);",
    );
    let after = database(
        &dir,
        "after.db",
        "INSERT INTO movie VALUES (1, 'Alien', 1980), (3, 'Brazil', 1985);
         INSERT INTO tag VALUES ('scifi');",
    );

    let output = run(&["diff", "--before", arg(&before), "--after", arg(&after)]);

    let json = stdout_json(&output);
    let changes = json["changes"].as_array().unwrap();
    let summary: Vec<_> = changes
        .iter()
        .map(|c| {
            (
                c["source"]["name"].as_str().unwrap().to_string(),
                c["change_type"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("movie".to_string(), "MODIFICATION".to_string()),
            ("movie".to_string(), "CREATION".to_string()),
            ("movie".to_string(), "DELETION".to_string()),
            ("tag".to_string(), "CREATION".to_string()),
        ]
    );
    assert_eq!(json["source"], arg(&after));
}

#[test]
fn test_diff_text_for_selected_table() {
    let dir = TempDir::new().unwrap();
    let before = database(&dir, "before.db", "INSERT INTO movie VALUES (1, 'Alien', 1979);");
    let after = database(
        &dir,
        "after.db",
        "INSERT INTO movie VALUES (1, 'Alien', 1980);
         INSERT INTO tag VALUES ('scifi');",
    );

    let output = run(&[
        "diff",
        "--before",
        arg(&before),
        "--after",
        arg(&after),
        "--table",
        "movie",
        "--format",
        "text",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("MODIFICATION movie [1]"));
    assert!(stdout.contains("  year: 1979 -> 1980"));
    assert!(!stdout.contains("tag"));
}

#[test]
fn test_diff_uses_configured_alignment() {
    let dir = TempDir::new().unwrap();
    let before = database(&dir, "before.db", "INSERT INTO tag VALUES ('a'), ('b');");
    let after = database(&dir, "after.db", "INSERT INTO tag VALUES ('b'), ('a');");
    let config = dir.path().join("dbsnap.toml");
    std::fs::write(&config, "[detector]\nunkeyed_rows = \"full_row\"\n").unwrap();

    let output = run(&[
        "diff",
        "--before",
        arg(&before),
        "--after",
        arg(&after),
        "--table",
        "tag",
        "--config",
        arg(&config),
    ]);

    let json = stdout_json(&output);
    assert!(json["changes"].as_array().unwrap().is_empty());
}

#[test]
fn test_errors_exit_with_status_one() {
    let dir = TempDir::new().unwrap();
    let db = database(&dir, "cinema.db", "");

    let missing_table = run(&["snapshot", "--db", arg(&db), "--table", "actor"]);
    assert_eq!(missing_table.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&missing_table.stderr).contains("Source unavailable"));

    let missing_file = run(&[
        "diff",
        "--before",
        arg(&dir.path().join("absent.db")),
        "--after",
        arg(&db),
    ]);
    assert_eq!(missing_file.status.code(), Some(1));

    let bad_config = dir.path().join("bad.toml");
    std::fs::write(&bad_config, "[detector]\nspeed = 3\n").unwrap();
    let rejected = run(&[
        "diff",
        "--before",
        arg(&db),
        "--after",
        arg(&db),
        "--config",
        arg(&bad_config),
    ]);
    assert_eq!(rejected.status.code(), Some(1));
}
