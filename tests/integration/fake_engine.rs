//! Shell script standing in for the engine.
//!
//! Behaviour is keyed on the database argument and the query text:
//! - database `baddb`: error on stderr, exit 1
//! - database `hangdb`: never prints anything
//! - database `lingerdb`: prints the prompt, then never exits
//! - query containing `hang`: never finishes
//! - query containing `fail`: error on stderr, exit 2
//! - query containing `cafe`: a report with a Latin-1 encoded cell
//! - anything else: a full report for a two-row `users` result

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use nl2sql_bridge::{ConnectionProfile, Nl2SqlService, SessionManager};
use tempfile::TempDir;

const SCRIPT: &str = r#"#!/bin/sh
host="$1"
db="$4"
port="$5"

case "$db" in
  baddb)
    echo "ERROR 1049 (42000): Unknown database '$db'" >&2
    exit 1
    ;;
  hangdb)
    exec sleep 30
    ;;
esac

echo "Connected to $db at $host:$port"
echo "Enter your query:"

if [ "$db" = "lingerdb" ]; then
  exec sleep 30
fi

if ! read -r line; then
  exit 0
fi
if [ "$line" = "exit" ]; then
  exit 0
fi

case "$line" in
  *hang*)
    exec sleep 30
    ;;
  *fail*)
    echo "ERROR 1146 (42S02): Table '$db.nothing' doesn't exist" >&2
    exit 2
    ;;
  *cafe*)
    echo "Original Query: $line"
    echo "Base Table: cafes"
    echo "id | name"
    printf '1 | Caf\351\r\n'
    echo "1 row returned"
    exit 0
    ;;
esac

echo "Original Query: $line"
echo "Detected Intent: select"
echo "Base Table: users"
echo "Select Columns: id, name"
echo "Generated SQL: SELECT id, name FROM users"
echo "2 rows returned"
echo "id | name"
echo "---|-----"
echo "1 | Ada"
echo "2 | Grace"
echo "Execution time: 0.004 sec"
echo "Enter your query:"
read -r line
exit 0
"#;

/// Path of the fake engine, written once per test binary.
///
/// Writing once keeps the file from being open for writing while another
/// test is spawning it, which would fail with ETXTBSY.
pub fn engine_path() -> &'static Path {
    static ENGINE: OnceLock<(TempDir, PathBuf)> = OnceLock::new();

    let (_dir, path) = ENGINE.get_or_init(|| {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nl2sql.exe");
        std::fs::write(&path, SCRIPT).expect("write fake engine");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("make fake engine executable");
        (dir, path)
    });
    path
}

pub fn session(timeout: Duration) -> SessionManager {
    SessionManager::new(engine_path(), timeout)
}

pub fn service() -> Nl2SqlService {
    Nl2SqlService::new(session(Duration::from_secs(10)))
}

pub fn profile(database: &str) -> ConnectionProfile {
    ConnectionProfile::new("db.local", "reader", "s3cret", database, 3306)
}
