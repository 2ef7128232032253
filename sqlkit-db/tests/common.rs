//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use sqlkit_db::{Connection, StepResult};
use tempfile::TempDir;

/// A fresh on-disk database path inside its own temporary directory.
pub fn temp_db_path(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(name);
    (dir, path)
}

/// Runs a single-row, single-column query and returns the integer.
pub fn query_i64(conn: &Connection, sql: &str) -> i64 {
    let (stmt, _) = conn.prepare_v2(sql).expect("prepare");
    let mut stmt = stmt.expect("statement");
    assert_eq!(stmt.step().expect("step"), StepResult::Row);
    stmt.column_int64(0)
}

/// Creates `t(id, payload)` holding `rows` rows of 1 KiB zero blobs.
pub fn seed_rows(conn: &Connection, rows: i64) {
    conn.exec("CREATE TABLE t (id INTEGER PRIMARY KEY, payload BLOB)")
        .expect("create table");
    conn.exec(&format!(
        "WITH RECURSIVE c(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM c WHERE i < {rows}) \
         INSERT INTO t SELECT i, zeroblob(1024) FROM c"
    ))
    .expect("seed rows");
}
