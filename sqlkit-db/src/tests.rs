//! Unit tests for the connection and statement adaptors.

use super::*;
use crate::scanstatus::{Est, Explain, NLoop, NVisit, Name, SelectId};

fn prepare<'c>(conn: &'c Connection, sql: &str) -> Statement<'c> {
    let (stmt, rest) = conn.prepare_v2(sql).expect("prepare");
    assert!(rest.trim().is_empty(), "unexpected tail {rest:?}");
    stmt.expect("one statement")
}

fn seeded() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.exec(
        "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT, \
                         name TEXT NOT NULL COLLATE NOCASE, \
                         score REAL);
         INSERT INTO t (name, score) VALUES ('a', 1.5), ('b', 2.5), ('c', 3.5);",
    )
    .expect("seed");
    conn
}

// ── Open / close ────────────────────────────────────────────────────────

#[test]
fn test_select_one_round_trip() {
    let conn = Connection::open_v2(":memory:", OpenFlags::READWRITE | OpenFlags::CREATE, None)
        .expect("open");
    let mut stmt = prepare(&conn, "SELECT 1");
    assert_eq!(stmt.step().expect("step"), StepResult::Row);
    assert_eq!(stmt.column_int(0), 1);
    assert_eq!(stmt.step().expect("step"), StepResult::Done);
    stmt.finalize().expect("finalize");
    conn.close().expect("close");
}

#[test]
fn test_open_failure_uses_connection_message() {
    let err = Connection::open_v2("/nonexistent-dir/sub/x.db", OpenFlags::READWRITE, None)
        .expect_err("cannot open");
    assert_eq!(err.code.0, 14);
    assert!(err.message.contains("unable to open"), "{err}");
}

#[test]
fn test_open_rejects_interior_nul() {
    let err = Connection::open("bad\0path").expect_err("nul in path");
    assert_eq!(err.code.0, 21);
}

#[test]
fn test_open16_in_memory() {
    let path: Vec<u16> = ":memory:".encode_utf16().collect();
    let conn = Connection::open16(&path).expect("open16");
    conn.exec("CREATE TABLE t (x)").expect("create");
    conn.close_v2().expect("close_v2");
}

#[test]
fn test_open_with_options_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("opts.db");

    let missing = OpenOptions {
        create: false,
        ..OpenOptions::default()
    };
    let err = Connection::open_with(&path, &missing).expect_err("no file yet");
    assert_eq!(err.code.0, 14);

    let options = OpenOptions {
        busy_timeout_ms: Some(50),
        ..OpenOptions::default()
    };
    let conn = Connection::open_with(&path, &options).expect("create");
    conn.exec("CREATE TABLE t (x)").expect("create table");
    assert_eq!(conn.db_readonly("main").expect("readonly"), Some(false));
    drop(conn);

    let read_only = OpenOptions {
        read_only: true,
        ..OpenOptions::default()
    };
    let conn = Connection::open_with(&path, &read_only).expect("reopen");
    assert_eq!(conn.db_readonly("main").expect("readonly"), Some(true));
    let err = conn.exec("INSERT INTO t VALUES (1)").expect_err("read-only");
    assert_eq!(err.code.0, 8);
}

#[cfg(unix)]
#[test]
fn test_open_with_rejects_non_utf8_path() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(OsStr::from_bytes(b"db\xFF.sqlite"));

    let err = Connection::open_with(&path, &OpenOptions::default()).expect_err("non-UTF-8 path");
    assert_eq!(err.code.0, 21);
    assert!(err.message.contains("not valid UTF-8"), "{err}");
    // Nothing was created under a substituted name either.
    let created = std::fs::read_dir(dir.path()).expect("read dir").count();
    assert_eq!(created, 0);
}

// ── prepare ─────────────────────────────────────────────────────────────

#[test]
fn test_prepare_returns_unconsumed_tail() {
    let conn = Connection::open_in_memory().expect("open");
    let sql = "SELECT 1; SELECT 2;";
    let (stmt, rest) = conn.prepare_v2(sql).expect("prepare");
    assert!(stmt.is_some());
    assert_eq!(rest.trim_start(), "SELECT 2;");
    // The tail points into the caller's buffer.
    assert_eq!(rest.as_ptr(), sql[9..].as_ptr());

    let (stmt, rest) = conn.prepare_v2(rest).expect("prepare second");
    assert_eq!(stmt.expect("second").sql().trim_start(), "SELECT 2;");
    assert!(rest.is_empty());
}

#[test]
fn test_prepare_single_statement_has_empty_tail() {
    let conn = Connection::open_in_memory().expect("open");
    let (stmt, rest) = conn.prepare("SELECT 1").expect("legacy prepare");
    assert!(stmt.is_some());
    assert!(rest.is_empty());
}

#[test]
fn test_prepare_whitespace_yields_no_statement() {
    let conn = Connection::open_in_memory().expect("open");
    let (stmt, rest) = conn.prepare_v2("   -- nothing here\n").expect("prepare");
    assert!(stmt.is_none());
    assert!(rest.is_empty());
}

#[test]
fn test_prepare_error_carries_connection_message() {
    let conn = Connection::open_in_memory().expect("open");
    let err = conn.prepare_v2("SELEC 1").expect_err("syntax error");
    assert_eq!(err.code.0, 1);
    assert!(err.message.contains("syntax error"), "{err}");
    assert_eq!(conn.errcode(), 1);
}

#[test]
fn test_prepare16_tail_in_code_units() {
    let conn = Connection::open_in_memory().expect("open");
    let sql: Vec<u16> = "SELECT 'é'; SELECT 2".encode_utf16().collect();
    let (stmt, rest) = conn.prepare16_v2(&sql).expect("prepare16");
    let mut stmt = stmt.expect("first");
    assert_eq!(String::from_utf16_lossy(rest).trim_start(), "SELECT 2");

    assert_eq!(stmt.step().expect("step"), StepResult::Row);
    assert_eq!(String::from_utf16_lossy(&stmt.column_text16(0)), "é");
    assert_eq!(stmt.column_bytes16(0), 2);
    assert_eq!(String::from_utf16_lossy(&stmt.column_name16(0)), "'é'");

    let (stmt, rest) = conn.prepare16(rest).expect("legacy prepare16");
    assert!(stmt.is_some());
    assert!(rest.is_empty());
}

// ── Binding ─────────────────────────────────────────────────────────────

#[test]
fn test_unnamed_parameter_name_is_empty() {
    let conn = Connection::open_in_memory().expect("open");
    let stmt = prepare(&conn, "SELECT ?, :named");
    assert_eq!(stmt.bind_parameter_count(), 2);
    assert_eq!(stmt.bind_parameter_name(1), "");
    assert_eq!(stmt.bind_parameter_name(2), ":named");
    assert_eq!(stmt.bind_parameter_index(":named").expect("index"), 2);
    assert_eq!(stmt.bind_parameter_index(":missing").expect("index"), 0);
}

#[test]
fn test_bind_and_read_each_storage_class() {
    let conn = Connection::open_in_memory().expect("open");
    let mut stmt = prepare(&conn, "SELECT ?1, ?2, ?3, ?4, ?5, ?6");
    stmt.bind_int64(1, 1 << 40).expect("int64");
    stmt.bind_double(2, 0.25).expect("double");
    stmt.bind_text(3, "a\0b").expect("text");
    stmt.bind_blob(4, &[0xDE, 0xAD]).expect("blob");
    stmt.bind_null(5).expect("null");
    stmt.bind_zeroblob(6, 3).expect("zeroblob");

    assert_eq!(stmt.step().expect("step"), StepResult::Row);
    assert_eq!(stmt.column_count(), 6);
    assert_eq!(stmt.column_type(0), ColumnType::Integer);
    assert_eq!(stmt.column_int64(0), 1 << 40);
    assert_eq!(stmt.column_double(1), 0.25);
    assert_eq!(stmt.column_text(2), "a\0b");
    assert_eq!(stmt.column_bytes(2), 3);
    assert_eq!(stmt.column_blob(3), vec![0xDE, 0xAD]);
    assert!(stmt.is_column_null(4));
    assert_eq!(stmt.column_text(4), "");
    assert!(stmt.column_blob(4).is_empty());
    assert_eq!(stmt.column_blob(5), vec![0, 0, 0]);
}

#[test]
fn test_column_int64_keeps_high_bits() {
    let conn = Connection::open_in_memory().expect("open");
    let mut stmt = prepare(&conn, "SELECT 9007199254740993");
    assert_eq!(stmt.step().expect("step"), StepResult::Row);
    assert_eq!(stmt.column_int64(0), 9_007_199_254_740_993);
}

#[test]
fn test_static_and_wide_binds() {
    static BLOB: [u8; 2] = [1, 2];
    let conn = Connection::open_in_memory().expect("open");
    let mut stmt = prepare(&conn, "SELECT ?, ?, ?, ?, ?, ?");
    stmt.bind_text_static(1, "static").expect("text static");
    stmt.bind_blob_static(2, &BLOB).expect("blob static");
    stmt.bind_blob64(3, &[9]).expect("blob64");
    stmt.bind_text64(4, b"wide", TextEncoding::Utf8).expect("text64");
    let utf16: Vec<u16> = "sixteen".encode_utf16().collect();
    stmt.bind_text16(5, &utf16).expect("text16");
    stmt.bind_zeroblob64(6, 2).expect("zeroblob64");

    assert_eq!(stmt.step().expect("step"), StepResult::Row);
    assert_eq!(stmt.column_text(0), "static");
    assert_eq!(stmt.column_blob(1), vec![1, 2]);
    assert_eq!(stmt.column_blob(2), vec![9]);
    assert_eq!(stmt.column_text(3), "wide");
    assert_eq!(stmt.column_text(4), "sixteen");
    assert_eq!(stmt.column_bytes(5), 2);
}

#[test]
fn test_bind_out_of_range_is_range_error() {
    let conn = Connection::open_in_memory().expect("open");
    let mut stmt = prepare(&conn, "SELECT ?");
    let err = stmt.bind_int(2, 1).expect_err("no parameter 2");
    assert_eq!(err.code.0, 25);
}

#[test]
fn test_bind_respects_length_limit() {
    let conn = Connection::open_in_memory().expect("open");
    let previous = conn.limit(LimitKind::Length, 1000);
    assert!(previous > 1000);
    assert_eq!(conn.limit(LimitKind::Length, -1), 1000);

    let mut stmt = prepare(&conn, "SELECT ?");
    let err = stmt.bind_text(1, &"x".repeat(2000)).expect_err("too long");
    assert_eq!(err.code.0, 18);
}

#[test]
fn test_clear_bindings_resets_to_null() {
    let conn = Connection::open_in_memory().expect("open");
    let mut stmt = prepare(&conn, "SELECT ?");
    stmt.bind_int(1, 7).expect("bind");
    assert_eq!(stmt.step().expect("step"), StepResult::Row);
    assert_eq!(stmt.column_int(0), 7);

    stmt.reset().expect("reset");
    stmt.clear_bindings().expect("clear");
    assert_eq!(stmt.step().expect("step"), StepResult::Row);
    assert!(stmt.is_column_null(0));
}

#[test]
fn test_column_value_binds_into_another_statement() {
    let conn = Connection::open_in_memory().expect("open");
    let mut source = prepare(&conn, "SELECT 'copied', 42, 1.5, x'00ff', NULL");
    assert_eq!(source.step().expect("step"), StepResult::Row);

    let value = source.column_value(0).expect("value");
    assert_eq!(value.value_type(), ColumnType::Text);
    let mut target = prepare(&conn, "SELECT ?");
    target.bind_value(1, &value).expect("bind value");
    assert_eq!(target.step().expect("step"), StepResult::Row);
    assert_eq!(target.column_text(0), "copied");

    let owned: Vec<Value> = (0..5)
        .map(|i| Value::from(source.column_value(i).expect("value")))
        .collect();
    assert_eq!(
        owned,
        vec![
            Value::Text("copied".into()),
            Value::Integer(42),
            Value::Real(1.5),
            Value::Blob(vec![0x00, 0xff]),
            Value::Null,
        ]
    );
    assert_eq!(
        source.column_value(99).map(|v| v.value_type()),
        Some(ColumnType::Null)
    );
}

// ── Step and exec errors ────────────────────────────────────────────────

#[test]
fn test_step_error_carries_connection_message() {
    let conn = seeded();
    let mut stmt = prepare(&conn, "INSERT INTO t (id, name) VALUES (1, 'dup')");
    let err = stmt.step().expect_err("unique violation");
    assert_eq!(err.code.primary(), 19);
    assert!(err.message.contains("UNIQUE constraint failed"), "{err}");
    assert!(stmt.reset().is_err());
}

#[test]
fn test_exec_error_contains_engine_text() {
    let conn = Connection::open_in_memory().expect("open");
    let err = conn
        .exec("INSERT INTO missing VALUES (1)")
        .expect_err("missing table");
    assert_eq!(err.code.0, 1);
    assert_eq!(err.message, "no such table: missing");
    assert_eq!(
        err.to_string(),
        "SQLite error(1): no such table: missing"
    );
}

#[test]
fn test_exec_with_sees_every_row() {
    let conn = Connection::open_in_memory().expect("open");
    let mut rows = Vec::new();
    let mut names = Vec::new();
    conn.exec_with("SELECT 1 AS a, NULL AS b; SELECT 'x', 2", |values, columns| {
        rows.push(values.to_vec());
        names.push(columns.to_vec());
        true
    })
    .expect("exec_with");
    assert_eq!(
        rows,
        vec![
            vec![Some("1".to_string()), None],
            vec![Some("x".to_string()), Some("2".to_string())],
        ]
    );
    assert_eq!(names[0], vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_exec_with_stops_on_false() {
    let conn = seeded();
    let mut seen = 0;
    let err = conn
        .exec_with("SELECT name FROM t", |_, _| {
            seen += 1;
            false
        })
        .expect_err("aborted");
    assert_eq!(err.code.0, 4);
    assert_eq!(seen, 1);
}

// ── Pass-through queries ────────────────────────────────────────────────

#[test]
fn test_change_counters_and_autocommit() {
    let conn = seeded();
    assert_eq!(conn.changes(), 3);
    assert_eq!(conn.last_insert_rowid(), 3);
    assert!(conn.get_autocommit());

    conn.exec("BEGIN; UPDATE t SET score = 0 WHERE id < 3;").expect("update");
    assert!(!conn.get_autocommit());
    assert_eq!(conn.changes(), 2);
    assert!(conn.total_changes() >= 5);
    conn.exec("COMMIT").expect("commit");
    assert!(conn.get_autocommit());
    assert_eq!(conn.db_readonly("nope").expect("query"), None);
}

#[test]
fn test_next_stmt_walks_open_statements() {
    let conn = Connection::open_in_memory().expect("open");
    assert!(conn.next_stmt(None).is_none());
    let first = prepare(&conn, "SELECT 1");
    let second = prepare(&conn, "SELECT 2");

    let mut seen = Vec::new();
    let mut cursor = conn.next_stmt(None);
    while let Some(id) = cursor {
        seen.push(id);
        cursor = conn.next_stmt(Some(id));
    }
    assert_eq!(seen.len(), 2);
    assert!(seen.contains(&first.id()));
    assert!(seen.contains(&second.id()));
}

#[test]
fn test_table_column_metadata() {
    let conn = seeded();
    let id: (String, String, bool, bool, bool) = conn
        .table_column_metadata(None, "t", "id")
        .expect("id metadata")
        .into();
    assert_eq!(id, ("INTEGER".into(), "BINARY".into(), false, true, true));

    let name = conn
        .table_column_metadata(Some("main"), "t", "name")
        .expect("name metadata");
    assert_eq!(
        name,
        ColumnMetadata {
            data_type: "TEXT".into(),
            collation: "NOCASE".into(),
            not_null: true,
            primary_key: false,
            autoincrement: false,
        }
    );

    let err = conn
        .table_column_metadata(None, "t", "nope")
        .expect_err("no such column");
    assert_eq!(err.code.0, 1);
    assert!(err.message.contains("no such table column"), "{err}");
}

#[test]
fn test_column_origin_accessors() {
    let conn = seeded();
    let mut stmt = prepare(&conn, "SELECT id AS ident, score * 2 FROM t");
    assert_eq!(stmt.step().expect("step"), StepResult::Row);
    assert_eq!(stmt.column_name(0), "ident");
    assert_eq!(stmt.column_decltype(0), "INTEGER");
    assert_eq!(stmt.column_database_name(0), "main");
    assert_eq!(stmt.column_table_name(0), "t");
    assert_eq!(stmt.column_origin_name(0), "id");
    assert_eq!(stmt.column_decltype(1), "");
    assert_eq!(stmt.column_origin_name(1), "");
}

#[test]
fn test_statement_introspection() {
    let conn = seeded();
    let mut stmt = prepare(&conn, "SELECT name FROM t ORDER BY score DESC");
    assert!(stmt.stmt_readonly());
    assert!(!stmt.stmt_busy());
    assert_eq!(stmt.sql(), "SELECT name FROM t ORDER BY score DESC");

    assert_eq!(stmt.step().expect("step"), StepResult::Row);
    assert!(stmt.stmt_busy());
    assert_eq!(stmt.column_text(0), "c");
    stmt.reset().expect("reset");
    assert!(!stmt.stmt_busy());

    assert!(stmt.stmt_status(StmtStatusCounter::VmStep, false) > 0);
    assert_eq!(stmt.stmt_status(StmtStatusCounter::Sort, true), 1);
    assert_eq!(stmt.stmt_status(StmtStatusCounter::Sort, false), 0);

    let insert = prepare(&conn, "INSERT INTO t (name) VALUES ('d')");
    assert!(!insert.stmt_readonly());
}

// ── Scan status ─────────────────────────────────────────────────────────

#[test]
fn test_scan_status_counts_loops_and_rows() {
    let conn = Connection::open_in_memory().expect("open");
    conn.exec("CREATE TABLE s (x); INSERT INTO s VALUES (1), (2), (3);")
        .expect("seed");
    let mut stmt = prepare(&conn, "SELECT x FROM s");
    while stmt.step().expect("step") == StepResult::Row {}

    let loops: i64 = stmt.scan_status::<NLoop>(0).expect("nloop");
    let visits: i64 = stmt.scan_status::<NVisit>(0).expect("nvisit");
    let estimate: f64 = stmt.scan_status::<Est>(0).expect("est");
    assert_eq!(loops, 1);
    assert_eq!(visits, 3);
    assert!(estimate > 0.0);
    assert_eq!(stmt.scan_status::<Name>(0).expect("name"), "s");
    assert!(stmt
        .scan_status::<Explain>(0)
        .expect("explain")
        .contains("SCAN s"));
    assert!(stmt.scan_status::<SelectId>(0).expect("select id") >= 0);

    let err = stmt.scan_status::<NLoop>(1).expect_err("only one loop");
    assert_eq!(err.code.0, 1);

    stmt.scan_status_reset();
    assert_eq!(stmt.scan_status::<NVisit>(0).expect("nvisit"), 0);
}

// ── Status ──────────────────────────────────────────────────────────────

#[test]
fn test_status_queries() {
    let conn = seeded();
    let (current, highwater) = status64(StatusKind::MemoryUsed, false).expect("status64");
    assert!(current > 0);
    assert!(highwater >= current);
    let (count, _) = status(StatusKind::MallocCount, false).expect("status");
    assert!(count > 0);

    let (cache_used, _) = conn
        .db_status(DbStatusKind::CacheUsed, false)
        .expect("db_status");
    assert!(cache_used > 0);
    assert!(memory_used() > 0);
    assert!(memory_highwater(false) >= memory_used());
}

#[test]
fn test_db_status_reset_returns_previous_highwater() {
    let conn = seeded();
    let mut stmt = prepare(&conn, "SELECT name FROM t ORDER BY score");
    while stmt.step().expect("step") == StepResult::Row {}
    drop(stmt);

    let (_, hits) = conn
        .db_status(DbStatusKind::LookasideHit, false)
        .expect("db_status");
    assert!(hits > 0);

    let (_, before_reset) = conn
        .db_status(DbStatusKind::LookasideHit, true)
        .expect("db_status reset");
    assert_eq!(before_reset, hits);

    let (_, after_reset) = conn
        .db_status(DbStatusKind::LookasideHit, false)
        .expect("db_status");
    assert_eq!(after_reset, 0);
}

#[test]
fn test_status_reset_returns_previous_highwater() {
    let (_, seen) = status64(StatusKind::MemoryUsed, false).expect("status64");
    let (current, before_reset) = status64(StatusKind::MemoryUsed, true).expect("status64 reset");
    assert!(before_reset >= seen);
    assert!(before_reset >= current);

    let (current, highwater) = status(StatusKind::MemoryUsed, true).expect("status reset");
    assert!(highwater >= current);
}

#[test]
fn test_global_pass_throughs() {
    assert_eq!(threadsafe(), ThreadingMode::Serialized);
    assert!(libversion().starts_with("3."));
    assert!(libversion_number() >= 3_000_000);
    assert!(complete("SELECT 1;").expect("complete"));
    assert!(!complete("SELECT 1").expect("complete"));
    assert!(!complete("CREATE TRIGGER tr AFTER INSERT ON t BEGIN SELECT 1;").expect("complete"));
    assert_eq!(errstr(5), "database is locked");
}
