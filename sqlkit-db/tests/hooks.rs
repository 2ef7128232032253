mod common;

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use sqlkit_db::hooks::UpdateOperation;
use sqlkit_db::{Connection, OpenOptions, StepResult};

fn data_ptr<T>(value: &T) -> *mut c_void {
    ptr::from_ref(value).cast_mut().cast()
}

unsafe extern "C" fn give_up_after_two(data: *mut c_void, count: c_int) -> c_int {
    let calls = unsafe { &*data.cast::<AtomicUsize>() };
    calls.fetch_add(1, Ordering::SeqCst);
    c_int::from(count < 2)
}

unsafe extern "C" fn always_interrupt(data: *mut c_void) -> c_int {
    let calls = unsafe { &*data.cast::<AtomicUsize>() };
    calls.fetch_add(1, Ordering::SeqCst);
    1
}

unsafe extern "C" fn veto_commit(data: *mut c_void) -> c_int {
    let calls = unsafe { &*data.cast::<AtomicUsize>() };
    calls.fetch_add(1, Ordering::SeqCst);
    1
}

unsafe extern "C" fn count_rollback(data: *mut c_void) {
    let calls = unsafe { &*data.cast::<AtomicUsize>() };
    calls.fetch_add(1, Ordering::SeqCst);
}

unsafe extern "C" fn record_update(
    data: *mut c_void,
    op: c_int,
    _db: *const c_char,
    table: *const c_char,
    rowid: i64,
) {
    let events = unsafe { &*data.cast::<Mutex<Vec<(UpdateOperation, String, i64)>>>() };
    let table = unsafe { CStr::from_ptr(table) }.to_string_lossy().into_owned();
    let op = UpdateOperation::from_raw(op).expect("known operation");
    events.lock().expect("lock").push((op, table, rowid));
}

unsafe extern "C" fn record_trace(data: *mut c_void, sql: *const c_char) {
    let lines = unsafe { &*data.cast::<Mutex<Vec<String>>>() };
    let sql = unsafe { CStr::from_ptr(sql) }.to_string_lossy().into_owned();
    lines.lock().expect("lock").push(sql);
}

unsafe extern "C" fn record_profile(data: *mut c_void, sql: *const c_char, _nanos: u64) {
    unsafe { record_trace(data, sql) };
}

#[test]
fn test_busy_handler_is_consulted_then_gives_up() {
    let (_dir, path) = common::temp_db_path("busy.db");
    let holder = Connection::open_with(&path, &OpenOptions::default()).expect("open holder");
    holder.exec("CREATE TABLE t (x)").expect("create");
    holder.exec("BEGIN EXCLUSIVE").expect("lock");

    let waiter = Connection::open_with(&path, &OpenOptions::default()).expect("open waiter");
    let calls = AtomicUsize::new(0);
    unsafe { waiter.busy_handler(Some(give_up_after_two), data_ptr(&calls)) }.expect("install");

    let err = waiter.exec("SELECT * FROM t").expect_err("locked");
    assert_eq!(err.code.0, 5);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    unsafe { waiter.busy_handler(None, ptr::null_mut()) }.expect("remove");
    holder.exec("COMMIT").expect("unlock");
    waiter.exec("SELECT * FROM t").expect("unlocked read");
}

#[test]
fn test_busy_timeout_expires() {
    let (_dir, path) = common::temp_db_path("timeout.db");
    let holder = Connection::open_with(&path, &OpenOptions::default()).expect("open holder");
    holder.exec("CREATE TABLE t (x); BEGIN EXCLUSIVE;").expect("lock");

    let options = OpenOptions {
        busy_timeout_ms: Some(20),
        ..OpenOptions::default()
    };
    let waiter = Connection::open_with(&path, &options).expect("open waiter");
    let err = waiter.exec("SELECT * FROM t").expect_err("still locked");
    assert_eq!(err.code.0, 5);
}

#[test]
fn test_progress_handler_interrupts() {
    let conn = Connection::open_in_memory().expect("open");
    let calls = AtomicUsize::new(0);
    unsafe { conn.progress_handler(100, Some(always_interrupt), data_ptr(&calls)) };

    let err = conn
        .exec(
            "WITH RECURSIVE c(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM c WHERE i < 100000) \
             SELECT count(*) FROM c",
        )
        .expect_err("interrupted");
    assert_eq!(err.code.0, 9);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    unsafe { conn.progress_handler(0, None, ptr::null_mut()) };
    conn.exec("SELECT 1").expect("runs again");
}

#[test]
fn test_interrupt_stops_running_statement() {
    let conn = Connection::open_in_memory().expect("open");
    let (stmt, _) = conn
        .prepare_v2("WITH RECURSIVE c(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM c) SELECT i FROM c")
        .expect("prepare");
    let mut stmt = stmt.expect("statement");
    assert_eq!(stmt.step().expect("first row"), StepResult::Row);

    conn.interrupt();
    let err = stmt.step().expect_err("interrupted");
    assert_eq!(err.code.0, 9);
}

#[test]
fn test_commit_hook_can_veto() {
    let conn = Connection::open_in_memory().expect("open");
    conn.exec("CREATE TABLE t (x)").expect("create");
    let commits = AtomicUsize::new(0);
    let rollbacks = AtomicUsize::new(0);
    unsafe {
        conn.commit_hook(Some(veto_commit), data_ptr(&commits));
        conn.rollback_hook(Some(count_rollback), data_ptr(&rollbacks));
    }

    let err = conn
        .exec("BEGIN; INSERT INTO t VALUES (1); COMMIT;")
        .expect_err("vetoed");
    assert_eq!(err.code.primary(), 19);
    assert_eq!(commits.load(Ordering::SeqCst), 1);
    assert_eq!(rollbacks.load(Ordering::SeqCst), 1);

    let previous = unsafe { conn.commit_hook(None, ptr::null_mut()) };
    assert_eq!(previous, data_ptr(&commits));
    conn.exec("INSERT INTO t VALUES (2)").expect("commit allowed");
    assert_eq!(common::query_i64(&conn, "SELECT count(*) FROM t"), 1);
}

#[test]
fn test_update_hook_reports_row_changes() {
    let conn = Connection::open_in_memory().expect("open");
    conn.exec("CREATE TABLE t (x)").expect("create");
    let events = Mutex::new(Vec::<(UpdateOperation, String, i64)>::new());
    unsafe { conn.update_hook(Some(record_update), data_ptr(&events)) };

    conn.exec(
        "INSERT INTO t VALUES (10);
         UPDATE t SET x = 11 WHERE rowid = 1;
         DELETE FROM t WHERE x = 11;",
    )
    .expect("changes");
    unsafe { conn.update_hook(None, ptr::null_mut()) };

    let events = events.into_inner().expect("lock");
    assert_eq!(
        events,
        vec![
            (UpdateOperation::Insert, "t".to_string(), 1),
            (UpdateOperation::Update, "t".to_string(), 1),
            (UpdateOperation::Delete, "t".to_string(), 1),
        ]
    );
}

#[test]
fn test_trace_sees_statement_text() {
    let conn = Connection::open_in_memory().expect("open");
    let traced = Mutex::new(Vec::<String>::new());
    unsafe { conn.trace(Some(record_trace), data_ptr(&traced)) };

    conn.exec("SELECT 42; SELECT 43").expect("run");
    unsafe { conn.trace(None, ptr::null_mut()) };

    assert_eq!(
        traced.into_inner().expect("lock"),
        vec!["SELECT 42".to_string(), "SELECT 43".to_string()]
    );
}

#[test]
fn test_profile_sees_statement_text() {
    let conn = Connection::open_in_memory().expect("open");
    let profiled = Mutex::new(Vec::<String>::new());
    unsafe { conn.profile(Some(record_profile), data_ptr(&profiled)) };

    conn.exec("SELECT 42").expect("run");
    unsafe { conn.profile(None, ptr::null_mut()) };

    assert_eq!(profiled.into_inner().expect("lock"), vec!["SELECT 42".to_string()]);
}
