//! Raw FFI declarations for the SQLite C API.
//!
//! The symbols come from the SQLite amalgamation compiled by
//! `libsqlite3-sys` (`bundled` feature); this module only declares the
//! subset the adaptors call. All handle types are opaque `c_void` aliases so
//! the backend crate's generated types do not leak into the rest of the code.
//!
//! Besides the declarations this module holds the two C-string readers every
//! adaptor shares: both translate a NULL pointer into an empty result.

#![allow(non_camel_case_types, dead_code)]

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};

// Links the bundled engine; the declarations below bind to its symbols.
use libsqlite3_sys as _;

// ── Result codes ────────────────────────────────────────────────────────

pub const SQLITE_OK: c_int = 0;
pub const SQLITE_ERROR: c_int = 1;
pub const SQLITE_INTERNAL: c_int = 2;
pub const SQLITE_PERM: c_int = 3;
pub const SQLITE_ABORT: c_int = 4;
pub const SQLITE_BUSY: c_int = 5;
pub const SQLITE_LOCKED: c_int = 6;
pub const SQLITE_NOMEM: c_int = 7;
pub const SQLITE_READONLY: c_int = 8;
pub const SQLITE_INTERRUPT: c_int = 9;
pub const SQLITE_IOERR: c_int = 10;
pub const SQLITE_CORRUPT: c_int = 11;
pub const SQLITE_NOTFOUND: c_int = 12;
pub const SQLITE_FULL: c_int = 13;
pub const SQLITE_CANTOPEN: c_int = 14;
pub const SQLITE_PROTOCOL: c_int = 15;
pub const SQLITE_EMPTY: c_int = 16;
pub const SQLITE_SCHEMA: c_int = 17;
pub const SQLITE_TOOBIG: c_int = 18;
pub const SQLITE_CONSTRAINT: c_int = 19;
pub const SQLITE_MISMATCH: c_int = 20;
pub const SQLITE_MISUSE: c_int = 21;
pub const SQLITE_NOLFS: c_int = 22;
pub const SQLITE_AUTH: c_int = 23;
pub const SQLITE_FORMAT: c_int = 24;
pub const SQLITE_RANGE: c_int = 25;
pub const SQLITE_NOTADB: c_int = 26;
pub const SQLITE_NOTICE: c_int = 27;
pub const SQLITE_WARNING: c_int = 28;
pub const SQLITE_ROW: c_int = 100;
pub const SQLITE_DONE: c_int = 101;

// Column type constants
pub const SQLITE_INTEGER: c_int = 1;
pub const SQLITE_FLOAT: c_int = 2;
pub const SQLITE_TEXT: c_int = 3;
pub const SQLITE_BLOB: c_int = 4;
pub const SQLITE_NULL: c_int = 5;

// Text encodings
pub const SQLITE_UTF8: u8 = 1;
pub const SQLITE_UTF16LE: u8 = 2;
pub const SQLITE_UTF16BE: u8 = 3;
pub const SQLITE_UTF16: u8 = 4;

// Open flags
pub const SQLITE_OPEN_READONLY: c_int = 0x0000_0001;
pub const SQLITE_OPEN_READWRITE: c_int = 0x0000_0002;
pub const SQLITE_OPEN_CREATE: c_int = 0x0000_0004;
pub const SQLITE_OPEN_DELETEONCLOSE: c_int = 0x0000_0008;
pub const SQLITE_OPEN_EXCLUSIVE: c_int = 0x0000_0010;
pub const SQLITE_OPEN_AUTOPROXY: c_int = 0x0000_0020;
pub const SQLITE_OPEN_URI: c_int = 0x0000_0040;
pub const SQLITE_OPEN_MEMORY: c_int = 0x0000_0080;
pub const SQLITE_OPEN_MAIN_DB: c_int = 0x0000_0100;
pub const SQLITE_OPEN_TEMP_DB: c_int = 0x0000_0200;
pub const SQLITE_OPEN_TRANSIENT_DB: c_int = 0x0000_0400;
pub const SQLITE_OPEN_MAIN_JOURNAL: c_int = 0x0000_0800;
pub const SQLITE_OPEN_TEMP_JOURNAL: c_int = 0x0000_1000;
pub const SQLITE_OPEN_SUBJOURNAL: c_int = 0x0000_2000;
pub const SQLITE_OPEN_SUPER_JOURNAL: c_int = 0x0000_4000;
pub const SQLITE_OPEN_NOMUTEX: c_int = 0x0000_8000;
pub const SQLITE_OPEN_FULLMUTEX: c_int = 0x0001_0000;
pub const SQLITE_OPEN_SHAREDCACHE: c_int = 0x0002_0000;
pub const SQLITE_OPEN_PRIVATECACHE: c_int = 0x0004_0000;
pub const SQLITE_OPEN_WAL: c_int = 0x0008_0000;
pub const SQLITE_OPEN_NOFOLLOW: c_int = 0x0100_0000;
pub const SQLITE_OPEN_EXRESCODE: c_int = 0x0200_0000;

// Destructor markers (transient = -1 means SQLite copies the data)
pub const SQLITE_STATIC: isize = 0;
pub const SQLITE_TRANSIENT: isize = -1;

// Global status verbs
pub const SQLITE_STATUS_MEMORY_USED: c_int = 0;
pub const SQLITE_STATUS_PAGECACHE_USED: c_int = 1;
pub const SQLITE_STATUS_PAGECACHE_OVERFLOW: c_int = 2;
pub const SQLITE_STATUS_MALLOC_SIZE: c_int = 5;
pub const SQLITE_STATUS_PARSER_STACK: c_int = 6;
pub const SQLITE_STATUS_PAGECACHE_SIZE: c_int = 7;
pub const SQLITE_STATUS_MALLOC_COUNT: c_int = 9;

// Connection status verbs
pub const SQLITE_DBSTATUS_LOOKASIDE_USED: c_int = 0;
pub const SQLITE_DBSTATUS_CACHE_USED: c_int = 1;
pub const SQLITE_DBSTATUS_SCHEMA_USED: c_int = 2;
pub const SQLITE_DBSTATUS_STMT_USED: c_int = 3;
pub const SQLITE_DBSTATUS_LOOKASIDE_HIT: c_int = 4;
pub const SQLITE_DBSTATUS_LOOKASIDE_MISS_SIZE: c_int = 5;
pub const SQLITE_DBSTATUS_LOOKASIDE_MISS_FULL: c_int = 6;
pub const SQLITE_DBSTATUS_CACHE_HIT: c_int = 7;
pub const SQLITE_DBSTATUS_CACHE_MISS: c_int = 8;
pub const SQLITE_DBSTATUS_CACHE_WRITE: c_int = 9;
pub const SQLITE_DBSTATUS_DEFERRED_FKS: c_int = 10;
pub const SQLITE_DBSTATUS_CACHE_USED_SHARED: c_int = 11;
pub const SQLITE_DBSTATUS_CACHE_SPILL: c_int = 12;

// Statement counters
pub const SQLITE_STMTSTATUS_FULLSCAN_STEP: c_int = 1;
pub const SQLITE_STMTSTATUS_SORT: c_int = 2;
pub const SQLITE_STMTSTATUS_AUTOINDEX: c_int = 3;
pub const SQLITE_STMTSTATUS_VM_STEP: c_int = 4;
pub const SQLITE_STMTSTATUS_REPREPARE: c_int = 5;
pub const SQLITE_STMTSTATUS_RUN: c_int = 6;
pub const SQLITE_STMTSTATUS_FILTER_MISS: c_int = 7;
pub const SQLITE_STMTSTATUS_FILTER_HIT: c_int = 8;
pub const SQLITE_STMTSTATUS_MEMUSED: c_int = 99;

// Run-time limits
pub const SQLITE_LIMIT_LENGTH: c_int = 0;
pub const SQLITE_LIMIT_SQL_LENGTH: c_int = 1;
pub const SQLITE_LIMIT_COLUMN: c_int = 2;
pub const SQLITE_LIMIT_EXPR_DEPTH: c_int = 3;
pub const SQLITE_LIMIT_COMPOUND_SELECT: c_int = 4;
pub const SQLITE_LIMIT_VDBE_OP: c_int = 5;
pub const SQLITE_LIMIT_FUNCTION_ARG: c_int = 6;
pub const SQLITE_LIMIT_ATTACHED: c_int = 7;
pub const SQLITE_LIMIT_LIKE_PATTERN_LENGTH: c_int = 8;
pub const SQLITE_LIMIT_VARIABLE_NUMBER: c_int = 9;
pub const SQLITE_LIMIT_TRIGGER_DEPTH: c_int = 10;
pub const SQLITE_LIMIT_WORKER_THREADS: c_int = 11;

// Scan status verbs
pub const SQLITE_SCANSTAT_NLOOP: c_int = 0;
pub const SQLITE_SCANSTAT_NVISIT: c_int = 1;
pub const SQLITE_SCANSTAT_EST: c_int = 2;
pub const SQLITE_SCANSTAT_NAME: c_int = 3;
pub const SQLITE_SCANSTAT_EXPLAIN: c_int = 4;
pub const SQLITE_SCANSTAT_SELECTID: c_int = 5;
pub const SQLITE_SCANSTAT_PARENTID: c_int = 6;

// Update hook operations
pub const SQLITE_DELETE: c_int = 9;
pub const SQLITE_INSERT: c_int = 18;
pub const SQLITE_UPDATE: c_int = 23;

// ── Opaque handle types ─────────────────────────────────────────────────

pub type sqlite3 = c_void;
pub type sqlite3_stmt = c_void;
pub type sqlite3_backup = c_void;
pub type sqlite3_value = c_void;

// ── Callback signatures ─────────────────────────────────────────────────

/// Row callback for `sqlite3_exec`: `(data, column count, values, names)`.
pub type ExecCallback =
    unsafe extern "C" fn(*mut c_void, c_int, *mut *mut c_char, *mut *mut c_char) -> c_int;
/// Busy handler: `(data, times invoked so far)`; non-zero retries.
pub type BusyHandler = unsafe extern "C" fn(*mut c_void, c_int) -> c_int;
/// Progress handler: non-zero interrupts the running statement.
pub type ProgressHandler = unsafe extern "C" fn(*mut c_void) -> c_int;
/// Legacy trace callback: `(data, sql text)`.
pub type TraceCallback = unsafe extern "C" fn(*mut c_void, *const c_char);
/// Legacy profile callback: `(data, sql text, elapsed nanoseconds)`.
pub type ProfileCallback = unsafe extern "C" fn(*mut c_void, *const c_char, u64);
/// Commit hook: non-zero turns the commit into a rollback.
pub type CommitHook = unsafe extern "C" fn(*mut c_void) -> c_int;
/// Rollback hook.
pub type RollbackHook = unsafe extern "C" fn(*mut c_void);
/// Update hook: `(data, operation, database name, table name, rowid)`.
pub type UpdateHook =
    unsafe extern "C" fn(*mut c_void, c_int, *const c_char, *const c_char, i64);

// ── Native declarations ─────────────────────────────────────────────────

extern "C" {
    // Library lifecycle
    pub fn sqlite3_initialize() -> c_int;
    pub fn sqlite3_shutdown() -> c_int;
    pub fn sqlite3_libversion() -> *const c_char;
    pub fn sqlite3_libversion_number() -> c_int;
    pub fn sqlite3_threadsafe() -> c_int;
    pub fn sqlite3_complete(sql: *const c_char) -> c_int;

    // Memory
    pub fn sqlite3_free(ptr: *mut c_void);
    pub fn sqlite3_memory_used() -> i64;
    pub fn sqlite3_memory_highwater(reset: c_int) -> i64;

    // Connection lifecycle
    pub fn sqlite3_open(filename: *const c_char, pp_db: *mut *mut sqlite3) -> c_int;
    pub fn sqlite3_open16(filename: *const c_void, pp_db: *mut *mut sqlite3) -> c_int;
    pub fn sqlite3_open_v2(
        filename: *const c_char,
        pp_db: *mut *mut sqlite3,
        flags: c_int,
        z_vfs: *const c_char,
    ) -> c_int;
    pub fn sqlite3_close(db: *mut sqlite3) -> c_int;
    pub fn sqlite3_close_v2(db: *mut sqlite3) -> c_int;

    // Execution
    pub fn sqlite3_exec(
        db: *mut sqlite3,
        sql: *const c_char,
        callback: Option<ExecCallback>,
        arg: *mut c_void,
        errmsg: *mut *mut c_char,
    ) -> c_int;

    // Prepared statements
    pub fn sqlite3_prepare(
        db: *mut sqlite3,
        z_sql: *const c_char,
        n_byte: c_int,
        pp_stmt: *mut *mut sqlite3_stmt,
        pz_tail: *mut *const c_char,
    ) -> c_int;
    pub fn sqlite3_prepare_v2(
        db: *mut sqlite3,
        z_sql: *const c_char,
        n_byte: c_int,
        pp_stmt: *mut *mut sqlite3_stmt,
        pz_tail: *mut *const c_char,
    ) -> c_int;
    pub fn sqlite3_prepare16(
        db: *mut sqlite3,
        z_sql: *const c_void,
        n_byte: c_int,
        pp_stmt: *mut *mut sqlite3_stmt,
        pz_tail: *mut *const c_void,
    ) -> c_int;
    pub fn sqlite3_prepare16_v2(
        db: *mut sqlite3,
        z_sql: *const c_void,
        n_byte: c_int,
        pp_stmt: *mut *mut sqlite3_stmt,
        pz_tail: *mut *const c_void,
    ) -> c_int;

    pub fn sqlite3_step(stmt: *mut sqlite3_stmt) -> c_int;
    pub fn sqlite3_reset(stmt: *mut sqlite3_stmt) -> c_int;
    pub fn sqlite3_finalize(stmt: *mut sqlite3_stmt) -> c_int;
    pub fn sqlite3_clear_bindings(stmt: *mut sqlite3_stmt) -> c_int;
    pub fn sqlite3_db_handle(stmt: *mut sqlite3_stmt) -> *mut sqlite3;
    pub fn sqlite3_next_stmt(db: *mut sqlite3, stmt: *mut sqlite3_stmt) -> *mut sqlite3_stmt;
    pub fn sqlite3_sql(stmt: *mut sqlite3_stmt) -> *const c_char;
    pub fn sqlite3_stmt_busy(stmt: *mut sqlite3_stmt) -> c_int;
    pub fn sqlite3_stmt_readonly(stmt: *mut sqlite3_stmt) -> c_int;
    pub fn sqlite3_stmt_status(stmt: *mut sqlite3_stmt, op: c_int, reset: c_int) -> c_int;
    pub fn sqlite3_stmt_scanstatus(
        stmt: *mut sqlite3_stmt,
        idx: c_int,
        op: c_int,
        out: *mut c_void,
    ) -> c_int;
    pub fn sqlite3_stmt_scanstatus_reset(stmt: *mut sqlite3_stmt);

    // Parameter binding
    pub fn sqlite3_bind_blob(
        stmt: *mut sqlite3_stmt,
        index: c_int,
        value: *const c_void,
        n: c_int,
        destructor: isize,
    ) -> c_int;
    pub fn sqlite3_bind_blob64(
        stmt: *mut sqlite3_stmt,
        index: c_int,
        value: *const c_void,
        n: u64,
        destructor: isize,
    ) -> c_int;
    pub fn sqlite3_bind_double(stmt: *mut sqlite3_stmt, index: c_int, value: f64) -> c_int;
    pub fn sqlite3_bind_int(stmt: *mut sqlite3_stmt, index: c_int, value: c_int) -> c_int;
    pub fn sqlite3_bind_int64(stmt: *mut sqlite3_stmt, index: c_int, value: i64) -> c_int;
    pub fn sqlite3_bind_null(stmt: *mut sqlite3_stmt, index: c_int) -> c_int;
    pub fn sqlite3_bind_text(
        stmt: *mut sqlite3_stmt,
        index: c_int,
        value: *const c_char,
        n: c_int,
        destructor: isize,
    ) -> c_int;
    pub fn sqlite3_bind_text16(
        stmt: *mut sqlite3_stmt,
        index: c_int,
        value: *const c_void,
        n: c_int,
        destructor: isize,
    ) -> c_int;
    pub fn sqlite3_bind_text64(
        stmt: *mut sqlite3_stmt,
        index: c_int,
        value: *const c_char,
        n: u64,
        destructor: isize,
        encoding: u8,
    ) -> c_int;
    pub fn sqlite3_bind_value(
        stmt: *mut sqlite3_stmt,
        index: c_int,
        value: *const sqlite3_value,
    ) -> c_int;
    pub fn sqlite3_bind_zeroblob(stmt: *mut sqlite3_stmt, index: c_int, n: c_int) -> c_int;
    pub fn sqlite3_bind_zeroblob64(stmt: *mut sqlite3_stmt, index: c_int, n: u64) -> c_int;
    pub fn sqlite3_bind_parameter_count(stmt: *mut sqlite3_stmt) -> c_int;
    pub fn sqlite3_bind_parameter_index(stmt: *mut sqlite3_stmt, name: *const c_char) -> c_int;
    pub fn sqlite3_bind_parameter_name(stmt: *mut sqlite3_stmt, index: c_int) -> *const c_char;

    // Column reading
    pub fn sqlite3_column_blob(stmt: *mut sqlite3_stmt, i_col: c_int) -> *const c_void;
    pub fn sqlite3_column_bytes(stmt: *mut sqlite3_stmt, i_col: c_int) -> c_int;
    pub fn sqlite3_column_bytes16(stmt: *mut sqlite3_stmt, i_col: c_int) -> c_int;
    pub fn sqlite3_column_count(stmt: *mut sqlite3_stmt) -> c_int;
    pub fn sqlite3_column_double(stmt: *mut sqlite3_stmt, i_col: c_int) -> f64;
    pub fn sqlite3_column_int(stmt: *mut sqlite3_stmt, i_col: c_int) -> c_int;
    pub fn sqlite3_column_int64(stmt: *mut sqlite3_stmt, i_col: c_int) -> i64;
    pub fn sqlite3_column_name(stmt: *mut sqlite3_stmt, i_col: c_int) -> *const c_char;
    pub fn sqlite3_column_name16(stmt: *mut sqlite3_stmt, i_col: c_int) -> *const c_void;
    pub fn sqlite3_column_text(stmt: *mut sqlite3_stmt, i_col: c_int) -> *const c_char;
    pub fn sqlite3_column_text16(stmt: *mut sqlite3_stmt, i_col: c_int) -> *const c_void;
    pub fn sqlite3_column_type(stmt: *mut sqlite3_stmt, i_col: c_int) -> c_int;
    pub fn sqlite3_column_value(stmt: *mut sqlite3_stmt, i_col: c_int) -> *mut sqlite3_value;
    pub fn sqlite3_column_decltype(stmt: *mut sqlite3_stmt, i_col: c_int) -> *const c_char;
    pub fn sqlite3_column_database_name(stmt: *mut sqlite3_stmt, i_col: c_int) -> *const c_char;
    pub fn sqlite3_column_table_name(stmt: *mut sqlite3_stmt, i_col: c_int) -> *const c_char;
    pub fn sqlite3_column_origin_name(stmt: *mut sqlite3_stmt, i_col: c_int) -> *const c_char;

    // Engine values
    pub fn sqlite3_value_type(value: *mut sqlite3_value) -> c_int;
    pub fn sqlite3_value_int64(value: *mut sqlite3_value) -> i64;
    pub fn sqlite3_value_double(value: *mut sqlite3_value) -> f64;
    pub fn sqlite3_value_text(value: *mut sqlite3_value) -> *const c_char;
    pub fn sqlite3_value_blob(value: *mut sqlite3_value) -> *const c_void;
    pub fn sqlite3_value_bytes(value: *mut sqlite3_value) -> c_int;

    // Error reporting
    pub fn sqlite3_errmsg(db: *mut sqlite3) -> *const c_char;
    pub fn sqlite3_errcode(db: *mut sqlite3) -> c_int;
    pub fn sqlite3_extended_errcode(db: *mut sqlite3) -> c_int;
    pub fn sqlite3_errstr(code: c_int) -> *const c_char;

    // Connection queries
    pub fn sqlite3_changes(db: *mut sqlite3) -> c_int;
    pub fn sqlite3_total_changes(db: *mut sqlite3) -> c_int;
    pub fn sqlite3_last_insert_rowid(db: *mut sqlite3) -> i64;
    pub fn sqlite3_get_autocommit(db: *mut sqlite3) -> c_int;
    pub fn sqlite3_db_readonly(db: *mut sqlite3, z_db_name: *const c_char) -> c_int;
    pub fn sqlite3_limit(db: *mut sqlite3, id: c_int, new_val: c_int) -> c_int;
    pub fn sqlite3_table_column_metadata(
        db: *mut sqlite3,
        z_db_name: *const c_char,
        z_table_name: *const c_char,
        z_column_name: *const c_char,
        pz_data_type: *mut *const c_char,
        pz_coll_seq: *mut *const c_char,
        p_not_null: *mut c_int,
        p_primary_key: *mut c_int,
        p_autoinc: *mut c_int,
    ) -> c_int;

    // Status
    pub fn sqlite3_status(
        op: c_int,
        p_current: *mut c_int,
        p_highwater: *mut c_int,
        reset_flag: c_int,
    ) -> c_int;
    pub fn sqlite3_status64(
        op: c_int,
        p_current: *mut i64,
        p_highwater: *mut i64,
        reset_flag: c_int,
    ) -> c_int;
    pub fn sqlite3_db_status(
        db: *mut sqlite3,
        op: c_int,
        p_current: *mut c_int,
        p_highwater: *mut c_int,
        reset_flag: c_int,
    ) -> c_int;

    // Cancellation, retry, and hooks
    pub fn sqlite3_interrupt(db: *mut sqlite3);
    pub fn sqlite3_busy_handler(
        db: *mut sqlite3,
        callback: Option<BusyHandler>,
        arg: *mut c_void,
    ) -> c_int;
    pub fn sqlite3_busy_timeout(db: *mut sqlite3, ms: c_int) -> c_int;
    pub fn sqlite3_progress_handler(
        db: *mut sqlite3,
        n_ops: c_int,
        callback: Option<ProgressHandler>,
        arg: *mut c_void,
    );
    pub fn sqlite3_trace(
        db: *mut sqlite3,
        callback: Option<TraceCallback>,
        arg: *mut c_void,
    ) -> *mut c_void;
    pub fn sqlite3_profile(
        db: *mut sqlite3,
        callback: Option<ProfileCallback>,
        arg: *mut c_void,
    ) -> *mut c_void;
    pub fn sqlite3_commit_hook(
        db: *mut sqlite3,
        callback: Option<CommitHook>,
        arg: *mut c_void,
    ) -> *mut c_void;
    pub fn sqlite3_rollback_hook(
        db: *mut sqlite3,
        callback: Option<RollbackHook>,
        arg: *mut c_void,
    ) -> *mut c_void;
    pub fn sqlite3_update_hook(
        db: *mut sqlite3,
        callback: Option<UpdateHook>,
        arg: *mut c_void,
    ) -> *mut c_void;

    // Online backup
    pub fn sqlite3_backup_init(
        dest: *mut sqlite3,
        dest_name: *const c_char,
        source: *mut sqlite3,
        source_name: *const c_char,
    ) -> *mut sqlite3_backup;
    pub fn sqlite3_backup_step(backup: *mut sqlite3_backup, n_page: c_int) -> c_int;
    pub fn sqlite3_backup_finish(backup: *mut sqlite3_backup) -> c_int;
    pub fn sqlite3_backup_remaining(backup: *mut sqlite3_backup) -> c_int;
    pub fn sqlite3_backup_pagecount(backup: *mut sqlite3_backup) -> c_int;
}

// ── String readers ──────────────────────────────────────────────────────

/// Copies a NUL-terminated UTF-8 string owned by the engine.
///
/// NULL becomes an empty string; invalid UTF-8 is replaced lossily.
///
/// # Safety
///
/// `ptr` must be NULL or point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub unsafe fn string_from_ptr(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: non-null and NUL-terminated per the caller contract.
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Copies a NUL-terminated, native-endian UTF-16 string owned by the engine.
///
/// NULL becomes an empty vector.
///
/// # Safety
///
/// `ptr` must be NULL or point to a 2-byte aligned sequence of code units
/// terminated by a zero unit that stays valid for the duration of the call.
pub unsafe fn utf16_from_ptr(ptr: *const c_void) -> Vec<u16> {
    if ptr.is_null() {
        return Vec::new();
    }
    let units = ptr.cast::<u16>();
    let mut len = 0;
    // SAFETY: the string is zero-terminated per the caller contract.
    unsafe {
        while *units.add(len) != 0 {
            len += 1;
        }
        std::slice::from_raw_parts(units, len).to_vec()
    }
}
