//! Safe wrapper around a `SQLite` database connection.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::ptr;

use super::config::OpenOptions;
use super::error::{check, check_db, classify, DbError, DbResult};
use super::ffi;
use super::handle::{CloseConnection, FinalizeStatement, Owned};
use super::statement::{Statement, StmtId};
use super::types::{LimitKind, OpenFlags};

type PrepareUtf8 = unsafe extern "C" fn(
    *mut ffi::sqlite3,
    *const c_char,
    c_int,
    *mut *mut ffi::sqlite3_stmt,
    *mut *const c_char,
) -> c_int;

type PrepareUtf16 = unsafe extern "C" fn(
    *mut ffi::sqlite3,
    *const c_void,
    c_int,
    *mut *mut ffi::sqlite3_stmt,
    *mut *const c_void,
) -> c_int;

/// A `SQLite` database connection.
///
/// Closed with `sqlite3_close_v2` when dropped. It is **not** `Sync`: use it
/// from one thread at a time. Statements and backups borrow the connection,
/// so they cannot outlive it.
///
/// A connection must be closed before a live [`Initialized`] token is
/// dropped, since that shuts the engine down.
///
/// [`Initialized`]: crate::Initialized
pub struct Connection {
    db: Owned<CloseConnection>,
}

// Safety: the handle may move between threads as long as only one thread
// uses it at a time, which `!Sync` enforces.
unsafe impl Send for Connection {}

/// Declared type, collation and constraints of one table column.
///
/// Fields follow the order of `sqlite3_table_column_metadata`'s output
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    /// Declared data type (empty when none was declared).
    pub data_type: String,
    /// Name of the default collation sequence.
    pub collation: String,
    /// Whether the column has a NOT NULL constraint.
    pub not_null: bool,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
    /// Whether the column is AUTOINCREMENT.
    pub autoincrement: bool,
}

impl From<ColumnMetadata> for (String, String, bool, bool, bool) {
    fn from(m: ColumnMetadata) -> Self {
        (m.data_type, m.collation, m.not_null, m.primary_key, m.autoincrement)
    }
}

impl Connection {
    /// Opens (or creates) a database with `sqlite3_open`.
    ///
    /// # Errors
    ///
    /// Fails when `path` contains a NUL byte or the engine cannot open it.
    pub fn open(path: &str) -> DbResult<Self> {
        let c_path = c_string(path, "path")?;
        let mut db: *mut ffi::sqlite3 = ptr::null_mut();
        // SAFETY: `c_path` is NUL-terminated and `db` is a valid out slot.
        let rc = unsafe { ffi::sqlite3_open(c_path.as_ptr(), &mut db) };
        Self::adopt(rc, db)
    }

    /// Opens (or creates) a database whose path is UTF-16 text.
    ///
    /// `path` holds native-endian code units without a terminator.
    ///
    /// # Errors
    ///
    /// Fails when `path` contains a zero code unit or the engine cannot open
    /// it.
    pub fn open16(path: &[u16]) -> DbResult<Self> {
        if path.contains(&0) {
            return Err(DbError::misuse("path contains a NUL code unit"));
        }
        let mut c_path = Vec::with_capacity(path.len() + 1);
        c_path.extend_from_slice(path);
        c_path.push(0);
        let mut db: *mut ffi::sqlite3 = ptr::null_mut();
        // SAFETY: `c_path` is zero-terminated and `db` is a valid out slot.
        let rc = unsafe { ffi::sqlite3_open16(c_path.as_ptr().cast(), &mut db) };
        Self::adopt(rc, db)
    }

    /// Opens a database with explicit flags and an optional VFS name.
    ///
    /// # Errors
    ///
    /// Fails when an argument contains a NUL byte or the engine cannot open
    /// the database with `flags`.
    pub fn open_v2(path: &str, flags: OpenFlags, vfs: Option<&str>) -> DbResult<Self> {
        let c_path = c_string(path, "path")?;
        let c_vfs = vfs.map(|v| c_string(v, "VFS name")).transpose()?;
        let mut db: *mut ffi::sqlite3 = ptr::null_mut();
        // SAFETY: both strings are NUL-terminated (or the VFS is NULL) and
        // `db` is a valid out slot.
        let rc = unsafe {
            ffi::sqlite3_open_v2(
                c_path.as_ptr(),
                &mut db,
                flags.bits(),
                c_vfs.as_ref().map_or(ptr::null(), |v| v.as_ptr()),
            )
        };
        Self::adopt(rc, db)
    }

    /// Opens a database described by `options`.
    ///
    /// # Errors
    ///
    /// Fails like [`open_v2`](Self::open_v2), when `path` is not valid
    /// UTF-8, or when the busy timeout cannot be applied.
    pub fn open_with(path: &Path, options: &OpenOptions) -> DbResult<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| DbError::misuse(format!("path is not valid UTF-8: {}", path.display())))?;
        let conn = Self::open_v2(path_str, options.flags(), options.vfs.as_deref())?;
        if let Some(ms) = options.busy_timeout_ms {
            conn.busy_timeout(ms)?;
        }
        Ok(conn)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Fails only when the engine cannot allocate the connection.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open_v2(":memory:", OpenFlags::default(), None)
    }

    /// Wraps whatever handle the open call produced before looking at `rc`,
    /// so a half-constructed connection is still closed on failure.
    fn adopt(rc: c_int, db: *mut ffi::sqlite3) -> DbResult<Self> {
        // SAFETY: `db` came from an open call and nothing else owns it.
        let conn = Self {
            db: unsafe { Owned::from_raw(db) },
        };
        check_db(rc, conn.raw())?;
        log::trace!("opened connection {db:p}");
        Ok(conn)
    }

    /// Returns the raw database handle (for use in [`Statement`] etc.).
    pub(crate) const fn raw(&self) -> *mut ffi::sqlite3 {
        self.db.as_ptr()
    }

    // ── Closing ─────────────────────────────────────────────────────────

    /// Closes the connection with `sqlite3_close`.
    ///
    /// # Errors
    ///
    /// When the engine refuses (for example because statements are still
    /// unfinalized) the connection is handed back together with the error.
    pub fn close(mut self) -> Result<(), (Self, DbError)> {
        // SAFETY: the handle is live; on success it is freed and disarmed.
        let rc = unsafe { ffi::sqlite3_close(self.raw()) };
        if classify(rc).is_err() {
            let err = DbError::from_connection(rc, self.raw());
            return Err((self, err));
        }
        self.db.disarm();
        Ok(())
    }

    /// Closes the connection with `sqlite3_close_v2`.
    ///
    /// Ownership is always given up; outstanding statements and backups
    /// keep the engine object alive until they are released.
    ///
    /// # Errors
    ///
    /// Returns the close result, described with the global code text since
    /// the connection is gone.
    pub fn close_v2(mut self) -> DbResult<()> {
        let raw = self.db.disarm();
        // SAFETY: `raw` was owned by `self` and is released exactly once.
        check(unsafe { ffi::sqlite3_close_v2(raw) })?;
        Ok(())
    }

    // ── exec ────────────────────────────────────────────────────────────

    /// Executes one or more SQL statements separated by semicolons.
    ///
    /// No result rows are returned. This is suitable for DDL, PRAGMAs, and
    /// multi-statement scripts.
    ///
    /// # Errors
    ///
    /// Returns the first failing statement's error, with the message the
    /// engine produced for it.
    pub fn exec(&self, sql: &str) -> DbResult<()> {
        // SAFETY: no callback is registered.
        unsafe { self.exec_raw(sql, None, ptr::null_mut()) }
    }

    /// Executes `sql`, calling `on_row` with each result row's values and
    /// column names. Returning `false` stops execution with `SQLITE_ABORT`.
    ///
    /// # Errors
    ///
    /// Same as [`exec`](Self::exec); an early stop reports `SQLITE_ABORT`.
    pub fn exec_with<F>(&self, sql: &str, mut on_row: F) -> DbResult<()>
    where
        F: FnMut(&[Option<String>], &[String]) -> bool,
    {
        let data: *mut F = &mut on_row;
        // SAFETY: `on_row` outlives the call and matches the trampoline's `F`.
        unsafe { self.exec_raw(sql, Some(exec_trampoline::<F>), data.cast()) }
    }

    /// Executes `sql` with a raw `sqlite3_exec` callback.
    ///
    /// The engine-owned error string is copied into the error and released
    /// with `sqlite3_free` on every path.
    ///
    /// # Errors
    ///
    /// Returns the engine's failure for the first failing statement.
    ///
    /// # Safety
    ///
    /// `callback` must be safe to call with `data` for every result row.
    pub unsafe fn exec_raw(
        &self,
        sql: &str,
        callback: Option<ffi::ExecCallback>,
        data: *mut c_void,
    ) -> DbResult<()> {
        let c_sql = c_string(sql, "SQL")?;
        let mut errmsg: *mut c_char = ptr::null_mut();
        // SAFETY: `c_sql` is NUL-terminated and `errmsg` is a valid out
        // slot; the callback contract is forwarded to the caller.
        let rc = unsafe { ffi::sqlite3_exec(self.raw(), c_sql.as_ptr(), callback, data, &mut errmsg) };
        let engine_message = EngineString(errmsg);
        if classify(rc).is_ok() {
            return Ok(());
        }
        let message = engine_message
            .text()
            .unwrap_or_else(|| self.errmsg());
        Err(DbError::new(rc, message))
    }

    // ── prepare ─────────────────────────────────────────────────────────

    /// Compiles the first statement in `sql` with `sqlite3_prepare_v2`.
    ///
    /// Returns the statement (`None` when `sql` holds only whitespace or
    /// comments) and the unconsumed rest of `sql`, a sub-slice of the
    /// input. An empty rest means everything was consumed.
    ///
    /// # Errors
    ///
    /// Fails when the first statement does not compile.
    pub fn prepare_v2<'sql>(
        &self,
        sql: &'sql str,
    ) -> DbResult<(Option<Statement<'_>>, &'sql str)> {
        self.prepare_utf8(sql, ffi::sqlite3_prepare_v2)
    }

    /// Like [`prepare_v2`](Self::prepare_v2) but with the legacy
    /// `sqlite3_prepare` interface.
    ///
    /// # Errors
    ///
    /// Fails when the first statement does not compile.
    pub fn prepare<'sql>(&self, sql: &'sql str) -> DbResult<(Option<Statement<'_>>, &'sql str)> {
        self.prepare_utf8(sql, ffi::sqlite3_prepare)
    }

    /// UTF-16 variant of [`prepare_v2`](Self::prepare_v2).
    ///
    /// `sql` holds native-endian code units; the rest is a sub-slice of it.
    ///
    /// # Errors
    ///
    /// Fails when the first statement does not compile.
    pub fn prepare16_v2<'sql>(
        &self,
        sql: &'sql [u16],
    ) -> DbResult<(Option<Statement<'_>>, &'sql [u16])> {
        self.prepare_utf16(sql, ffi::sqlite3_prepare16_v2)
    }

    /// UTF-16 variant of [`prepare`](Self::prepare).
    ///
    /// # Errors
    ///
    /// Fails when the first statement does not compile.
    pub fn prepare16<'sql>(
        &self,
        sql: &'sql [u16],
    ) -> DbResult<(Option<Statement<'_>>, &'sql [u16])> {
        self.prepare_utf16(sql, ffi::sqlite3_prepare16)
    }

    fn prepare_utf8<'sql>(
        &self,
        sql: &'sql str,
        native: PrepareUtf8,
    ) -> DbResult<(Option<Statement<'_>>, &'sql str)> {
        let n_byte = c_int::try_from(sql.len()).map_err(|_| DbError::too_big("SQL text", sql.len()))?;
        let start: *const c_char = sql.as_ptr().cast();
        let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();
        let mut tail: *const c_char = ptr::null();
        // SAFETY: `start` is valid for `n_byte` bytes and both out slots are
        // valid.
        let rc = unsafe { native(self.raw(), start, n_byte, &mut stmt, &mut tail) };
        // SAFETY: a non-null `stmt` is a fresh statement nothing else owns.
        let owned = unsafe { Owned::<FinalizeStatement>::from_raw(stmt) };
        check_db(rc, self.raw())?;

        let consumed = if tail.is_null() {
            sql.len()
        } else {
            // SAFETY: the engine sets the tail inside (or one past) `sql`.
            unsafe { tail.offset_from(start) as usize }
        };
        let rest = sql.get(consumed..).unwrap_or_default();
        Ok((self.statement(owned), rest))
    }

    fn prepare_utf16<'sql>(
        &self,
        sql: &'sql [u16],
        native: PrepareUtf16,
    ) -> DbResult<(Option<Statement<'_>>, &'sql [u16])> {
        let bytes = std::mem::size_of_val(sql);
        let n_byte = c_int::try_from(bytes).map_err(|_| DbError::too_big("SQL text", bytes))?;
        let start: *const c_void = sql.as_ptr().cast();
        let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();
        let mut tail: *const c_void = ptr::null();
        // SAFETY: `start` is valid for `n_byte` bytes and both out slots are
        // valid.
        let rc = unsafe { native(self.raw(), start, n_byte, &mut stmt, &mut tail) };
        // SAFETY: a non-null `stmt` is a fresh statement nothing else owns.
        let owned = unsafe { Owned::<FinalizeStatement>::from_raw(stmt) };
        check_db(rc, self.raw())?;

        let consumed = if tail.is_null() {
            sql.len()
        } else {
            // SAFETY: the engine sets the tail inside (or one past) `sql`;
            // the byte offset is a whole number of code units.
            let byte_offset = unsafe { tail.cast::<u8>().offset_from(start.cast::<u8>()) };
            byte_offset as usize / std::mem::size_of::<u16>()
        };
        let rest = sql.get(consumed..).unwrap_or_default();
        Ok((self.statement(owned), rest))
    }

    fn statement(&self, owned: Owned<FinalizeStatement>) -> Option<Statement<'_>> {
        if owned.is_null() {
            None
        } else {
            Some(Statement::new(owned, self.raw()))
        }
    }

    /// Returns the next prepared statement after `after` (or the first one),
    /// if any. Identifies statements without borrowing them.
    #[must_use]
    pub fn next_stmt(&self, after: Option<StmtId>) -> Option<StmtId> {
        let after = after.map_or(ptr::null_mut(), StmtId::as_ptr);
        // SAFETY: the handle is live; `after` is NULL or one of its
        // statements.
        StmtId::from_ptr(unsafe { ffi::sqlite3_next_stmt(self.raw(), after) })
    }

    // ── Pass-through queries ────────────────────────────────────────────

    /// Returns the number of rows changed by the most recent statement.
    #[must_use]
    pub fn changes(&self) -> usize {
        // SAFETY: the handle is live.
        unsafe { ffi::sqlite3_changes(self.raw()) as usize }
    }

    /// Returns the number of rows changed since the connection was opened.
    #[must_use]
    pub fn total_changes(&self) -> usize {
        // SAFETY: the handle is live.
        unsafe { ffi::sqlite3_total_changes(self.raw()) as usize }
    }

    /// Returns the rowid of the most recent successful INSERT.
    #[must_use]
    pub fn last_insert_rowid(&self) -> i64 {
        // SAFETY: the handle is live.
        unsafe { ffi::sqlite3_last_insert_rowid(self.raw()) }
    }

    /// Whether the connection is in autocommit mode (no open transaction).
    #[must_use]
    pub fn get_autocommit(&self) -> bool {
        // SAFETY: the handle is live.
        unsafe { ffi::sqlite3_get_autocommit(self.raw()) != 0 }
    }

    /// Whether the attached database `name` is read-only.
    ///
    /// Returns `None` when no database with that name is attached.
    ///
    /// # Errors
    ///
    /// Fails when `name` contains a NUL byte.
    pub fn db_readonly(&self, name: &str) -> DbResult<Option<bool>> {
        let c_name = c_string(name, "database name")?;
        // SAFETY: the handle is live and `c_name` is NUL-terminated.
        let rc = unsafe { ffi::sqlite3_db_readonly(self.raw(), c_name.as_ptr()) };
        Ok(match rc {
            -1 => None,
            flag => Some(flag != 0),
        })
    }

    /// Sets a run-time limit and returns its previous value.
    ///
    /// A negative `new_value` leaves the limit unchanged (a pure query).
    #[must_use = "the previous limit is the only output"]
    pub fn limit(&self, kind: LimitKind, new_value: i32) -> i32 {
        // SAFETY: the handle is live.
        unsafe { ffi::sqlite3_limit(self.raw(), kind.raw(), new_value) }
    }

    /// Returns metadata about `table.column` in database `db_name`
    /// (`None` searches every attached database).
    ///
    /// # Errors
    ///
    /// Fails when the table or column does not exist.
    pub fn table_column_metadata(
        &self,
        db_name: Option<&str>,
        table: &str,
        column: &str,
    ) -> DbResult<ColumnMetadata> {
        let c_db = db_name.map(|n| c_string(n, "database name")).transpose()?;
        let c_table = c_string(table, "table name")?;
        let c_column = c_string(column, "column name")?;

        let mut data_type: *const c_char = ptr::null();
        let mut collation: *const c_char = ptr::null();
        let mut not_null: c_int = 0;
        let mut primary_key: c_int = 0;
        let mut autoincrement: c_int = 0;
        // SAFETY: all inputs are NUL-terminated (or NULL) and all out slots
        // are valid.
        let rc = unsafe {
            ffi::sqlite3_table_column_metadata(
                self.raw(),
                c_db.as_ref().map_or(ptr::null(), |n| n.as_ptr()),
                c_table.as_ptr(),
                c_column.as_ptr(),
                &mut data_type,
                &mut collation,
                &mut not_null,
                &mut primary_key,
                &mut autoincrement,
            )
        };
        check_db(rc, self.raw())?;

        // SAFETY: on success the engine points the names at strings it
        // owns, or leaves them NULL.
        let (data_type, collation) =
            unsafe { (ffi::string_from_ptr(data_type), ffi::string_from_ptr(collation)) };
        Ok(ColumnMetadata {
            data_type,
            collation,
            not_null: not_null != 0,
            primary_key: primary_key != 0,
            autoincrement: autoincrement != 0,
        })
    }

    // ── Error state ─────────────────────────────────────────────────────

    /// The connection's most recent error message.
    #[must_use]
    pub fn errmsg(&self) -> String {
        // SAFETY: the handle is live.
        unsafe { ffi::string_from_ptr(ffi::sqlite3_errmsg(self.raw())) }
    }

    /// The connection's most recent primary result code.
    #[must_use]
    pub fn errcode(&self) -> i32 {
        // SAFETY: the handle is live.
        unsafe { ffi::sqlite3_errcode(self.raw()) }
    }

    /// The connection's most recent extended result code.
    #[must_use]
    pub fn extended_errcode(&self) -> i32 {
        // SAFETY: the handle is live.
        unsafe { ffi::sqlite3_extended_errcode(self.raw()) }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("db", &self.raw())
            .finish()
    }
}

/// Converts `text` into a C string, rejecting interior NUL bytes.
pub(crate) fn c_string(text: &str, what: &str) -> DbResult<CString> {
    CString::new(text).map_err(|e| DbError::misuse(format!("nul in {what}: {e}")))
}

/// An error string allocated by the engine, released with `sqlite3_free`.
struct EngineString(*mut c_char);

impl EngineString {
    fn text(&self) -> Option<String> {
        if self.0.is_null() {
            return None;
        }
        // SAFETY: non-null engine strings are NUL-terminated.
        Some(unsafe { CStr::from_ptr(self.0) }.to_string_lossy().into_owned())
    }
}

impl Drop for EngineString {
    fn drop(&mut self) {
        if !self.0.is_null() {
            // SAFETY: the engine allocated this string for us to free.
            unsafe { ffi::sqlite3_free(self.0.cast()) };
        }
    }
}

unsafe extern "C" fn exec_trampoline<F>(
    data: *mut c_void,
    n_columns: c_int,
    values: *mut *mut c_char,
    names: *mut *mut c_char,
) -> c_int
where
    F: FnMut(&[Option<String>], &[String]) -> bool,
{
    let n = usize::try_from(n_columns).unwrap_or(0);
    let mut row = Vec::with_capacity(n);
    let mut columns = Vec::with_capacity(n);
    for i in 0..n {
        // SAFETY: the engine passes `n_columns` entries in both arrays;
        // values may be NULL for SQL NULL, names never are.
        unsafe {
            let value = *values.add(i);
            row.push((!value.is_null()).then(|| ffi::string_from_ptr(value)));
            columns.push(ffi::string_from_ptr(*names.add(i)));
        }
    }
    // SAFETY: `data` is the `&mut F` passed by `exec_with` for this call.
    let on_row = unsafe { &mut *data.cast::<F>() };
    let keep_going =
        panic::catch_unwind(AssertUnwindSafe(|| on_row(&row, &columns))).unwrap_or(false);
    c_int::from(!keep_going)
}
