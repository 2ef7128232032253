//! Safe wrapper around a `SQLite` prepared statement.

use std::marker::PhantomData;
use std::os::raw::{c_int, c_void};
use std::ptr::NonNull;

use super::connection::{c_string, Connection};
use super::error::{check_db, DbError, DbResult, Outcome};
use super::ffi;
use super::handle::{FinalizeStatement, Owned};
use super::types::{ColumnType, StepResult, StmtStatusCounter, TextEncoding};
use super::value::ValueRef;

/// A prepared `SQLite` statement.
///
/// Created via [`Connection::prepare_v2`] and friends. Tied to the lifetime
/// of the connection that created it. Finalized when dropped.
///
/// Parameter indexes are 1-based and column indexes 0-based, exactly as the
/// engine counts them; out-of-range indexes are reported by the engine.
pub struct Statement<'conn> {
    stmt: Owned<FinalizeStatement>,
    db: *mut ffi::sqlite3,
    _conn: PhantomData<&'conn Connection>,
}

/// Identity of a prepared statement, as walked by
/// [`Connection::next_stmt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtId(NonNull<c_void>);

impl StmtId {
    pub(crate) fn from_ptr(raw: *mut ffi::sqlite3_stmt) -> Option<Self> {
        NonNull::new(raw).map(Self)
    }

    pub(crate) const fn as_ptr(self) -> *mut ffi::sqlite3_stmt {
        self.0.as_ptr()
    }
}

impl Statement<'_> {
    pub(crate) const fn new(stmt: Owned<FinalizeStatement>, db: *mut ffi::sqlite3) -> Self {
        Self {
            stmt,
            db,
            _conn: PhantomData,
        }
    }

    pub(crate) const fn raw(&self) -> *mut ffi::sqlite3_stmt {
        self.stmt.as_ptr()
    }

    fn check(&self, rc: c_int) -> DbResult<Outcome> {
        check_db(rc, self.db)
    }

    fn check_bind(&self, rc: c_int) -> DbResult<()> {
        self.check(rc).map(drop)
    }

    /// Identity of this statement.
    #[must_use]
    pub fn id(&self) -> StmtId {
        // A statement only exists once the engine produced a handle.
        StmtId(NonNull::new(self.raw()).unwrap_or(NonNull::dangling()))
    }

    // ── Binding ─────────────────────────────────────────────────────────

    /// Binds a blob, copied by the engine.
    ///
    /// # Errors
    ///
    /// `SQLITE_TOOBIG` when `value` is longer than the 32-bit length
    /// counter, otherwise the engine's bind failure.
    pub fn bind_blob(&mut self, index: i32, value: &[u8]) -> DbResult<()> {
        let len = c_int::try_from(value.len()).map_err(|_| DbError::too_big("blob", value.len()))?;
        // SAFETY: `value` is valid for `len` bytes; TRANSIENT makes the
        // engine copy it before returning.
        let rc = unsafe {
            ffi::sqlite3_bind_blob(self.raw(), index, value.as_ptr().cast(), len, ffi::SQLITE_TRANSIENT)
        };
        self.check_bind(rc)
    }

    /// Binds a blob with a 64-bit length, copied by the engine.
    ///
    /// # Errors
    ///
    /// Returns the engine's bind failure (`SQLITE_TOOBIG` past its limit).
    pub fn bind_blob64(&mut self, index: i32, value: &[u8]) -> DbResult<()> {
        // SAFETY: as in `bind_blob`.
        let rc = unsafe {
            ffi::sqlite3_bind_blob64(
                self.raw(),
                index,
                value.as_ptr().cast(),
                value.len() as u64,
                ffi::SQLITE_TRANSIENT,
            )
        };
        self.check_bind(rc)
    }

    /// Binds a blob the engine may reference without copying.
    ///
    /// # Errors
    ///
    /// Same as [`bind_blob`](Self::bind_blob).
    pub fn bind_blob_static(&mut self, index: i32, value: &'static [u8]) -> DbResult<()> {
        let len = c_int::try_from(value.len()).map_err(|_| DbError::too_big("blob", value.len()))?;
        // SAFETY: `value` lives for the rest of the program.
        let rc = unsafe {
            ffi::sqlite3_bind_blob(self.raw(), index, value.as_ptr().cast(), len, ffi::SQLITE_STATIC)
        };
        self.check_bind(rc)
    }

    /// Binds a 64-bit float.
    ///
    /// # Errors
    ///
    /// Returns the engine's bind failure.
    pub fn bind_double(&mut self, index: i32, value: f64) -> DbResult<()> {
        // SAFETY: the statement handle is live.
        let rc = unsafe { ffi::sqlite3_bind_double(self.raw(), index, value) };
        self.check_bind(rc)
    }

    /// Binds a 32-bit integer.
    ///
    /// # Errors
    ///
    /// Returns the engine's bind failure.
    pub fn bind_int(&mut self, index: i32, value: i32) -> DbResult<()> {
        // SAFETY: the statement handle is live.
        let rc = unsafe { ffi::sqlite3_bind_int(self.raw(), index, value) };
        self.check_bind(rc)
    }

    /// Binds a 64-bit integer.
    ///
    /// # Errors
    ///
    /// Returns the engine's bind failure.
    pub fn bind_int64(&mut self, index: i32, value: i64) -> DbResult<()> {
        // SAFETY: the statement handle is live.
        let rc = unsafe { ffi::sqlite3_bind_int64(self.raw(), index, value) };
        self.check_bind(rc)
    }

    /// Binds SQL NULL.
    ///
    /// # Errors
    ///
    /// Returns the engine's bind failure.
    pub fn bind_null(&mut self, index: i32) -> DbResult<()> {
        // SAFETY: the statement handle is live.
        let rc = unsafe { ffi::sqlite3_bind_null(self.raw(), index) };
        self.check_bind(rc)
    }

    /// Binds UTF-8 text, copied by the engine.
    ///
    /// # Errors
    ///
    /// `SQLITE_TOOBIG` when `value` is longer than the 32-bit length
    /// counter, otherwise the engine's bind failure.
    pub fn bind_text(&mut self, index: i32, value: &str) -> DbResult<()> {
        let len = c_int::try_from(value.len()).map_err(|_| DbError::too_big("text", value.len()))?;
        // SAFETY: `value` is valid for `len` bytes and copied by the engine.
        let rc = unsafe {
            ffi::sqlite3_bind_text(self.raw(), index, value.as_ptr().cast(), len, ffi::SQLITE_TRANSIENT)
        };
        self.check_bind(rc)
    }

    /// Binds UTF-8 text the engine may reference without copying.
    ///
    /// # Errors
    ///
    /// Same as [`bind_text`](Self::bind_text).
    pub fn bind_text_static(&mut self, index: i32, value: &'static str) -> DbResult<()> {
        let len = c_int::try_from(value.len()).map_err(|_| DbError::too_big("text", value.len()))?;
        // SAFETY: `value` lives for the rest of the program.
        let rc = unsafe {
            ffi::sqlite3_bind_text(self.raw(), index, value.as_ptr().cast(), len, ffi::SQLITE_STATIC)
        };
        self.check_bind(rc)
    }

    /// Binds native-endian UTF-16 text, copied by the engine.
    ///
    /// # Errors
    ///
    /// `SQLITE_TOOBIG` when the byte length does not fit the 32-bit counter,
    /// otherwise the engine's bind failure.
    pub fn bind_text16(&mut self, index: i32, value: &[u16]) -> DbResult<()> {
        let bytes = std::mem::size_of_val(value);
        let len = c_int::try_from(bytes).map_err(|_| DbError::too_big("text", bytes))?;
        // SAFETY: `value` is valid for `len` bytes and copied by the engine.
        let rc = unsafe {
            ffi::sqlite3_bind_text16(self.raw(), index, value.as_ptr().cast(), len, ffi::SQLITE_TRANSIENT)
        };
        self.check_bind(rc)
    }

    /// Binds text bytes in `encoding` with a 64-bit length.
    ///
    /// # Errors
    ///
    /// Returns the engine's bind failure (`SQLITE_TOOBIG` past its limit).
    pub fn bind_text64(&mut self, index: i32, value: &[u8], encoding: TextEncoding) -> DbResult<()> {
        // SAFETY: `value` is valid for its length and copied by the engine.
        let rc = unsafe {
            ffi::sqlite3_bind_text64(
                self.raw(),
                index,
                value.as_ptr().cast(),
                value.len() as u64,
                ffi::SQLITE_TRANSIENT,
                encoding.raw(),
            )
        };
        self.check_bind(rc)
    }

    /// Binds a copy of a value read from another statement.
    ///
    /// # Errors
    ///
    /// Returns the engine's bind failure.
    pub fn bind_value(&mut self, index: i32, value: &ValueRef<'_>) -> DbResult<()> {
        // SAFETY: `value` is alive for the call; the engine copies it.
        let rc = unsafe { ffi::sqlite3_bind_value(self.raw(), index, value.as_ptr()) };
        self.check_bind(rc)
    }

    /// Binds a blob of `len` zero bytes.
    ///
    /// # Errors
    ///
    /// Returns the engine's bind failure.
    pub fn bind_zeroblob(&mut self, index: i32, len: i32) -> DbResult<()> {
        // SAFETY: the statement handle is live.
        let rc = unsafe { ffi::sqlite3_bind_zeroblob(self.raw(), index, len) };
        self.check_bind(rc)
    }

    /// Binds a blob of `len` zero bytes with a 64-bit length.
    ///
    /// # Errors
    ///
    /// Returns the engine's bind failure (`SQLITE_TOOBIG` past its limit).
    pub fn bind_zeroblob64(&mut self, index: i32, len: u64) -> DbResult<()> {
        // SAFETY: the statement handle is live.
        let rc = unsafe { ffi::sqlite3_bind_zeroblob64(self.raw(), index, len) };
        self.check_bind(rc)
    }

    /// Number of the largest parameter index.
    #[must_use]
    pub fn bind_parameter_count(&self) -> i32 {
        // SAFETY: the statement handle is live.
        unsafe { ffi::sqlite3_bind_parameter_count(self.raw()) }
    }

    /// Index of the named parameter (including its `:`, `@` or `$`
    /// prefix), or 0 when there is none.
    ///
    /// # Errors
    ///
    /// Fails when `name` contains a NUL byte.
    pub fn bind_parameter_index(&self, name: &str) -> DbResult<i32> {
        let c_name = c_string(name, "parameter name")?;
        // SAFETY: the statement handle is live and `c_name` is terminated.
        Ok(unsafe { ffi::sqlite3_bind_parameter_index(self.raw(), c_name.as_ptr()) })
    }

    /// Name of parameter `index`; empty for nameless (`?`) or out-of-range
    /// parameters.
    #[must_use]
    pub fn bind_parameter_name(&self, index: i32) -> String {
        // SAFETY: the statement handle is live; the name (or NULL) is
        // copied before anything can change it.
        unsafe { ffi::string_from_ptr(ffi::sqlite3_bind_parameter_name(self.raw(), index)) }
    }

    /// Resets every parameter to NULL.
    ///
    /// # Errors
    ///
    /// Returns the engine's failure.
    pub fn clear_bindings(&mut self) -> DbResult<()> {
        // SAFETY: the statement handle is live.
        let rc = unsafe { ffi::sqlite3_clear_bindings(self.raw()) };
        self.check_bind(rc)
    }

    // ── Execution ───────────────────────────────────────────────────────

    /// Executes a single step.
    ///
    /// # Errors
    ///
    /// Returns the step failure described by the connection's message.
    pub fn step(&mut self) -> DbResult<StepResult> {
        // SAFETY: the statement handle is live.
        let rc = unsafe { ffi::sqlite3_step(self.raw()) };
        Ok(match self.check(rc)? {
            Outcome::Row => StepResult::Row,
            Outcome::Ok | Outcome::Done => StepResult::Done,
        })
    }

    /// Resets the statement so it can run again. Bindings are kept.
    ///
    /// # Errors
    ///
    /// Reports the failure of the most recent step, if it failed.
    pub fn reset(&mut self) -> DbResult<()> {
        // SAFETY: the statement handle is live.
        let rc = unsafe { ffi::sqlite3_reset(self.raw()) };
        self.check(rc).map(drop)
    }

    /// Finalizes the statement now and reports the result.
    ///
    /// # Errors
    ///
    /// Reports the failure of the most recent step, if it failed.
    pub fn finalize(mut self) -> DbResult<()> {
        let rc = self.stmt.release();
        self.check(rc).map(drop)
    }

    // ── Columns ─────────────────────────────────────────────────────────

    /// Number of columns in the result set.
    #[must_use]
    pub fn column_count(&self) -> i32 {
        // SAFETY: the statement handle is live.
        unsafe { ffi::sqlite3_column_count(self.raw()) }
    }

    /// Reads a column as a blob. Returns an empty `Vec` for NULL.
    #[must_use]
    pub fn column_blob(&self, index: i32) -> Vec<u8> {
        // SAFETY: the blob pointer is read before its length and copied
        // before the statement can move on.
        unsafe {
            let data = ffi::sqlite3_column_blob(self.raw(), index);
            let len = ffi::sqlite3_column_bytes(self.raw(), index);
            if data.is_null() || len <= 0 {
                return Vec::new();
            }
            std::slice::from_raw_parts(data.cast::<u8>(), len as usize).to_vec()
        }
    }

    /// Size of a column in bytes (after UTF-8 conversion for text).
    #[must_use]
    pub fn column_bytes(&self, index: i32) -> i32 {
        // SAFETY: the statement handle is live.
        unsafe { ffi::sqlite3_column_bytes(self.raw(), index) }
    }

    /// Size of a column in bytes after UTF-16 conversion.
    #[must_use]
    pub fn column_bytes16(&self, index: i32) -> i32 {
        // SAFETY: the statement handle is live.
        unsafe { ffi::sqlite3_column_bytes16(self.raw(), index) }
    }

    /// Reads a column as a 64-bit float.
    #[must_use]
    pub fn column_double(&self, index: i32) -> f64 {
        // SAFETY: the statement handle is live.
        unsafe { ffi::sqlite3_column_double(self.raw(), index) }
    }

    /// Reads a column as a 32-bit integer (truncating larger values).
    #[must_use]
    pub fn column_int(&self, index: i32) -> i32 {
        // SAFETY: the statement handle is live.
        unsafe { ffi::sqlite3_column_int(self.raw(), index) }
    }

    /// Reads a column as a 64-bit integer.
    #[must_use]
    pub fn column_int64(&self, index: i32) -> i64 {
        // SAFETY: the statement handle is live.
        unsafe { ffi::sqlite3_column_int64(self.raw(), index) }
    }

    /// Reads a column as UTF-8 text. Returns an empty string for NULL.
    ///
    /// The byte length comes from the engine, so embedded NULs survive.
    #[must_use]
    pub fn column_text(&self, index: i32) -> String {
        // SAFETY: the text pointer is read before its length and copied
        // before the statement can move on.
        unsafe {
            let data = ffi::sqlite3_column_text(self.raw(), index);
            let len = ffi::sqlite3_column_bytes(self.raw(), index);
            if data.is_null() || len <= 0 {
                return String::new();
            }
            let bytes = std::slice::from_raw_parts(data.cast::<u8>(), len as usize);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }

    /// Reads a column as native-endian UTF-16 code units.
    #[must_use]
    pub fn column_text16(&self, index: i32) -> Vec<u16> {
        // SAFETY: as in `column_text`; UTF-16 buffers are 2-byte aligned.
        unsafe {
            let data = ffi::sqlite3_column_text16(self.raw(), index);
            let len = ffi::sqlite3_column_bytes16(self.raw(), index);
            if data.is_null() || len <= 0 {
                return Vec::new();
            }
            let units = len as usize / std::mem::size_of::<u16>();
            std::slice::from_raw_parts(data.cast::<u16>(), units).to_vec()
        }
    }

    /// Storage class of a column in the current row.
    #[must_use]
    pub fn column_type(&self, index: i32) -> ColumnType {
        // SAFETY: the statement handle is live.
        ColumnType::from_raw(unsafe { ffi::sqlite3_column_type(self.raw(), index) })
    }

    /// Whether a column in the current row is SQL NULL.
    #[must_use]
    pub fn is_column_null(&self, index: i32) -> bool {
        self.column_type(index) == ColumnType::Null
    }

    /// Borrows a column of the current row as an unprotected value.
    ///
    /// Out-of-range indexes read as SQL NULL.
    #[must_use]
    pub fn column_value(&self, index: i32) -> Option<ValueRef<'_>> {
        // SAFETY: the value stays valid while `self` is borrowed, since
        // stepping or resetting needs `&mut self`.
        unsafe { ValueRef::from_raw(ffi::sqlite3_column_value(self.raw(), index)) }
    }

    /// Name of a result column.
    #[must_use]
    pub fn column_name(&self, index: i32) -> String {
        // SAFETY: the statement handle is live; the name is copied.
        unsafe { ffi::string_from_ptr(ffi::sqlite3_column_name(self.raw(), index)) }
    }

    /// Name of a result column as UTF-16 code units.
    #[must_use]
    pub fn column_name16(&self, index: i32) -> Vec<u16> {
        // SAFETY: the statement handle is live; the name is copied.
        unsafe { ffi::utf16_from_ptr(ffi::sqlite3_column_name16(self.raw(), index)) }
    }

    /// Declared type of a result column; empty for expressions.
    #[must_use]
    pub fn column_decltype(&self, index: i32) -> String {
        // SAFETY: the statement handle is live; the name is copied.
        unsafe { ffi::string_from_ptr(ffi::sqlite3_column_decltype(self.raw(), index)) }
    }

    /// Database a result column comes from; empty for expressions.
    #[must_use]
    pub fn column_database_name(&self, index: i32) -> String {
        // SAFETY: the statement handle is live; the name is copied.
        unsafe { ffi::string_from_ptr(ffi::sqlite3_column_database_name(self.raw(), index)) }
    }

    /// Table a result column comes from; empty for expressions.
    #[must_use]
    pub fn column_table_name(&self, index: i32) -> String {
        // SAFETY: the statement handle is live; the name is copied.
        unsafe { ffi::string_from_ptr(ffi::sqlite3_column_table_name(self.raw(), index)) }
    }

    /// Table column a result column comes from; empty for expressions.
    #[must_use]
    pub fn column_origin_name(&self, index: i32) -> String {
        // SAFETY: the statement handle is live; the name is copied.
        unsafe { ffi::string_from_ptr(ffi::sqlite3_column_origin_name(self.raw(), index)) }
    }

    // ── Introspection ───────────────────────────────────────────────────

    /// The SQL text the statement was compiled from.
    #[must_use]
    pub fn sql(&self) -> String {
        // SAFETY: the statement handle is live; the text is copied.
        unsafe { ffi::string_from_ptr(ffi::sqlite3_sql(self.raw())) }
    }

    /// Whether the statement has been stepped but not reset or finished.
    #[must_use]
    pub fn stmt_busy(&self) -> bool {
        // SAFETY: the statement handle is live.
        unsafe { ffi::sqlite3_stmt_busy(self.raw()) != 0 }
    }

    /// Whether the statement makes no direct changes to the database.
    #[must_use]
    pub fn stmt_readonly(&self) -> bool {
        // SAFETY: the statement handle is live.
        unsafe { ffi::sqlite3_stmt_readonly(self.raw()) != 0 }
    }

    /// Reads (and optionally resets) a per-statement counter.
    #[must_use = "the counter value is the only output"]
    pub fn stmt_status(&self, counter: StmtStatusCounter, reset: bool) -> i32 {
        // SAFETY: the statement handle is live.
        unsafe { ffi::sqlite3_stmt_status(self.raw(), counter.raw(), c_int::from(reset)) }
    }
}

impl std::fmt::Debug for Statement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement")
            .field("stmt", &self.raw())
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}
