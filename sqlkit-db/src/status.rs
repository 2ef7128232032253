//! Engine-wide and per-connection status counters, plus the global
//! pass-through queries that need no connection.

use std::os::raw::c_int;

use super::connection::{c_string, Connection};
use super::error::{check, check_db, DbResult};
use super::ffi;
use super::types::{DbStatusKind, StatusKind, ThreadingMode};

/// Reads an engine-wide counter as `(current, highwater)`.
///
/// With `reset` the high-water mark is reset to the current value; the
/// returned high-water mark is the one from before the reset.
///
/// # Errors
///
/// Fails when the engine does not recognise `kind`.
pub fn status(kind: StatusKind, reset: bool) -> DbResult<(i32, i32)> {
    let mut current: c_int = 0;
    let mut highwater: c_int = 0;
    // SAFETY: both out slots are valid.
    let rc = unsafe { ffi::sqlite3_status(kind.raw(), &mut current, &mut highwater, c_int::from(reset)) };
    check(rc)?;
    Ok((current, highwater))
}

/// 64-bit variant of [`status`].
///
/// # Errors
///
/// Fails when the engine does not recognise `kind`.
pub fn status64(kind: StatusKind, reset: bool) -> DbResult<(i64, i64)> {
    let mut current: i64 = 0;
    let mut highwater: i64 = 0;
    // SAFETY: both out slots are valid.
    let rc = unsafe { ffi::sqlite3_status64(kind.raw(), &mut current, &mut highwater, c_int::from(reset)) };
    check(rc)?;
    Ok((current, highwater))
}

impl Connection {
    /// Reads a per-connection counter as `(current, highwater)`.
    ///
    /// # Errors
    ///
    /// Fails when the engine does not recognise `kind`.
    pub fn db_status(&self, kind: DbStatusKind, reset: bool) -> DbResult<(i32, i32)> {
        let mut current: c_int = 0;
        let mut highwater: c_int = 0;
        // SAFETY: the handle is live and both out slots are valid.
        let rc = unsafe {
            ffi::sqlite3_db_status(self.raw(), kind.raw(), &mut current, &mut highwater, c_int::from(reset))
        };
        check_db(rc, self.raw())?;
        Ok((current, highwater))
    }
}

/// Threading mode the engine was compiled with.
#[must_use]
pub fn threadsafe() -> ThreadingMode {
    // SAFETY: no preconditions.
    ThreadingMode::from_raw(unsafe { ffi::sqlite3_threadsafe() })
}

/// Engine version string, e.g. `"3.46.0"`.
#[must_use]
pub fn libversion() -> String {
    // SAFETY: returns a static string.
    unsafe { ffi::string_from_ptr(ffi::sqlite3_libversion()) }
}

/// Engine version as `X * 1_000_000 + Y * 1_000 + Z`.
#[must_use]
pub fn libversion_number() -> i32 {
    // SAFETY: no preconditions.
    unsafe { ffi::sqlite3_libversion_number() }
}

/// Bytes of memory currently allocated by the engine.
#[must_use]
pub fn memory_used() -> i64 {
    // SAFETY: no preconditions.
    unsafe { ffi::sqlite3_memory_used() }
}

/// Highest value of [`memory_used`] so far, optionally resetting it.
#[must_use = "the high-water mark is the only output"]
pub fn memory_highwater(reset: bool) -> i64 {
    // SAFETY: no preconditions.
    unsafe { ffi::sqlite3_memory_highwater(c_int::from(reset)) }
}

/// Whether `sql` ends with a complete statement (a terminating semicolon
/// outside of any literal, comment or trigger body).
///
/// # Errors
///
/// Fails when `sql` contains a NUL byte or the engine runs out of memory.
pub fn complete(sql: &str) -> DbResult<bool> {
    let c_sql = c_string(sql, "SQL")?;
    // SAFETY: `c_sql` is NUL-terminated.
    match unsafe { ffi::sqlite3_complete(c_sql.as_ptr()) } {
        0 => Ok(false),
        1 => Ok(true),
        rc => check(rc).map(|_| false),
    }
}
