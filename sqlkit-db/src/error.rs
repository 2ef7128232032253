//! Result classification and error construction.
//!
//! Every adaptor funnels its native result code through [`classify`]. Only
//! three codes are successes; everything else becomes a [`DbError`] whose
//! message comes from the connection when one is available and from the
//! engine's global code table otherwise.

use std::fmt;
use std::os::raw::c_int;

use thiserror::Error;

use super::ffi;

/// Error code returned by `SQLite` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DbErrorCode(pub i32);

impl DbErrorCode {
    /// The primary result code (extended codes carry it in the low byte).
    #[must_use]
    pub const fn primary(self) -> i32 {
        self.0 & 0xff
    }
}

impl fmt::Display for DbErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three non-error outcomes of a native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `SQLITE_OK`.
    Ok,
    /// `SQLITE_ROW`: a result row is available.
    Row,
    /// `SQLITE_DONE`: the operation has completed.
    Done,
}

/// Classifies a native result code.
///
/// `SQLITE_OK`, `SQLITE_ROW` and `SQLITE_DONE` are successes; every other
/// code, extended codes included, is a failure.
///
/// # Errors
///
/// Returns the code itself when it is not one of the three successes.
pub const fn classify(code: i32) -> Result<Outcome, DbErrorCode> {
    match code {
        ffi::SQLITE_OK => Ok(Outcome::Ok),
        ffi::SQLITE_ROW => Ok(Outcome::Row),
        ffi::SQLITE_DONE => Ok(Outcome::Done),
        other => Err(DbErrorCode(other)),
    }
}

/// Error returned by database operations.
///
/// Rendered as `SQLite error(<code>): <message>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SQLite error({code}): {message}")]
pub struct DbError {
    /// `SQLite` result code.
    pub code: DbErrorCode,
    /// Human-readable error message (connection message or global code text).
    pub message: String,
}

impl DbError {
    /// Creates a new database error.
    pub(crate) fn new(code: c_int, message: impl Into<String>) -> Self {
        Self {
            code: DbErrorCode(code),
            message: message.into(),
        }
    }

    /// Builds an error described by the engine's global code table.
    pub(crate) fn from_code(code: c_int) -> Self {
        Self::new(code, errstr(code))
    }

    /// Builds an error described by the connection's last error message.
    ///
    /// Falls back to the global code text when `db` is NULL.
    pub(crate) fn from_connection(code: c_int, db: *mut ffi::sqlite3) -> Self {
        if db.is_null() {
            return Self::from_code(code);
        }
        // SAFETY: `db` is a live connection handle owned by the caller.
        let message = unsafe { ffi::string_from_ptr(ffi::sqlite3_errmsg(db)) };
        Self::new(code, message)
    }

    /// Argument rejected before reaching the engine.
    pub(crate) fn misuse(message: impl Into<String>) -> Self {
        Self::new(ffi::SQLITE_MISUSE, message)
    }

    /// Length does not fit the native counter.
    pub(crate) fn too_big(what: &str, len: usize) -> Self {
        Self::new(
            ffi::SQLITE_TOOBIG,
            format!("{what} of {len} bytes exceeds the native length counter"),
        )
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Returns the engine's English description of a result code.
#[must_use]
pub fn errstr(code: i32) -> String {
    // SAFETY: `sqlite3_errstr` returns a static string for any input.
    unsafe { ffi::string_from_ptr(ffi::sqlite3_errstr(code)) }
}

/// Classifies `code`, describing a failure with the global code text.
pub(crate) fn check(code: c_int) -> DbResult<Outcome> {
    classify(code).map_err(|_| DbError::from_code(code))
}

/// Classifies `code`, describing a failure with `db`'s last error message.
pub(crate) fn check_db(code: c_int, db: *mut ffi::sqlite3) -> DbResult<Outcome> {
    classify(code).map_err(|_| DbError::from_connection(code, db))
}
