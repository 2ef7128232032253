//! Interrupts, busy handling and engine callbacks.
//!
//! Callback registration forwards a raw `extern "C"` function pointer and an
//! opaque user-data pointer to the engine unchanged. Registering is `unsafe`:
//! the caller keeps the data alive (and the callback sound) for as long as it
//! stays registered. Passing `None` unregisters. The pointer returned by the
//! hook setters is the user data of the hook that was replaced.

use std::os::raw::{c_int, c_void};

use super::connection::Connection;
use super::error::{check_db, DbResult};
use super::ffi;

pub use super::ffi::{
    BusyHandler, CommitHook, ExecCallback, ProfileCallback, ProgressHandler, RollbackHook,
    TraceCallback, UpdateHook,
};

/// Row change reported to an [`UpdateHook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperation {
    /// `SQLITE_INSERT`.
    Insert,
    /// `SQLITE_UPDATE`.
    Update,
    /// `SQLITE_DELETE`.
    Delete,
}

impl UpdateOperation {
    /// Decodes the operation argument passed to an update hook.
    #[must_use]
    pub const fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            ffi::SQLITE_INSERT => Some(Self::Insert),
            ffi::SQLITE_UPDATE => Some(Self::Update),
            ffi::SQLITE_DELETE => Some(Self::Delete),
            _ => None,
        }
    }
}

impl Connection {
    /// Makes the running statement (if any) stop at the next opportunity
    /// with `SQLITE_INTERRUPT`.
    pub fn interrupt(&self) {
        // SAFETY: the handle is live.
        unsafe { ffi::sqlite3_interrupt(self.raw()) };
    }

    /// Retries on `SQLITE_BUSY` for up to `ms` milliseconds. Zero turns
    /// busy waiting off.
    ///
    /// # Errors
    ///
    /// Returns the engine's failure.
    pub fn busy_timeout(&self, ms: u32) -> DbResult<()> {
        let ms = c_int::try_from(ms).unwrap_or(c_int::MAX);
        // SAFETY: the handle is live.
        let rc = unsafe { ffi::sqlite3_busy_timeout(self.raw(), ms) };
        check_db(rc, self.raw())?;
        Ok(())
    }

    /// Installs (or with `None` removes) a busy handler.
    ///
    /// # Errors
    ///
    /// Returns the engine's failure.
    ///
    /// # Safety
    ///
    /// `handler` must be sound to call with `data` until it is replaced or
    /// the connection is closed.
    pub unsafe fn busy_handler(&self, handler: Option<BusyHandler>, data: *mut c_void) -> DbResult<()> {
        // SAFETY: forwarded caller contract.
        let rc = unsafe { ffi::sqlite3_busy_handler(self.raw(), handler, data) };
        check_db(rc, self.raw())?;
        Ok(())
    }

    /// Calls `handler` roughly every `n_ops` virtual machine instructions;
    /// a non-zero return interrupts the statement.
    ///
    /// # Safety
    ///
    /// Same contract as [`busy_handler`](Self::busy_handler).
    pub unsafe fn progress_handler(&self, n_ops: i32, handler: Option<ProgressHandler>, data: *mut c_void) {
        // SAFETY: forwarded caller contract.
        unsafe { ffi::sqlite3_progress_handler(self.raw(), n_ops, handler, data) };
    }

    /// Calls `callback` with the text of every statement as it starts.
    ///
    /// # Safety
    ///
    /// Same contract as [`busy_handler`](Self::busy_handler).
    pub unsafe fn trace(&self, callback: Option<TraceCallback>, data: *mut c_void) -> *mut c_void {
        // SAFETY: forwarded caller contract.
        unsafe { ffi::sqlite3_trace(self.raw(), callback, data) }
    }

    /// Calls `callback` with the text and elapsed nanoseconds of every
    /// finished statement.
    ///
    /// # Safety
    ///
    /// Same contract as [`busy_handler`](Self::busy_handler).
    pub unsafe fn profile(&self, callback: Option<ProfileCallback>, data: *mut c_void) -> *mut c_void {
        // SAFETY: forwarded caller contract.
        unsafe { ffi::sqlite3_profile(self.raw(), callback, data) }
    }

    /// Calls `hook` before every commit; a non-zero return turns the commit
    /// into a rollback.
    ///
    /// # Safety
    ///
    /// Same contract as [`busy_handler`](Self::busy_handler). The hook must
    /// not use the connection.
    pub unsafe fn commit_hook(&self, hook: Option<CommitHook>, data: *mut c_void) -> *mut c_void {
        // SAFETY: forwarded caller contract.
        unsafe { ffi::sqlite3_commit_hook(self.raw(), hook, data) }
    }

    /// Calls `hook` after every rollback.
    ///
    /// # Safety
    ///
    /// Same contract as [`commit_hook`](Self::commit_hook).
    pub unsafe fn rollback_hook(&self, hook: Option<RollbackHook>, data: *mut c_void) -> *mut c_void {
        // SAFETY: forwarded caller contract.
        unsafe { ffi::sqlite3_rollback_hook(self.raw(), hook, data) }
    }

    /// Calls `hook` for every row inserted, updated or deleted in a rowid
    /// table.
    ///
    /// # Safety
    ///
    /// Same contract as [`commit_hook`](Self::commit_hook).
    pub unsafe fn update_hook(&self, hook: Option<UpdateHook>, data: *mut c_void) -> *mut c_void {
        // SAFETY: forwarded caller contract.
        unsafe { ffi::sqlite3_update_hook(self.raw(), hook, data) }
    }
}
