//! Single-owner containers for raw engine handles.
//!
//! [`Owned`] binds one raw pointer to one [`Release`] strategy. It is never
//! `Clone`; moving it moves the handle. A NULL handle means "no resource",
//! and releasing it (or releasing twice) does nothing. Automatic release on
//! drop swallows the engine's result code.

use std::marker::PhantomData;
use std::os::raw::{c_int, c_void};
use std::ptr;

use super::ffi;

/// Release strategy for one kind of raw handle.
pub(crate) trait Release {
    /// Handle kind, used in log output.
    const KIND: &'static str;

    /// Releases `raw`, returning the engine's result code.
    ///
    /// # Safety
    ///
    /// `raw` must be a non-null handle of this kind that has not been
    /// released yet.
    unsafe fn release(raw: *mut c_void) -> c_int;
}

/// Connections are released with `sqlite3_close_v2`, which tolerates
/// statements and backups that are still outstanding.
pub(crate) enum CloseConnection {}

impl Release for CloseConnection {
    const KIND: &'static str = "connection";

    unsafe fn release(raw: *mut c_void) -> c_int {
        // SAFETY: forwarded caller contract.
        unsafe { ffi::sqlite3_close_v2(raw) }
    }
}

/// Statements are released with `sqlite3_finalize`.
pub(crate) enum FinalizeStatement {}

impl Release for FinalizeStatement {
    const KIND: &'static str = "statement";

    unsafe fn release(raw: *mut c_void) -> c_int {
        // SAFETY: forwarded caller contract.
        unsafe { ffi::sqlite3_finalize(raw) }
    }
}

/// Backups are released with `sqlite3_backup_finish`.
pub(crate) enum FinishBackup {}

impl Release for FinishBackup {
    const KIND: &'static str = "backup";

    unsafe fn release(raw: *mut c_void) -> c_int {
        // SAFETY: forwarded caller contract.
        unsafe { ffi::sqlite3_backup_finish(raw) }
    }
}

/// An exclusively owned raw handle.
pub(crate) struct Owned<R: Release> {
    raw: *mut c_void,
    _release: PhantomData<R>,
}

impl<R: Release> Owned<R> {
    /// Takes ownership of `raw`, which may be NULL.
    ///
    /// # Safety
    ///
    /// A non-null `raw` must be a live handle of kind `R` that nothing else
    /// will release.
    pub(crate) const unsafe fn from_raw(raw: *mut c_void) -> Self {
        Self {
            raw,
            _release: PhantomData,
        }
    }

    /// Returns the raw handle without giving up ownership.
    pub(crate) const fn as_ptr(&self) -> *mut c_void {
        self.raw
    }

    /// Whether this container holds no resource.
    pub(crate) fn is_null(&self) -> bool {
        self.raw.is_null()
    }

    /// Gives up ownership without releasing; the container becomes NULL.
    pub(crate) fn disarm(&mut self) -> *mut c_void {
        std::mem::replace(&mut self.raw, ptr::null_mut())
    }

    /// Releases the handle now and returns the engine's result code.
    ///
    /// A NULL container returns `SQLITE_OK` without calling the engine.
    pub(crate) fn release(&mut self) -> c_int {
        let raw = self.disarm();
        if raw.is_null() {
            return ffi::SQLITE_OK;
        }
        // SAFETY: `raw` was owned by this container and is now disarmed, so
        // it is released exactly once.
        unsafe { R::release(raw) }
    }
}

impl<R: Release> Drop for Owned<R> {
    fn drop(&mut self) {
        let rc = self.release();
        if rc != ffi::SQLITE_OK {
            log::debug!("ignoring result {rc} while releasing {}", R::KIND);
        }
    }
}

impl<R: Release> std::fmt::Debug for Owned<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple(R::KIND).field(&self.raw).finish()
    }
}
