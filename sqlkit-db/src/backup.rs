//! Online backup between two connections.

use std::marker::PhantomData;

use super::connection::{c_string, Connection};
use super::error::{check_db, classify, DbError, DbResult, Outcome};
use super::ffi;
use super::handle::{FinishBackup, Owned};

/// Progress reported by [`Backup::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStep {
    /// Pages were copied and more remain (`SQLITE_OK`).
    More,
    /// Every page has been copied (`SQLITE_DONE`).
    Done,
}

/// An in-progress copy of one database into another.
///
/// Borrows both connections, so neither can be closed while the backup
/// exists. Dropping it without [`finish`](Self::finish) still releases the
/// engine object, discarding the result.
pub struct Backup<'dst, 'src> {
    handle: Owned<FinishBackup>,
    dest: *mut ffi::sqlite3,
    _conns: PhantomData<(&'dst Connection, &'src Connection)>,
}

impl<'dst, 'src> Backup<'dst, 'src> {
    /// Starts copying database `src_name` of `src` into database
    /// `dest_name` of `dest` (both usually `"main"`).
    ///
    /// # Errors
    ///
    /// Fails, with the destination's error message, when the engine refuses
    /// to start the backup (for example when both sides are the same
    /// connection).
    pub fn new(
        dest: &'dst Connection,
        dest_name: &str,
        src: &'src Connection,
        src_name: &str,
    ) -> DbResult<Self> {
        let c_dest_name = c_string(dest_name, "database name")?;
        let c_src_name = c_string(src_name, "database name")?;
        // SAFETY: both connections are live for the borrow and both names
        // are NUL-terminated.
        let raw = unsafe {
            ffi::sqlite3_backup_init(dest.raw(), c_dest_name.as_ptr(), src.raw(), c_src_name.as_ptr())
        };
        if raw.is_null() {
            // SAFETY: `dest` is live; the code is whatever init left behind.
            let rc = unsafe { ffi::sqlite3_errcode(dest.raw()) };
            return Err(DbError::from_connection(rc, dest.raw()));
        }
        Ok(Self {
            // SAFETY: `raw` is a fresh backup nothing else owns.
            handle: unsafe { Owned::from_raw(raw) },
            dest: dest.raw(),
            _conns: PhantomData,
        })
    }

    /// Copies up to `pages` pages; a negative count copies everything left.
    ///
    /// # Errors
    ///
    /// Any result outside `SQLITE_OK`, `SQLITE_ROW` and `SQLITE_DONE`,
    /// including `SQLITE_BUSY` and `SQLITE_LOCKED`, described with the
    /// global code text.
    pub fn step(&mut self, pages: i32) -> DbResult<BackupStep> {
        // SAFETY: the backup handle is live until `finish` or drop.
        let rc = unsafe { ffi::sqlite3_backup_step(self.handle.as_ptr(), pages) };
        match classify(rc) {
            Ok(Outcome::Ok | Outcome::Row) => Ok(BackupStep::More),
            Ok(Outcome::Done) => Ok(BackupStep::Done),
            Err(_) => Err(DbError::from_code(rc)),
        }
    }

    /// Pages still to be copied, as of the last step.
    #[must_use]
    pub fn remaining(&self) -> i32 {
        // SAFETY: the backup handle is live.
        unsafe { ffi::sqlite3_backup_remaining(self.handle.as_ptr()) }
    }

    /// Total pages in the source database, as of the last step.
    #[must_use]
    pub fn page_count(&self) -> i32 {
        // SAFETY: the backup handle is live.
        unsafe { ffi::sqlite3_backup_pagecount(self.handle.as_ptr()) }
    }

    /// Releases the backup and reports its terminal result.
    ///
    /// # Errors
    ///
    /// Returns the first failure the backup ran into, described with the
    /// destination's error message.
    pub fn finish(mut self) -> DbResult<()> {
        let raw = self.handle.disarm();
        // SAFETY: `raw` was owned by the handle, which has been disarmed, so
        // it is finished exactly once.
        let rc = unsafe { ffi::sqlite3_backup_finish(raw) };
        check_db(rc, self.dest)?;
        log::trace!("backup into {:p} finished", self.dest);
        Ok(())
    }
}

impl std::fmt::Debug for Backup<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backup")
            .field("handle", &self.handle)
            .field("dest", &self.dest)
            .finish()
    }
}
