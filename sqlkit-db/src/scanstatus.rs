//! Per-loop query planner statistics (`sqlite3_stmt_scanstatus`).
//!
//! Every statistic is a zero-sized key type implementing [`ScanStatusKey`].
//! The key fixes the native storage the engine writes into and the Rust type
//! handed back, so asking for `Est` as an integer does not compile:
//!
//! ```no_run
//! # fn demo(stmt: &sqlkit_db::Statement<'_>) -> sqlkit_db::DbResult<()> {
//! use sqlkit_db::scanstatus::{Est, NLoop};
//!
//! let loops: i64 = stmt.scan_status::<NLoop>(0)?;
//! let estimate: f64 = stmt.scan_status::<Est>(0)?;
//! # let _ = (loops, estimate);
//! # Ok(())
//! # }
//! ```
//!
//! Requires an engine built with `SQLITE_ENABLE_STMT_SCANSTATUS`.

use std::os::raw::{c_char, c_int};

use super::error::{DbError, DbResult};
use super::ffi;
use super::statement::Statement;

mod sealed {
    /// Native storage the engine writes one statistic into.
    pub trait Slot: Copy {
        const EMPTY: Self;
    }

    impl Slot for i64 {
        const EMPTY: Self = 0;
    }

    impl Slot for f64 {
        const EMPTY: Self = 0.0;
    }

    impl Slot for std::os::raw::c_int {
        const EMPTY: Self = 0;
    }

    impl Slot for *const std::os::raw::c_char {
        const EMPTY: Self = std::ptr::null();
    }

    pub trait Sealed {}
}

/// A statistic readable with [`Statement::scan_status`].
///
/// Sealed: the set of keys is fixed by this crate.
pub trait ScanStatusKey: sealed::Sealed {
    /// Native storage the engine writes into.
    #[doc(hidden)]
    type Slot: sealed::Slot;
    /// Type handed back to the caller.
    type Output;
    /// `SQLITE_SCANSTAT_*` selector.
    #[doc(hidden)]
    const OP: c_int;

    /// Converts the filled slot.
    ///
    /// # Safety
    ///
    /// `slot` must have been written by the engine for this key, and the
    /// statement it came from must still be alive.
    #[doc(hidden)]
    unsafe fn read(slot: Self::Slot) -> Self::Output;
}

macro_rules! scan_key {
    ($(#[$meta:meta])* $name:ident = $op:path, $slot:ty => $output:ty, |$v:ident| $read:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub enum $name {}

        impl sealed::Sealed for $name {}

        impl ScanStatusKey for $name {
            type Slot = $slot;
            type Output = $output;
            const OP: c_int = $op;

            unsafe fn read($v: $slot) -> $output {
                $read
            }
        }
    };
}

scan_key!(
    /// Number of times the loop ran.
    NLoop = ffi::SQLITE_SCANSTAT_NLOOP, i64 => i64, |v| v
);
scan_key!(
    /// Total rows visited by the loop.
    NVisit = ffi::SQLITE_SCANSTAT_NVISIT, i64 => i64, |v| v
);
scan_key!(
    /// The planner's estimate of rows per iteration.
    Est = ffi::SQLITE_SCANSTAT_EST, f64 => f64, |v| v
);
scan_key!(
    /// Name of the table or index the loop scans.
    Name = ffi::SQLITE_SCANSTAT_NAME, *const c_char => String,
    |v| unsafe { ffi::string_from_ptr(v) }
);
scan_key!(
    /// EXPLAIN QUERY PLAN text for the loop.
    Explain = ffi::SQLITE_SCANSTAT_EXPLAIN, *const c_char => String,
    |v| unsafe { ffi::string_from_ptr(v) }
);
scan_key!(
    /// Id of the SELECT the loop belongs to.
    SelectId = ffi::SQLITE_SCANSTAT_SELECTID, c_int => i32, |v| v
);
scan_key!(
    /// Id of the parent of the loop's SELECT.
    ParentId = ffi::SQLITE_SCANSTAT_PARENTID, c_int => i32, |v| v
);

impl Statement<'_> {
    /// Reads statistic `K` for loop `loop_index` (0-based, in plan order).
    ///
    /// # Errors
    ///
    /// Fails, with the global code text, when `loop_index` is out of range.
    pub fn scan_status<K: ScanStatusKey>(&self, loop_index: i32) -> DbResult<K::Output> {
        let mut slot = <K::Slot as sealed::Slot>::EMPTY;
        let out: *mut K::Slot = &mut slot;
        // SAFETY: `out` points to storage of the type the engine writes for
        // `K::OP`.
        let rc = unsafe { ffi::sqlite3_stmt_scanstatus(self.raw(), loop_index, K::OP, out.cast()) };
        if rc != ffi::SQLITE_OK {
            return Err(DbError::from_code(rc));
        }
        // SAFETY: the engine filled `slot` for this key; strings it points
        // to belong to the statement, which is borrowed.
        Ok(unsafe { K::read(slot) })
    }

    /// Zeroes every scan-status counter of this statement.
    pub fn scan_status_reset(&mut self) {
        // SAFETY: the statement handle is live.
        unsafe { ffi::sqlite3_stmt_scanstatus_reset(self.raw()) };
    }
}
