//! Type-safe adaptation layer over the `SQLite` C API.
//!
//! The crate keeps the native API's shape (same operations, same argument
//! order, same result codes) and fixes only what C leaves to discipline:
//!
//! * every result code goes through one classification rule: `SQLITE_OK`,
//!   `SQLITE_ROW` and `SQLITE_DONE` succeed and everything else becomes a
//!   [`DbError`] carrying the connection's message when one is at hand;
//! * connections, statements and backups are single-owner handles released
//!   exactly once, and borrow checking keeps statements and backups from
//!   outliving their connection;
//! * engine start-up and shutdown are tied to an [`Initialized`] token;
//! * multi-valued queries return tuples or records instead of out-pointers,
//!   and scan-status keys fix their result type at compile time.
//!
//! The engine itself is the amalgamation compiled by `libsqlite3-sys`
//! (`bundled`). The `ffi` module declares the subset of symbols used here
//! and is the only place that names C types directly.
//!
//! ```no_run
//! use sqlkit_db::{Connection, StepResult};
//!
//! # fn main() -> sqlkit_db::DbResult<()> {
//! let conn = Connection::open_in_memory()?;
//! let (stmt, rest) = conn.prepare_v2("SELECT 1")?;
//! assert!(rest.is_empty());
//! let mut stmt = stmt.expect("one statement");
//! assert_eq!(stmt.step()?, StepResult::Row);
//! assert_eq!(stmt.column_int64(0), 1);
//! stmt.finalize()?;
//! conn.close_v2()?;
//! # Ok(())
//! # }
//! ```

mod ffi;
mod handle;

pub mod backup;
pub mod config;
mod connection;
pub mod error;
pub mod hooks;
mod init;
pub mod scanstatus;
mod statement;
pub mod status;
pub mod types;
pub mod value;

pub use backup::{Backup, BackupStep};
pub use config::{MutexMode, OpenOptions};
pub use connection::{ColumnMetadata, Connection};
pub use error::{classify, errstr, DbError, DbErrorCode, DbResult, Outcome};
pub use init::{initialize, Engine, Initialized, Lifecycle};
pub use scanstatus::ScanStatusKey;
pub use statement::{Statement, StmtId};
pub use status::{
    complete, libversion, libversion_number, memory_highwater, memory_used, status, status64,
    threadsafe,
};
pub use types::{
    ColumnType, DbStatusKind, LimitKind, OpenFlags, StatusKind, StepResult, StmtStatusCounter,
    TextEncoding, ThreadingMode,
};
pub use value::{Value, ValueRef};

#[cfg(test)]
mod tests;
