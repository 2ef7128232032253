//! Process-wide engine initialization token.
//!
//! [`initialize`] returns an [`Initialized`] token only when the engine
//! initialized successfully. A token is either *live* or *moved*; dropping a
//! live token shuts the engine down (ignoring the result), dropping a moved
//! one does nothing. Ordinary Rust moves never run the source's destructor,
//! and [`Initialized::take`] / [`Initialized::transfer_from`] cover the case
//! where the token sits behind a `&mut` and has to be moved out explicitly.

use std::fmt;
use std::marker::PhantomData;
use std::os::raw::c_int;

use super::error::{check, DbResult};
use super::ffi;

/// How the process-wide engine state is brought up and torn down.
pub trait Lifecycle {
    /// Initializes the engine, returning its result code.
    fn initialize() -> c_int;
    /// Shuts the engine down, returning its result code.
    fn shutdown() -> c_int;
}

/// The linked `SQLite` engine (`sqlite3_initialize` / `sqlite3_shutdown`).
#[derive(Debug)]
pub enum Engine {}

impl Lifecycle for Engine {
    fn initialize() -> c_int {
        // SAFETY: no preconditions; redundant calls are harmless.
        unsafe { ffi::sqlite3_initialize() }
    }

    fn shutdown() -> c_int {
        // SAFETY: the caller of `initialize` guarantees that every
        // connection has been closed before the live token is dropped.
        unsafe { ffi::sqlite3_shutdown() }
    }
}

/// Proof that the engine was initialized; shuts it down exactly once.
///
/// # Shutdown ordering
///
/// Dropping a live token (or calling [`shutdown`](Self::shutdown)) calls
/// `sqlite3_shutdown`, which must not run while any [`Connection`] is still
/// open. Close or drop every connection, and with it every statement and
/// backup, before the live token goes away:
///
/// ```
/// use sqlkit_db::{initialize, Connection};
///
/// # fn main() -> sqlkit_db::DbResult<()> {
/// let token = initialize()?;
/// let conn = Connection::open_in_memory()?;
/// conn.exec("CREATE TABLE t (x)")?;
/// conn.close_v2()?;
/// token.shutdown()?;
/// # Ok(())
/// # }
/// ```
///
/// [`Connection`]: crate::Connection
#[must_use = "dropping the token shuts the engine down immediately"]
pub struct Initialized<L: Lifecycle = Engine> {
    live: bool,
    _lifecycle: PhantomData<L>,
}

/// Initializes the linked engine.
///
/// Every connection must be closed before the returned token is dropped;
/// see [`Initialized`]'s shutdown ordering.
///
/// # Errors
///
/// Returns the `sqlite3_initialize` failure; no token is produced then.
pub fn initialize() -> DbResult<Initialized> {
    Initialized::<Engine>::new()
}

impl<L: Lifecycle> Initialized<L> {
    /// Initializes through `L`.
    ///
    /// # Errors
    ///
    /// Returns the failure reported by [`Lifecycle::initialize`].
    pub fn new() -> DbResult<Self> {
        check(L::initialize())?;
        Ok(Self {
            live: true,
            _lifecycle: PhantomData,
        })
    }

    /// Whether this token still owns the shutdown.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.live
    }

    /// Moves the shutdown responsibility into a new token.
    ///
    /// `self` becomes moved; the returned token is live if `self` was.
    pub fn take(&mut self) -> Self {
        Self {
            live: std::mem::replace(&mut self.live, false),
            _lifecycle: PhantomData,
        }
    }

    /// Move-assigns `source` into `self`.
    ///
    /// `source` becomes moved and `self` becomes live if either was. The
    /// engine's shutdown is not reference counted, so two live tokens
    /// collapse into a single pending shutdown.
    pub fn transfer_from(&mut self, source: &mut Self) {
        self.live |= std::mem::replace(&mut source.live, false);
    }

    /// Shuts the engine down now and reports the result.
    ///
    /// A moved token returns `Ok(())` without touching the engine.
    ///
    /// # Errors
    ///
    /// Returns the failure reported by [`Lifecycle::shutdown`].
    pub fn shutdown(mut self) -> DbResult<()> {
        if std::mem::replace(&mut self.live, false) {
            check(L::shutdown())?;
        }
        Ok(())
    }
}

impl<L: Lifecycle> Drop for Initialized<L> {
    fn drop(&mut self) {
        if std::mem::replace(&mut self.live, false) {
            let rc = L::shutdown();
            if rc != ffi::SQLITE_OK {
                log::debug!("ignoring result {rc} from engine shutdown");
            }
        }
    }
}

impl<L: Lifecycle> fmt::Debug for Initialized<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Initialized")
            .field("live", &self.live)
            .finish()
    }
}
