//! Strongly typed flags and selectors.
//!
//! Each native integer category gets its own type so that, for example, a
//! status verb cannot be passed where a limit id is expected.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign};
use std::os::raw::c_int;

use super::ffi;

/// Flags for [`Connection::open_v2`](crate::Connection::open_v2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpenFlags(c_int);

impl OpenFlags {
    /// Open read-only.
    pub const READONLY: Self = Self(ffi::SQLITE_OPEN_READONLY);
    /// Open for reading and writing.
    pub const READWRITE: Self = Self(ffi::SQLITE_OPEN_READWRITE);
    /// Create the database if it does not exist.
    pub const CREATE: Self = Self(ffi::SQLITE_OPEN_CREATE);
    /// VFS only: delete the file on close.
    pub const DELETEONCLOSE: Self = Self(ffi::SQLITE_OPEN_DELETEONCLOSE);
    /// VFS only: exclusive open.
    pub const EXCLUSIVE: Self = Self(ffi::SQLITE_OPEN_EXCLUSIVE);
    /// VFS only: auto proxy.
    pub const AUTOPROXY: Self = Self(ffi::SQLITE_OPEN_AUTOPROXY);
    /// Interpret the filename as a URI.
    pub const URI: Self = Self(ffi::SQLITE_OPEN_URI);
    /// Pure in-memory database.
    pub const MEMORY: Self = Self(ffi::SQLITE_OPEN_MEMORY);
    /// VFS only: main database file.
    pub const MAIN_DB: Self = Self(ffi::SQLITE_OPEN_MAIN_DB);
    /// VFS only: temporary database file.
    pub const TEMP_DB: Self = Self(ffi::SQLITE_OPEN_TEMP_DB);
    /// VFS only: transient database file.
    pub const TRANSIENT_DB: Self = Self(ffi::SQLITE_OPEN_TRANSIENT_DB);
    /// VFS only: main journal.
    pub const MAIN_JOURNAL: Self = Self(ffi::SQLITE_OPEN_MAIN_JOURNAL);
    /// VFS only: temporary journal.
    pub const TEMP_JOURNAL: Self = Self(ffi::SQLITE_OPEN_TEMP_JOURNAL);
    /// VFS only: sub-journal.
    pub const SUBJOURNAL: Self = Self(ffi::SQLITE_OPEN_SUBJOURNAL);
    /// VFS only: super-journal (formerly master journal).
    pub const SUPER_JOURNAL: Self = Self(ffi::SQLITE_OPEN_SUPER_JOURNAL);
    /// Multi-thread mode for this connection.
    pub const NOMUTEX: Self = Self(ffi::SQLITE_OPEN_NOMUTEX);
    /// Serialized mode for this connection.
    pub const FULLMUTEX: Self = Self(ffi::SQLITE_OPEN_FULLMUTEX);
    /// Enable shared cache.
    pub const SHAREDCACHE: Self = Self(ffi::SQLITE_OPEN_SHAREDCACHE);
    /// Disable shared cache.
    pub const PRIVATECACHE: Self = Self(ffi::SQLITE_OPEN_PRIVATECACHE);
    /// VFS only: WAL file.
    pub const WAL: Self = Self(ffi::SQLITE_OPEN_WAL);
    /// Refuse to open symbolic links.
    pub const NOFOLLOW: Self = Self(ffi::SQLITE_OPEN_NOFOLLOW);
    /// Report extended result codes on this connection.
    pub const EXRESCODE: Self = Self(ffi::SQLITE_OPEN_EXRESCODE);

    /// No flags set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds flags from a raw native value.
    #[must_use]
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    /// The raw native value.
    #[must_use]
    pub const fn bits(self) -> i32 {
        self.0
    }

    /// Whether every flag in `other` is also set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for OpenFlags {
    /// `READWRITE | CREATE`, what `sqlite3_open` uses.
    fn default() -> Self {
        Self::READWRITE | Self::CREATE
    }
}

impl BitOr for OpenFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for OpenFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for OpenFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for OpenFlags {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitXor for OpenFlags {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for OpenFlags {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

/// Result of a single `sqlite3_step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// A result row is available (`SQLITE_ROW`).
    Row,
    /// The statement has finished executing (`SQLITE_DONE`).
    Done,
}

/// Text encoding passed to `sqlite3_bind_text64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8.
    Utf8,
    /// UTF-16 little endian.
    Utf16Le,
    /// UTF-16 big endian.
    Utf16Be,
    /// UTF-16 in native byte order.
    Utf16,
}

impl TextEncoding {
    pub(crate) const fn raw(self) -> u8 {
        match self {
            Self::Utf8 => ffi::SQLITE_UTF8,
            Self::Utf16Le => ffi::SQLITE_UTF16LE,
            Self::Utf16Be => ffi::SQLITE_UTF16BE,
            Self::Utf16 => ffi::SQLITE_UTF16,
        }
    }
}

/// Storage class of a column or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// `SQLITE_INTEGER`.
    Integer,
    /// `SQLITE_FLOAT`.
    Float,
    /// `SQLITE_TEXT`.
    Text,
    /// `SQLITE_BLOB`.
    Blob,
    /// `SQLITE_NULL`.
    Null,
}

impl ColumnType {
    pub(crate) const fn from_raw(raw: c_int) -> Self {
        match raw {
            ffi::SQLITE_INTEGER => Self::Integer,
            ffi::SQLITE_FLOAT => Self::Float,
            ffi::SQLITE_TEXT => Self::Text,
            ffi::SQLITE_BLOB => Self::Blob,
            _ => Self::Null,
        }
    }
}

macro_rules! selector {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $raw:path,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            pub(crate) const fn raw(self) -> c_int {
                match self {
                    $(Self::$variant => $raw,)+
                }
            }
        }
    };
}

selector! {
    /// Process-wide counters read by [`status`](fn@crate::status) and
    /// [`status64`](fn@crate::status64).
    StatusKind {
        /// Bytes of memory currently checked out.
        MemoryUsed = ffi::SQLITE_STATUS_MEMORY_USED,
        /// Page-cache slots in use.
        PagecacheUsed = ffi::SQLITE_STATUS_PAGECACHE_USED,
        /// Page-cache bytes that overflowed to the general allocator.
        PagecacheOverflow = ffi::SQLITE_STATUS_PAGECACHE_OVERFLOW,
        /// Largest single allocation request.
        MallocSize = ffi::SQLITE_STATUS_MALLOC_SIZE,
        /// Deepest parser stack.
        ParserStack = ffi::SQLITE_STATUS_PARSER_STACK,
        /// Largest page-cache allocation request.
        PagecacheSize = ffi::SQLITE_STATUS_PAGECACHE_SIZE,
        /// Number of separate allocations currently outstanding.
        MallocCount = ffi::SQLITE_STATUS_MALLOC_COUNT,
    }
}

selector! {
    /// Per-connection counters read by
    /// [`Connection::db_status`](crate::Connection::db_status).
    DbStatusKind {
        /// Lookaside slots in use.
        LookasideUsed = ffi::SQLITE_DBSTATUS_LOOKASIDE_USED,
        /// Heap bytes used by the pager caches.
        CacheUsed = ffi::SQLITE_DBSTATUS_CACHE_USED,
        /// Heap bytes used by schemas.
        SchemaUsed = ffi::SQLITE_DBSTATUS_SCHEMA_USED,
        /// Heap bytes used by prepared statements.
        StmtUsed = ffi::SQLITE_DBSTATUS_STMT_USED,
        /// Lookaside hits.
        LookasideHit = ffi::SQLITE_DBSTATUS_LOOKASIDE_HIT,
        /// Lookaside misses because the request was too large.
        LookasideMissSize = ffi::SQLITE_DBSTATUS_LOOKASIDE_MISS_SIZE,
        /// Lookaside misses because every slot was taken.
        LookasideMissFull = ffi::SQLITE_DBSTATUS_LOOKASIDE_MISS_FULL,
        /// Pager cache hits.
        CacheHit = ffi::SQLITE_DBSTATUS_CACHE_HIT,
        /// Pager cache misses.
        CacheMiss = ffi::SQLITE_DBSTATUS_CACHE_MISS,
        /// Dirty pages written to disk.
        CacheWrite = ffi::SQLITE_DBSTATUS_CACHE_WRITE,
        /// Whether unresolved deferred foreign keys exist.
        DeferredFks = ffi::SQLITE_DBSTATUS_DEFERRED_FKS,
        /// Pager cache bytes, shared caches divided among their users.
        CacheUsedShared = ffi::SQLITE_DBSTATUS_CACHE_USED_SHARED,
        /// Dirty pages spilled mid-transaction.
        CacheSpill = ffi::SQLITE_DBSTATUS_CACHE_SPILL,
    }
}

selector! {
    /// Per-statement counters read by
    /// [`Statement::stmt_status`](crate::Statement::stmt_status).
    StmtStatusCounter {
        /// Forward steps of full table scans.
        FullscanStep = ffi::SQLITE_STMTSTATUS_FULLSCAN_STEP,
        /// Sort operations.
        Sort = ffi::SQLITE_STMTSTATUS_SORT,
        /// Rows inserted into transient automatic indexes.
        Autoindex = ffi::SQLITE_STMTSTATUS_AUTOINDEX,
        /// Virtual machine operations.
        VmStep = ffi::SQLITE_STMTSTATUS_VM_STEP,
        /// Automatic re-preparations.
        Reprepare = ffi::SQLITE_STMTSTATUS_REPREPARE,
        /// Completed runs.
        Run = ffi::SQLITE_STMTSTATUS_RUN,
        /// Bloom filter misses.
        FilterMiss = ffi::SQLITE_STMTSTATUS_FILTER_MISS,
        /// Bloom filter hits.
        FilterHit = ffi::SQLITE_STMTSTATUS_FILTER_HIT,
        /// Approximate heap bytes used by the statement.
        MemUsed = ffi::SQLITE_STMTSTATUS_MEMUSED,
    }
}

selector! {
    /// Run-time limits adjusted by [`Connection::limit`](crate::Connection::limit).
    LimitKind {
        /// Maximum string or blob size.
        Length = ffi::SQLITE_LIMIT_LENGTH,
        /// Maximum SQL statement length.
        SqlLength = ffi::SQLITE_LIMIT_SQL_LENGTH,
        /// Maximum number of columns.
        Column = ffi::SQLITE_LIMIT_COLUMN,
        /// Maximum expression tree depth.
        ExprDepth = ffi::SQLITE_LIMIT_EXPR_DEPTH,
        /// Maximum terms in a compound select.
        CompoundSelect = ffi::SQLITE_LIMIT_COMPOUND_SELECT,
        /// Maximum virtual machine instructions per statement.
        VdbeOp = ffi::SQLITE_LIMIT_VDBE_OP,
        /// Maximum function arguments.
        FunctionArg = ffi::SQLITE_LIMIT_FUNCTION_ARG,
        /// Maximum attached databases.
        Attached = ffi::SQLITE_LIMIT_ATTACHED,
        /// Maximum LIKE/GLOB pattern length.
        LikePatternLength = ffi::SQLITE_LIMIT_LIKE_PATTERN_LENGTH,
        /// Maximum host parameter number.
        VariableNumber = ffi::SQLITE_LIMIT_VARIABLE_NUMBER,
        /// Maximum trigger recursion depth.
        TriggerDepth = ffi::SQLITE_LIMIT_TRIGGER_DEPTH,
        /// Maximum auxiliary worker threads.
        WorkerThreads = ffi::SQLITE_LIMIT_WORKER_THREADS,
    }
}

/// Threading mode the engine was compiled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadingMode {
    /// `SQLITE_THREADSAFE=0`: no mutexes at all.
    SingleThread,
    /// `SQLITE_THREADSAFE=1`: connections may be shared between threads.
    Serialized,
    /// `SQLITE_THREADSAFE=2`: one connection per thread.
    MultiThread,
}

impl ThreadingMode {
    pub(crate) const fn from_raw(raw: c_int) -> Self {
        match raw {
            0 => Self::SingleThread,
            2 => Self::MultiThread,
            _ => Self::Serialized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_flags_ops() {
        let mut flags = OpenFlags::READWRITE | OpenFlags::CREATE;
        assert_eq!(flags, OpenFlags::default());
        assert_eq!(flags.bits(), 0x6);
        assert!(flags.contains(OpenFlags::CREATE));
        assert!(!flags.contains(OpenFlags::URI));

        flags |= OpenFlags::URI;
        assert!(flags.contains(OpenFlags::URI | OpenFlags::READWRITE));
        flags &= OpenFlags::URI;
        assert_eq!(flags, OpenFlags::URI);
        flags ^= OpenFlags::URI;
        assert_eq!(flags, OpenFlags::empty());
        assert_eq!(OpenFlags::from_bits(0x40), OpenFlags::URI);
        assert!(OpenFlags::READONLY < OpenFlags::READWRITE);
    }

    #[test]
    fn test_selectors_map_to_native_values() {
        assert_eq!(StatusKind::MallocCount.raw(), 9);
        assert_eq!(DbStatusKind::CacheSpill.raw(), 12);
        assert_eq!(StmtStatusCounter::MemUsed.raw(), 99);
        assert_eq!(LimitKind::WorkerThreads.raw(), 11);
        assert_eq!(TextEncoding::Utf16Be.raw(), 3);
        assert_eq!(ColumnType::from_raw(ffi::SQLITE_BLOB), ColumnType::Blob);
        assert_eq!(ThreadingMode::from_raw(2), ThreadingMode::MultiThread);
    }
}
