//! Connection configuration.
//!
//! [`OpenOptions`] is a plain, deserializable description of how to open a
//! connection. It is translated into [`OpenFlags`] plus a VFS name for
//! `sqlite3_open_v2`, and an optional busy timeout applied right after the
//! open succeeds.

use serde::Deserialize;

use super::types::OpenFlags;

/// Per-connection mutex mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutexMode {
    /// Whatever the engine was configured with.
    #[default]
    Default,
    /// `SQLITE_OPEN_NOMUTEX`.
    NoMutex,
    /// `SQLITE_OPEN_FULLMUTEX`.
    FullMutex,
}

/// Options for [`Connection::open_with`](crate::Connection::open_with).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenOptions {
    /// Open read-only; `create` is ignored when set.
    pub read_only: bool,
    /// Create the file when it does not exist.
    pub create: bool,
    /// Interpret the path as a `file:` URI.
    pub uri: bool,
    /// Per-connection mutex mode.
    pub mutex: MutexMode,
    /// Name of the VFS to use; `None` selects the default VFS.
    pub vfs: Option<String>,
    /// Busy timeout in milliseconds; `None` leaves the engine default.
    pub busy_timeout_ms: Option<u32>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            create: true,
            uri: false,
            mutex: MutexMode::Default,
            vfs: None,
            busy_timeout_ms: None,
        }
    }
}

impl OpenOptions {
    /// Native open flags described by these options.
    #[must_use]
    pub fn flags(&self) -> OpenFlags {
        let mut flags = if self.read_only {
            OpenFlags::READONLY
        } else if self.create {
            OpenFlags::READWRITE | OpenFlags::CREATE
        } else {
            OpenFlags::READWRITE
        };
        if self.uri {
            flags |= OpenFlags::URI;
        }
        match self.mutex {
            MutexMode::Default => {}
            MutexMode::NoMutex => flags |= OpenFlags::NOMUTEX,
            MutexMode::FullMutex => flags |= OpenFlags::FULLMUTEX,
        }
        flags
    }
}
