//! Column values read through the `sqlite3_value` interface.

use std::marker::PhantomData;
use std::os::raw::c_void;
use std::ptr::NonNull;

use super::ffi;
use super::types::ColumnType;

/// A borrowed, unprotected column value.
///
/// Obtained from [`Statement::column_value`](crate::Statement::column_value)
/// and valid until the statement is stepped, reset or finalized. It can be
/// bound into another statement with
/// [`Statement::bind_value`](crate::Statement::bind_value).
#[derive(Clone, Copy)]
pub struct ValueRef<'stmt> {
    raw: NonNull<c_void>,
    _stmt: PhantomData<&'stmt ()>,
}

impl ValueRef<'_> {
    /// # Safety
    ///
    /// A non-null `raw` must stay valid for the chosen lifetime.
    pub(crate) unsafe fn from_raw(raw: *mut ffi::sqlite3_value) -> Option<Self> {
        NonNull::new(raw).map(|raw| Self {
            raw,
            _stmt: PhantomData,
        })
    }

    pub(crate) const fn as_ptr(&self) -> *mut ffi::sqlite3_value {
        self.raw.as_ptr()
    }

    /// Storage class of the value.
    #[must_use]
    pub fn value_type(&self) -> ColumnType {
        // SAFETY: the value is alive for `'stmt`.
        ColumnType::from_raw(unsafe { ffi::sqlite3_value_type(self.as_ptr()) })
    }

    /// The value as a 64-bit integer.
    #[must_use]
    pub fn int64(&self) -> i64 {
        // SAFETY: the value is alive for `'stmt`.
        unsafe { ffi::sqlite3_value_int64(self.as_ptr()) }
    }

    /// The value as a 64-bit float.
    #[must_use]
    pub fn double(&self) -> f64 {
        // SAFETY: the value is alive for `'stmt`.
        unsafe { ffi::sqlite3_value_double(self.as_ptr()) }
    }

    /// The value as UTF-8 text; empty for NULL.
    #[must_use]
    pub fn text(&self) -> String {
        // SAFETY: the text pointer is read before its length and copied
        // immediately.
        unsafe {
            let data = ffi::sqlite3_value_text(self.as_ptr());
            let len = ffi::sqlite3_value_bytes(self.as_ptr());
            if data.is_null() || len <= 0 {
                return String::new();
            }
            let bytes = std::slice::from_raw_parts(data.cast::<u8>(), len as usize);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }

    /// The value as a blob; empty for NULL.
    #[must_use]
    pub fn blob(&self) -> Vec<u8> {
        // SAFETY: as in `text`.
        unsafe {
            let data = ffi::sqlite3_value_blob(self.as_ptr());
            let len = ffi::sqlite3_value_bytes(self.as_ptr());
            if data.is_null() || len <= 0 {
                return Vec::new();
            }
            std::slice::from_raw_parts(data.cast::<u8>(), len as usize).to_vec()
        }
    }
}

impl std::fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ValueRef").field(&Value::from(*self)).finish()
    }
}

/// An owned copy of a column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Binary blob.
    Blob(Vec<u8>),
    /// SQL NULL.
    Null,
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value.value_type() {
            ColumnType::Integer => Self::Integer(value.int64()),
            ColumnType::Float => Self::Real(value.double()),
            ColumnType::Text => Self::Text(value.text()),
            ColumnType::Blob => Self::Blob(value.blob()),
            ColumnType::Null => Self::Null,
        }
    }
}
