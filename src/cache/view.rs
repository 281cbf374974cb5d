//! Byte View Module
//!
//! Immutable view over a cached value.

use std::fmt;

use bytes::Bytes;

use crate::cache::SizedValue;

// == Byte View ==
/// An immutable, cheaply clonable view of cached bytes.
///
/// Accessors hand out copies, so callers can never mutate what the cache holds.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ByteView {
    b: Bytes,
}

impl ByteView {
    /// Copies `data` into a new view.
    pub fn copy_from(data: &[u8]) -> Self {
        Self {
            b: Bytes::copy_from_slice(data),
        }
    }

    /// Returns the view's length.
    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Returns a copy of the data as a byte vector.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.b.to_vec()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        Self { b: Bytes::from(data) }
    }
}

impl SizedValue for ByteView {
    fn size(&self) -> usize {
        self.len()
    }
}

/// Lossy text rendering for diagnostics; values are not required to be UTF-8.
impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.b))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView").field("len", &self.b.len()).finish()
    }
}
