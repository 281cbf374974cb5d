//! Cache Entry Module
//!
//! Defines the key/value pair held by the LRU and the size capability
//! every stored value must provide.

// == Sized Value ==
/// A value that can report its size in bytes.
///
/// The size must stay stable while the value is stored; the cache never
/// re-measures an entry except when it is replaced.
pub trait SizedValue {
    /// Size of the value in bytes.
    fn size(&self) -> usize;
}

impl SizedValue for String {
    fn size(&self) -> usize {
        self.len()
    }
}

impl SizedValue for Vec<u8> {
    fn size(&self) -> usize {
        self.len()
    }
}

// == Cache Entry ==
/// A single cache entry, owned by the LRU's recency list.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The key the entry is indexed under
    pub key: String,
    /// The stored value
    pub value: V,
}

impl<V: SizedValue> CacheEntry<V> {
    // == Constructor ==
    pub fn new(key: String, value: V) -> Self {
        Self { key, value }
    }

    // == Footprint ==
    /// Bytes charged against the cache budget: key length plus value size.
    pub fn footprint(&self) -> u64 {
        (self.key.len() + self.value.size()) as u64
    }
}
