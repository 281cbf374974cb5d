//! Consistent Hash Ring
//!
//! Maps keys to members using virtual replicas placed on a 32-bit ring.

use std::collections::HashMap;

// == Hash Function ==
/// Hash used to place members and keys on the ring.
///
/// Changing it remaps every key, so it is fixed per ring at construction.
pub type HashFn = fn(&[u8]) -> u32;

/// CRC-32 (IEEE) checksum, the default ring hash.
pub fn crc32_ieee(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

// == Hash Ring ==
/// Consistent-hash ring with `replicas` virtual nodes per member.
#[derive(Debug, Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted virtual node hashes
    keys: Vec<u32>,
    /// Virtual node hash to member name
    members: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring hashed with CRC-32.
    pub fn new(replicas: usize) -> Self {
        Self::with_hasher(replicas, crc32_ieee)
    }

    /// Creates an empty ring with a custom hash function.
    pub fn with_hasher(replicas: usize, hash: HashFn) -> Self {
        Self {
            hash,
            replicas,
            keys: Vec::new(),
            members: HashMap::new(),
        }
    }

    // == Add ==
    /// Places `replicas` virtual nodes for each member, named `"{i}{member}"`.
    ///
    /// The ring is re-sorted once after the whole batch.
    pub fn add<I, S>(&mut self, members: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for member in members {
            let member = member.as_ref();
            for i in 0..self.replicas {
                let hash = (self.hash)(format!("{}{}", i, member).as_bytes());
                self.keys.push(hash);
                self.members.insert(hash, member.to_string());
            }
        }
        self.keys.sort_unstable();
    }

    // == Get ==
    /// Returns the member owning `key`: the first virtual node clockwise
    /// from the key's hash, wrapping past the top of the ring.
    ///
    /// Returns None if the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&h| h < hash) % self.keys.len();

        self.members.get(&self.keys[idx]).map(String::as_str)
    }

    /// Returns true if no member has been added.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }
}
