//! Chained hash table over owned byte records.
//!
//! Keys and values are copied into the table on insert, so callers can reuse
//! or drop their buffers right after a [`HashTable::put`]. Hashing, key
//! comparison, and record teardown are supplied by a [`KeyStrategy`].

use crate::error::Error;
use crate::hash::{int_hash, string_hash};
use crate::iter::Records;
use crate::list::LinkedList;
use std::cmp::Ordering;
use std::num::NonZeroUsize;

/// One stored entry: independent copies of a key and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    key: Box<[u8]>,
    value: Box<[u8]>,
}

impl Record {
    /// Copy `key` and `value` into a new record.
    pub fn new(key: &[u8], value: &[u8]) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Stored key bytes.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Stored value bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Take back ownership of the key and value buffers.
    pub fn into_parts(self) -> (Box<[u8]>, Box<[u8]>) {
        (self.key, self.value)
    }
}

/// Hashing, comparison and teardown of table keys.
///
/// Two keys are the same entry exactly when `compare` returns
/// [`Ordering::Equal`]; `hash` must agree with that.
pub trait KeyStrategy {
    /// Hash a key. The owning bucket is `hash(key) % bucket_count`.
    fn hash(&self, key: &[u8]) -> u32;

    /// Order two keys.
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;

    /// Release a record leaving the table. Defaults to dropping it.
    fn destroy(&self, record: Record) {
        drop(record);
    }
}

/// Keys holding a native-endian `u32`, hashed with the integer avalanche mix.
///
/// Keys shorter than four bytes are zero-extended; extra bytes are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntKeys;

impl IntKeys {
    /// Encode an integer as a key for this strategy.
    pub fn key(n: u32) -> [u8; 4] {
        n.to_ne_bytes()
    }

    fn decode(key: &[u8]) -> u32 {
        let mut bytes = [0u8; 4];
        let len = key.len().min(4);
        bytes[..len].copy_from_slice(&key[..len]);
        u32::from_ne_bytes(bytes)
    }
}

impl KeyStrategy for IntKeys {
    fn hash(&self, key: &[u8]) -> u32 {
        int_hash(Self::decode(key))
    }

    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        Self::decode(a).cmp(&Self::decode(b))
    }
}

/// String keys hashed with djb2 and ordered lexicographically by byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringKeys;

impl KeyStrategy for StringKeys {
    fn hash(&self, key: &[u8]) -> u32 {
        string_hash(key)
    }

    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

/// A fixed-size chained hash table. The bucket count never changes after
/// construction, so a key's bucket is stable for the table's lifetime.
pub struct HashTable<S: KeyStrategy> {
    buckets: Vec<LinkedList<Record>>,
    size: usize,
    strategy: S,
}

impl<S: KeyStrategy> HashTable<S> {
    /// Create a table with `hmax` empty buckets. `hmax` must be greater than 0.
    pub fn new(hmax: usize, strategy: S) -> Result<Self, Error> {
        let hmax = NonZeroUsize::new(hmax).ok_or(Error::InvalidBucketCount)?;
        Ok(Self::with_bucket_count(hmax, strategy))
    }

    /// Create a table with `hmax` empty buckets.
    pub fn with_bucket_count(hmax: NonZeroUsize, strategy: S) -> Self {
        let buckets = (0..hmax.get()).map(|_| LinkedList::new()).collect();
        Self {
            buckets,
            size: 0,
            strategy,
        }
    }

    #[inline]
    fn bucket_index(&self, key: &[u8]) -> usize {
        self.strategy.hash(key) as usize % self.buckets.len()
    }

    /// Check whether an entry for `key` exists.
    pub fn has_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.buckets[self.bucket_index(key)]
            .iter()
            .find(|record| self.strategy.compare(record.key(), key) == Ordering::Equal)
            .map(Record::value)
    }

    /// Store a copy of `value` under a copy of `key`.
    ///
    /// An existing entry keeps its key bytes and gets a fresh copy of the
    /// value. A new entry goes to the head of its bucket.
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        let index = self.bucket_index(key);
        let strategy = &self.strategy;
        let bucket = &mut self.buckets[index];

        // Keys are unique, but every match gets the new value.
        let mut updated = false;
        for record in bucket.iter_mut() {
            if strategy.compare(&record.key, key) == Ordering::Equal {
                record.value = value.into();
                updated = true;
            }
        }

        if !updated {
            bucket.add_at(0, Record::new(key, value));
            self.size += 1;
        }
    }

    /// Remove the entry for `key`, handing it to the strategy's `destroy`.
    /// Returns whether an entry was removed.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        let index = self.bucket_index(key);
        let position = self.buckets[index]
            .iter()
            .position(|record| self.strategy.compare(record.key(), key) == Ordering::Equal);

        match position.and_then(|pos| self.buckets[index].remove_at(pos)) {
            Some(record) => {
                self.strategy.destroy(record);
                self.size -= 1;
                true
            }
            None => false,
        }
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Iterate over every `(key, value)` pair, bucket by bucket.
    pub fn iter(&self) -> Records<'_> {
        Records::new(&self.buckets, self.size)
    }
}

impl<S: KeyStrategy> Drop for HashTable<S> {
    fn drop(&mut self) {
        for bucket in &mut self.buckets {
            while let Some(record) = bucket.remove_at(0) {
                self.strategy.destroy(record);
            }
        }
    }
}
