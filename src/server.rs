use crate::config::HMAX;
use crate::error::Error;
use crate::iter::ServerEntries;
use crate::stats::{ShardOps, ShardStats};
use crate::table::{HashTable, StringKeys};
use std::num::NonZeroUsize;

const DEFAULT_BUCKETS: NonZeroUsize = match NonZeroUsize::new(HMAX) {
    Some(buckets) => buckets,
    None => NonZeroUsize::MIN,
};

/// A single virtual server: one string-keyed shard backed by a [`HashTable`].
pub struct Server {
    memory: HashTable<StringKeys>,
    stats: ShardStats,
}

impl Server {
    /// Create an empty server with the default bucket count.
    pub fn new() -> Self {
        Self {
            memory: HashTable::with_bucket_count(DEFAULT_BUCKETS, StringKeys),
            stats: ShardStats::new(),
        }
    }

    /// Create an empty server whose table has `buckets` buckets.
    pub fn with_buckets(buckets: usize) -> Result<Self, Error> {
        Ok(Self {
            memory: HashTable::new(buckets, StringKeys)?,
            stats: ShardStats::new(),
        })
    }

    /// Store a copy of `value` under a copy of `key`, replacing any previous value.
    pub fn store(&mut self, key: &str, value: &str) {
        self.memory.put(key.as_bytes(), value.as_bytes());
        self.stats.record_write();
    }

    /// Get the value stored under `key`.
    pub fn retrieve(&self, key: &str) -> Option<&str> {
        let value = self
            .memory
            .get(key.as_bytes())
            .and_then(|bytes| std::str::from_utf8(bytes).ok());
        if value.is_some() {
            self.stats.record_read();
        }
        value
    }

    /// Remove the entry for `key`. Returns whether one existed.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.memory.remove(key.as_bytes());
        if removed {
            self.stats.record_remove();
        }
        removed
    }

    /// Check whether an entry for `key` exists, without counting a read.
    pub fn contains_key(&self, key: &str) -> bool {
        self.memory.has_key(key.as_bytes())
    }

    /// Get the number of entries on this server.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Check if this server holds no entries.
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Number of buckets in this server's table.
    pub fn bucket_count(&self) -> usize {
        self.memory.bucket_count()
    }

    /// Iterate over every `(key, value)` pair on this server.
    pub fn iter(&self) -> ServerEntries<'_> {
        ServerEntries::new(self.memory.iter())
    }

    /// Get a snapshot of operation counters for this server.
    pub fn ops(&self) -> ShardOps {
        self.stats.snapshot()
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("entries", &self.memory.len())
            .field("buckets", &self.bucket_count())
            .finish()
    }
}
