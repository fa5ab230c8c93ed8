//! Statistics and diagnostics types.

use crate::config::ServerId;
#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-server operation statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardOps {
    /// Number of successful retrievals on this server.
    pub reads: u64,
    /// Number of stores on this server, migrations included.
    pub writes: u64,
    /// Number of removals on this server.
    pub removes: u64,
}

/// Operation counters for a single server.
#[cfg(feature = "metrics")]
pub(crate) struct ShardStats {
    reads: AtomicU64,
    writes: AtomicU64,
    removes: AtomicU64,
}

#[cfg(feature = "metrics")]
impl ShardStats {
    pub fn new() -> Self {
        Self {
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            removes: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ShardOps {
        ShardOps {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
        }
    }
}

/// Zero-sized placeholder when metrics are disabled.
#[cfg(not(feature = "metrics"))]
pub(crate) struct ShardStats;

#[cfg(not(feature = "metrics"))]
impl ShardStats {
    pub fn new() -> Self {
        ShardStats
    }

    #[inline]
    pub fn record_read(&self) {}

    #[inline]
    pub fn record_write(&self) {}

    #[inline]
    pub fn record_remove(&self) {}

    pub fn snapshot(&self) -> ShardOps {
        ShardOps::default()
    }
}

impl Default for ShardStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate statistics for a LoadBalancer instance.
#[derive(Debug, Clone)]
pub struct Stats {
    /// Number of active servers.
    pub servers: usize,
    /// Number of points on the ring (`replicas * servers`).
    pub ring_points: usize,
    /// Reserved ring capacity, grown by doubling.
    pub ring_capacity: usize,
    /// Total entries across all servers, stale rebalancing copies included.
    pub size: usize,
    /// Entries held by each server, ordered by server id.
    pub shard_sizes: Vec<(ServerId, usize)>,
    /// Operation counts for each server, in the same order as `shard_sizes`.
    pub operations: Vec<ShardOps>,
}

/// Per-server diagnostics snapshot.
#[derive(Debug, Clone)]
pub struct ServerDiagnostics {
    /// Server id.
    pub server_id: ServerId,
    /// Number of entries held by this server.
    pub entries: usize,
    /// Fraction of the 32-bit hash space routed to this server.
    pub keyspace_share: f64,
    /// Read operations (0 when metrics disabled).
    pub reads: u64,
    /// Write operations (0 when metrics disabled).
    pub writes: u64,
    /// Remove operations (0 when metrics disabled).
    pub removes: u64,
}

/// Structured snapshot for load introspection.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    /// Total number of entries across all servers.
    pub total_entries: usize,
    /// Per-server diagnostics, ordered by server id.
    pub servers: Vec<ServerDiagnostics>,
    /// Total read + write + remove operations (0 when metrics disabled).
    pub total_operations: u64,
    /// Average load (entries) per server.
    pub avg_load_per_server: f64,
    /// Max load / avg load ratio. User interprets (e.g. threshold 2.0 for imbalance).
    pub max_load_ratio: f64,
}
