//! # ShardRing
//!
//! An in-process sharded key-value store routed by consistent hashing.
//!
//! A [`LoadBalancer`] places every virtual server on a hash ring several
//! times (its replicas) and sends each key to the first replica at or after
//! the key's hash, wrapping around past the last one. Each server keeps its
//! shard in a chained [`HashTable`] that owns copies of every key and value.
//!
//! ## Features
//!
//! - **Consistent Hashing**: Adding or removing a server only moves the keys
//!   next to its replicas
//! - **Deterministic**: Same key and topology always route to the same server
//! - **Owned Storage**: Stored keys and values are independent of caller buffers
//! - **Pluggable Tables**: Hash, compare and teardown via [`KeyStrategy`]
//! - **Statistics**: Per-server sizes, keyspace shares and operation tracking
//!
//! ## Example
//!
//! ```rust
//! use shardring::LoadBalancer;
//!
//! let mut lb = LoadBalancer::new();
//! lb.add_server(0)?;
//! lb.add_server(1)?;
//!
//! // Store returns the server that took the pair
//! let server_id = lb.store("key1", "value1");
//!
//! // Retrieve reports the server it asked
//! let (value, asked) = lb.retrieve("key1");
//! assert_eq!(value, Some("value1"));
//! assert_eq!(asked, server_id);
//!
//! // Entries survive topology changes
//! lb.remove_server(0)?;
//! assert_eq!(lb.retrieve("key1").0, Some("value1"));
//! # Ok::<(), shardring::Error>(())
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use shardring::LoadBalancerBuilder;
//!
//! let lb = LoadBalancerBuilder::new()
//!     .max_servers(1000)?
//!     .replicas(8)?
//!     .buckets_per_server(64)?
//!     .build();
//! assert_eq!(lb.config().replica_count(), 8);
//! # Ok::<(), shardring::Error>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

/// Load balancer: routing and topology changes.
pub mod balancer;
/// Configuration and builder types.
pub mod config;
/// Error types.
pub mod error;
/// Hash function implementations.
pub mod hash;
/// Iterator implementations.
pub mod iter;
/// Singly-linked list backing every hash table bucket.
pub mod list;
/// Consistent-hashing ring.
pub mod ring;
/// Single-shard server storage.
pub mod server;
/// Statistics and metrics collection.
pub mod stats;
/// Lock-guarded shared load balancer.
pub mod sync;
/// Generic chained hash table.
pub mod table;

// Re-export main types
pub use balancer::LoadBalancer;
pub use config::{Config, LoadBalancerBuilder, ServerId, HMAX, MAX_SERVERS, REPLICAS};
pub use error::Error;
pub use list::LinkedList;
pub use ring::HashRing;
pub use server::Server;
pub use stats::{Diagnostics, ServerDiagnostics, ShardOps, Stats};
pub use sync::SharedLoadBalancer;
pub use table::{HashTable, IntKeys, KeyStrategy, Record, StringKeys};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut lb = LoadBalancer::new();
        lb.add_server(0).unwrap();

        // Store
        assert_eq!(lb.store("a", "1"), Some(0));

        // Retrieve
        assert_eq!(lb.retrieve("a"), (Some("1"), Some(0)));
        assert_eq!(lb.retrieve("nonexistent"), (None, Some(0)));

        // Overwrite
        lb.store("a", "2");
        assert_eq!(lb.retrieve("a").0, Some("2"));
    }

    #[test]
    fn test_remove_server() {
        let mut lb = LoadBalancer::new();
        lb.add_server(0).unwrap();
        lb.add_server(1).unwrap();
        lb.store("hello world", "v");
        assert_eq!(lb.route("hello world"), Some(1));

        lb.remove_server(1).unwrap();
        assert_eq!(lb.retrieve("hello world"), (Some("v"), Some(0)));
    }

    #[test]
    fn test_stats() {
        let mut lb = LoadBalancer::new();
        lb.add_server(0).unwrap();
        lb.store("key1", "value1");
        lb.store("key2", "value2");

        let stats = lb.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.servers, 1);
    }

    #[test]
    fn test_builder() {
        let mut lb = LoadBalancerBuilder::new()
            .max_servers(16)
            .unwrap()
            .replicas(4)
            .unwrap()
            .build();

        lb.add_server(20).unwrap();
        assert!(lb.contains_server(4));
        assert_eq!(lb.ring_points().len(), 4);
    }
}
