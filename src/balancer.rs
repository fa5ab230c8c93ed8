use crate::config::{Config, ServerId};
use crate::error::Error;
use crate::hash::{key_hash, server_hash};
use crate::ring::HashRing;
use crate::server::Server;
use crate::stats::{Diagnostics, ServerDiagnostics, ShardOps, Stats};
use hashbrown::HashMap;
use tracing::{debug, info, warn};

/// Size of the 32-bit hash circle.
const HASH_SPACE: f64 = 4_294_967_296.0;

/// Routes string keys to virtual servers with consistent hashing.
///
/// Every server owns `replicas` points on a [`HashRing`]. A key belongs to
/// the first point at or clockwise after the key's hash. Adding a server
/// copies its neighbours' shards into it; removing one re-stores the
/// entries it owns through the shrunken ring.
///
/// # Example
///
/// ```rust
/// use shardring::LoadBalancer;
///
/// let mut lb = LoadBalancer::new();
/// lb.add_server(0).unwrap();
///
/// assert_eq!(lb.store("a", "1"), Some(0));
/// assert_eq!(lb.retrieve("a"), (Some("1"), Some(0)));
/// ```
pub struct LoadBalancer {
    config: Config,
    servers: HashMap<ServerId, Server>,
    ring: HashRing,
}

impl LoadBalancer {
    /// Create an empty load balancer with defaults (100000 servers, 3 replicas, 100 buckets).
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty load balancer with a custom config.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            servers: HashMap::new(),
            ring: HashRing::new(config.replicas, config.max_servers),
        }
    }

    /// The configuration this load balancer was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    fn normalize(&self, server_id: ServerId) -> ServerId {
        server_id % self.config.max_servers
    }

    /// Figure out which server owns this key. `None` while no server exists.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shardring::LoadBalancer;
    ///
    /// let mut lb = LoadBalancer::new();
    /// assert_eq!(lb.route("key"), None);
    ///
    /// lb.add_server(3).unwrap();
    /// assert_eq!(lb.route("key"), Some(3));
    /// ```
    #[inline]
    pub fn route(&self, key: &str) -> Option<ServerId> {
        self.ring.route(key_hash(key))
    }

    /// Store a key-value pair on the owning server. Returns that server's id,
    /// or `None` (storing nothing) while no server exists.
    pub fn store(&mut self, key: &str, value: &str) -> Option<ServerId> {
        let server_id = self.route(key)?;
        self.servers.get_mut(&server_id)?.store(key, value);
        Some(server_id)
    }

    /// Get the value stored under `key` together with the id of the server
    /// that was asked. Both are `None` while no server exists.
    pub fn retrieve(&self, key: &str) -> (Option<&str>, Option<ServerId>) {
        let Some(server_id) = self.route(key) else {
            return (None, None);
        };
        let value = self
            .servers
            .get(&server_id)
            .and_then(|server| server.retrieve(key));
        (value, Some(server_id))
    }

    /// Add a server and place its replicas on the ring.
    ///
    /// Replicas are inserted one at a time. After each insertion the whole
    /// shard of the new point's clockwise neighbour is copied into the new
    /// server; the neighbour keeps its copies, which stay unreachable.
    /// Copies never replace an entry the new server already routes to
    /// itself through an earlier replica.
    pub fn add_server(&mut self, server_id: ServerId) -> Result<(), Error> {
        let server_id = self.normalize(server_id);
        if self.servers.contains_key(&server_id) {
            warn!(server_id, "add rejected: server already exists");
            return Err(Error::ServerAlreadyExists(server_id));
        }

        let replicas = self.config.replicas;
        self.ring.reserve(replicas as usize);
        self.servers.insert(
            server_id,
            Server::with_buckets(self.config.buckets_per_server)?,
        );

        for label in HashRing::labels(server_id, replicas, self.config.max_servers) {
            let index = self.ring.insert(label);
            debug!(server_id, label, index, "replica placed");
            self.rebalance(index, server_id);
        }

        info!(
            server_id,
            ring_points = self.ring.len(),
            servers = self.servers.len(),
            "server added"
        );
        Ok(())
    }

    /// Copy the clockwise neighbour's shard into the server that just gained
    /// the point at `index`.
    ///
    /// Keys that now route to `index` take the neighbour's value, since the
    /// neighbour owned them until now. Every other key is copied only if the
    /// new server does not hold it yet.
    fn rebalance(&mut self, index: usize, server_id: ServerId) {
        let Some(neighbor_label) = self.ring.successor(index) else {
            return;
        };
        let neighbor_id = self.ring.owner(neighbor_label);
        if neighbor_id == server_id {
            return;
        }

        let ring = &self.ring;
        let Some([target, neighbor]) = self.servers.get_many_mut([&server_id, &neighbor_id]) else {
            return;
        };
        let mut claimed = 0usize;
        for (key, value) in neighbor.iter() {
            if ring.locate(key_hash(key)) == Some(index) {
                target.store(key, value);
                claimed += 1;
            } else if !target.contains_key(key) {
                target.store(key, value);
            }
        }
        debug!(
            server_id,
            neighbor_id,
            copied = neighbor.len(),
            claimed,
            "rebalanced from neighbour"
        );
    }

    /// Remove a server and its replicas, re-storing the entries it owns on
    /// the servers that own them next.
    ///
    /// Stale copies the server picked up while joining are discarded, so
    /// they never replace newer values elsewhere. Entries of the last
    /// remaining server have nowhere to go and are dropped with it.
    pub fn remove_server(&mut self, server_id: ServerId) -> Result<(), Error> {
        let server_id = self.normalize(server_id);
        let Some(server) = self.servers.remove(&server_id) else {
            warn!(server_id, "remove rejected: server not found");
            return Err(Error::ServerNotFound(server_id));
        };

        // Routed here while the ring still holds this server's points.
        let owned: Vec<(&str, &str)> = server
            .iter()
            .filter(|(key, _)| self.route(key) == Some(server_id))
            .collect();

        for label in HashRing::labels(server_id, self.config.replicas, self.config.max_servers) {
            let removed = self.ring.remove(server_hash(label));
            debug!(server_id, label, ?removed, "replica removed");
        }

        if self.ring.is_empty() {
            if !server.is_empty() {
                warn!(
                    server_id,
                    dropped = server.len(),
                    "last server removed, entries dropped"
                );
            }
        } else {
            for &(key, value) in &owned {
                self.store(key, value);
            }
            debug!(
                server_id,
                migrated = owned.len(),
                discarded = server.len() - owned.len(),
                "entries re-homed"
            );
        }

        info!(
            server_id,
            ring_points = self.ring.len(),
            servers = self.servers.len(),
            "server removed"
        );
        Ok(())
    }

    /// Check whether a server with this id is active.
    pub fn contains_server(&self, server_id: ServerId) -> bool {
        self.servers.contains_key(&self.normalize(server_id))
    }

    /// Get an active server by id.
    pub fn server(&self, server_id: ServerId) -> Option<&Server> {
        self.servers.get(&self.normalize(server_id))
    }

    /// Ids of all active servers, ascending.
    pub fn server_ids(&self) -> Vec<ServerId> {
        let mut ids: Vec<ServerId> = self.servers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of active servers.
    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    /// The ring of replica points.
    pub fn ring(&self) -> &HashRing {
        &self.ring
    }

    /// Replica labels in ring order.
    pub fn ring_points(&self) -> &[u32] {
        self.ring.points()
    }

    /// Get statistics about the servers and the ring.
    ///
    /// Shard sizes count every stored entry, including the unreachable
    /// copies left behind on neighbours when servers join.
    pub fn stats(&self) -> Stats {
        let ids = self.server_ids();
        let shard_sizes: Vec<(ServerId, usize)> = ids
            .iter()
            .filter_map(|id| self.servers.get(id).map(|s| (*id, s.len())))
            .collect();
        let operations: Vec<ShardOps> = ids
            .iter()
            .filter_map(|id| self.servers.get(id).map(Server::ops))
            .collect();
        let size: usize = shard_sizes.iter().map(|(_, len)| len).sum();

        Stats {
            servers: self.servers.len(),
            ring_points: self.ring.len(),
            ring_capacity: self.ring.capacity(),
            size,
            shard_sizes,
            operations,
        }
    }

    /// Fraction of the hash circle routed to each server.
    fn keyspace_shares(&self) -> HashMap<ServerId, f64> {
        let mut shares = HashMap::new();
        let points = self.ring.points();
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return shares;
        };

        // Point 0 also takes every hash past the last point.
        let wrap = f64::from(server_hash(first)) + HASH_SPACE - f64::from(server_hash(last));
        *shares.entry(self.ring.owner(first)).or_insert(0.0) += wrap;
        for pair in points.windows(2) {
            let arc = f64::from(server_hash(pair[1]) - server_hash(pair[0]));
            *shares.entry(self.ring.owner(pair[1])).or_insert(0.0) += arc;
        }

        for share in shares.values_mut() {
            *share /= HASH_SPACE;
        }
        shares
    }

    /// Get a structured diagnostics snapshot for load introspection.
    pub fn diagnostics(&self) -> Diagnostics {
        let shares = self.keyspace_shares();
        let servers: Vec<ServerDiagnostics> = self
            .server_ids()
            .into_iter()
            .filter_map(|server_id| {
                let server = self.servers.get(&server_id)?;
                let ops = server.ops();
                Some(ServerDiagnostics {
                    server_id,
                    entries: server.len(),
                    keyspace_share: shares.get(&server_id).copied().unwrap_or(0.0),
                    reads: ops.reads,
                    writes: ops.writes,
                    removes: ops.removes,
                })
            })
            .collect();

        let total_entries: usize = servers.iter().map(|s| s.entries).sum();
        let total_operations: u64 = servers
            .iter()
            .map(|s| s.reads + s.writes + s.removes)
            .sum();
        let avg_load_per_server = if servers.is_empty() {
            0.0
        } else {
            total_entries as f64 / servers.len() as f64
        };
        let max_load = servers.iter().map(|s| s.entries).max().unwrap_or(0);
        let max_load_ratio = if avg_load_per_server > 0.0 {
            max_load as f64 / avg_load_per_server
        } else {
            0.0
        };

        Diagnostics {
            total_entries,
            servers,
            total_operations,
            avg_load_per_server,
            max_load_ratio,
        }
    }
}

impl Default for LoadBalancer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoadBalancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadBalancer")
            .field("config", &self.config)
            .field("servers", &self.server_ids())
            .field("ring_points", &self.ring.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("user:{}:session:{}", i * 7919, i)).collect()
    }

    #[test]
    fn test_single_server_round_trip() {
        let mut lb = LoadBalancer::new();
        lb.add_server(0).unwrap();

        assert_eq!(lb.store("a", "1"), Some(0));
        assert_eq!(lb.retrieve("a"), (Some("1"), Some(0)));
        assert_eq!(lb.retrieve("missing"), (None, Some(0)));
    }

    #[test]
    fn test_empty_balancer() {
        let mut lb = LoadBalancer::new();
        assert_eq!(lb.route("a"), None);
        assert_eq!(lb.store("a", "1"), None);
        assert_eq!(lb.retrieve("a"), (None, None));
        assert_eq!(lb.stats().size, 0);
    }

    #[test]
    fn test_overwrite() {
        let mut lb = LoadBalancer::new();
        lb.add_server(0).unwrap();
        lb.add_server(1).unwrap();

        let first = lb.store("k", "v1");
        let second = lb.store("k", "v2");
        assert_eq!(first, second);
        assert_eq!(lb.retrieve("k").0, Some("v2"));
    }

    #[test]
    fn test_known_placement() {
        let mut lb = LoadBalancer::new();
        lb.add_server(0).unwrap();
        lb.add_server(1).unwrap();

        assert_eq!(lb.ring_points(), &[0, 200_000, 100_000, 200_001, 1, 100_001]);
        assert_eq!(lb.route("a"), Some(0));
        assert_eq!(lb.route("hello world"), Some(1));
        assert_eq!(lb.route("longer_key_0"), Some(0));
    }

    #[test]
    fn test_duplicate_and_missing_servers() {
        let mut lb = LoadBalancer::new();
        lb.add_server(4).unwrap();
        assert_eq!(lb.add_server(4), Err(Error::ServerAlreadyExists(4)));
        // Aliases modulo max_servers.
        assert_eq!(lb.add_server(100_004), Err(Error::ServerAlreadyExists(4)));
        assert_eq!(lb.ring().len(), 3);

        assert_eq!(lb.remove_server(5), Err(Error::ServerNotFound(5)));
        assert_eq!(lb.ring().len(), 3);
    }

    #[test]
    fn test_add_server_keeps_data_reachable() {
        let mut lb = LoadBalancer::new();
        lb.add_server(0).unwrap();
        let keys = keys(200);
        for key in &keys {
            lb.store(key, key);
        }

        for id in 1..6 {
            lb.add_server(id).unwrap();
            for key in &keys {
                assert_eq!(lb.retrieve(key).0, Some(key.as_str()));
            }
        }
        assert!(lb.ring().is_sorted());
        assert_eq!(lb.ring().len(), 18);
    }

    #[test]
    fn test_add_server_leaves_stale_copies() {
        let mut lb = LoadBalancer::new();
        lb.add_server(0).unwrap();
        for key in keys(50) {
            lb.store(&key, "v");
        }
        lb.add_server(1).unwrap();

        // Server 0 keeps all 50 entries and server 1 got full copies.
        assert_eq!(lb.server(0).unwrap().len(), 50);
        assert_eq!(lb.server(1).unwrap().len(), 50);
        assert_eq!(lb.stats().size, 100);
    }

    #[test]
    fn test_remove_server_rehomes_entries() {
        let mut lb = LoadBalancer::new();
        for id in 0..4 {
            lb.add_server(id).unwrap();
        }
        let keys = keys(300);
        for key in &keys {
            lb.store(key, &key.to_uppercase());
        }

        lb.remove_server(2).unwrap();
        assert!(!lb.contains_server(2));
        assert_eq!(lb.ring().len(), 9);
        assert!(lb.ring().is_sorted());
        for key in &keys {
            let (value, server_id) = lb.retrieve(key);
            assert_eq!(value, Some(key.to_uppercase().as_str()));
            assert_ne!(server_id, Some(2));
        }
    }

    #[test]
    fn test_remove_server_keeps_overwritten_values() {
        let mut lb = LoadBalancer::new();
        lb.add_server(0).unwrap();
        let keys = keys(200);
        for key in &keys {
            lb.store(key, "old");
        }
        lb.add_server(1).unwrap();
        for key in &keys {
            lb.store(key, "new");
        }

        lb.remove_server(1).unwrap();
        for key in &keys {
            assert_eq!(lb.retrieve(key), (Some("new"), Some(0)));
        }
    }

    #[test]
    fn test_add_server_claims_latest_values() {
        let mut lb = LoadBalancer::new();
        for id in 0..3 {
            lb.add_server(id).unwrap();
        }
        let keys = keys(300);
        for key in &keys {
            lb.store(key, "v1");
        }
        lb.add_server(7).unwrap();
        for key in &keys {
            lb.store(key, "v2");
        }

        // Joins copy stale entries around; none of them may win a lookup.
        lb.add_server(11).unwrap();
        lb.remove_server(7).unwrap();
        lb.add_server(7).unwrap();
        for key in &keys {
            assert_eq!(lb.retrieve(key).0, Some("v2"));
        }
    }

    #[test]
    fn test_remove_missing_server_leaves_topology() {
        let mut lb = LoadBalancer::new();
        lb.add_server(1).unwrap();
        lb.add_server(2).unwrap();
        lb.store("a", "1");
        let points = lb.ring_points().to_vec();

        assert_eq!(lb.remove_server(3), Err(Error::ServerNotFound(3)));
        assert_eq!(lb.ring_points(), points.as_slice());
        assert_eq!(lb.server_ids(), vec![1, 2]);
        assert_eq!(lb.retrieve("a").0, Some("1"));
    }

    #[test]
    fn test_remove_last_server() {
        let mut lb = LoadBalancer::new();
        lb.add_server(9).unwrap();
        lb.store("a", "1");
        lb.remove_server(9).unwrap();

        assert_eq!(lb.server_count(), 0);
        assert!(lb.ring().is_empty());
        assert_eq!(lb.retrieve("a"), (None, None));

        // The ring is reusable afterwards.
        lb.add_server(9).unwrap();
        assert_eq!(lb.retrieve("a"), (None, Some(9)));
    }

    #[test]
    fn test_stats_and_diagnostics() {
        let mut lb = LoadBalancer::new();
        lb.add_server(0).unwrap();
        lb.add_server(1).unwrap();
        lb.add_server(2).unwrap();

        let stats = lb.stats();
        assert_eq!(stats.servers, 3);
        assert_eq!(stats.ring_points, 9);
        assert_eq!(stats.ring_capacity, 12);
        assert_eq!(stats.shard_sizes.len(), 3);
        assert_eq!(stats.operations.len(), 3);

        let diagnostics = lb.diagnostics();
        let total_share: f64 = diagnostics.servers.iter().map(|s| s.keyspace_share).sum();
        assert!((total_share - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_server_owns_whole_circle() {
        let mut lb = LoadBalancer::new();
        lb.add_server(5).unwrap();
        let diagnostics = lb.diagnostics();
        assert_eq!(diagnostics.servers.len(), 1);
        assert!((diagnostics.servers[0].keyspace_share - 1.0).abs() < 1e-9);
    }
}
