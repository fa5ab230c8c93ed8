use crate::balancer::LoadBalancer;
use crate::error::Error;

/// Identifier of a virtual server. Always reduced modulo the configured
/// maximum server count before use.
pub type ServerId = u32;

/// Default upper bound on distinct server identities.
pub const MAX_SERVERS: u32 = 100_000;

/// Default number of ring points owned by each server.
pub const REPLICAS: u32 = 3;

/// Default bucket count of each server's hash table.
pub const HMAX: usize = 100;

/// Configuration for a LoadBalancer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub(crate) max_servers: u32,
    pub(crate) replicas: u32,
    pub(crate) buckets_per_server: usize,
}

impl Config {
    /// Create a new config with defaults (100000 servers, 3 replicas, 100 buckets).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of distinct server identities. Must be greater than 0.
    pub fn max_servers(mut self, count: u32) -> Result<Self, Error> {
        if count == 0 {
            return Err(Error::InvalidMaxServers);
        }
        if count.checked_mul(self.replicas).is_none() {
            return Err(Error::InvalidReplicas);
        }
        self.max_servers = count;
        Ok(self)
    }

    /// Set the number of ring points each server owns. Must be greater than 0.
    pub fn replicas(mut self, count: u32) -> Result<Self, Error> {
        if count == 0 || self.max_servers.checked_mul(count).is_none() {
            return Err(Error::InvalidReplicas);
        }
        self.replicas = count;
        Ok(self)
    }

    /// Set the bucket count of every server's hash table. Must be greater than 0.
    pub fn buckets_per_server(mut self, count: usize) -> Result<Self, Error> {
        if count == 0 {
            return Err(Error::InvalidBucketCount);
        }
        self.buckets_per_server = count;
        Ok(self)
    }

    /// Maximum number of distinct server identities.
    pub fn max_server_count(&self) -> u32 {
        self.max_servers
    }

    /// Ring points per server.
    pub fn replica_count(&self) -> u32 {
        self.replicas
    }

    /// Buckets in each server's hash table.
    pub fn bucket_count(&self) -> usize {
        self.buckets_per_server
    }

    /// Upper bound on ring points: `replicas * max_servers`.
    pub fn max_ring_points(&self) -> usize {
        self.replicas as usize * self.max_servers as usize
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_servers: MAX_SERVERS,
            replicas: REPLICAS,
            buckets_per_server: HMAX,
        }
    }
}

/// Builder for creating a LoadBalancer with custom configuration.
pub struct LoadBalancerBuilder {
    config: Config,
}

impl LoadBalancerBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the maximum number of distinct server identities.
    pub fn max_servers(mut self, count: u32) -> Result<Self, Error> {
        self.config = self.config.max_servers(count)?;
        Ok(self)
    }

    /// Set the number of ring points each server owns.
    pub fn replicas(mut self, count: u32) -> Result<Self, Error> {
        self.config = self.config.replicas(count)?;
        Ok(self)
    }

    /// Set the bucket count of every server's hash table.
    pub fn buckets_per_server(mut self, count: usize) -> Result<Self, Error> {
        self.config = self.config.buckets_per_server(count)?;
        Ok(self)
    }

    /// Build a LoadBalancer with the configured settings.
    pub fn build(self) -> LoadBalancer {
        LoadBalancer::with_config(self.config)
    }
}

impl Default for LoadBalancerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
