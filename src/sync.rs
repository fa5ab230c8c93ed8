use crate::balancer::LoadBalancer;
use crate::config::{Config, ServerId};
use crate::error::Error;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// A LoadBalancer shared between threads behind one exclusive lock.
///
/// Every call takes the lock for its whole duration, so operations never
/// interleave. Cloning is cheap and yields another handle to the same
/// balancer.
///
/// # Example
///
/// ```rust
/// use shardring::SharedLoadBalancer;
///
/// let lb = SharedLoadBalancer::new();
/// lb.add_server(0).unwrap();
///
/// let handle = lb.clone();
/// std::thread::spawn(move || handle.store("key", "value"))
///     .join()
///     .unwrap();
///
/// assert_eq!(lb.retrieve("key"), (Some("value".to_string()), Some(0)));
/// ```
#[derive(Clone)]
pub struct SharedLoadBalancer {
    inner: Arc<Mutex<LoadBalancer>>,
}

impl SharedLoadBalancer {
    /// Create an empty shared load balancer with defaults.
    pub fn new() -> Self {
        Self::from(LoadBalancer::new())
    }

    /// Create an empty shared load balancer with a custom config.
    pub fn with_config(config: Config) -> Self {
        Self::from(LoadBalancer::with_config(config))
    }

    /// Lock the balancer for a sequence of calls.
    pub fn lock(&self) -> MutexGuard<'_, LoadBalancer> {
        self.inner.lock()
    }

    /// Figure out which server owns this key.
    pub fn route(&self, key: &str) -> Option<ServerId> {
        self.inner.lock().route(key)
    }

    /// Store a key-value pair. See [`LoadBalancer::store`].
    pub fn store(&self, key: &str, value: &str) -> Option<ServerId> {
        self.inner.lock().store(key, value)
    }

    /// Get an owned copy of the value under `key` and the server asked.
    pub fn retrieve(&self, key: &str) -> (Option<String>, Option<ServerId>) {
        let lb = self.inner.lock();
        let (value, server_id) = lb.retrieve(key);
        (value.map(str::to_owned), server_id)
    }

    /// Add a server. See [`LoadBalancer::add_server`].
    pub fn add_server(&self, server_id: ServerId) -> Result<(), Error> {
        self.inner.lock().add_server(server_id)
    }

    /// Remove a server. See [`LoadBalancer::remove_server`].
    pub fn remove_server(&self, server_id: ServerId) -> Result<(), Error> {
        self.inner.lock().remove_server(server_id)
    }
}

impl From<LoadBalancer> for SharedLoadBalancer {
    fn from(lb: LoadBalancer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(lb)),
        }
    }
}

impl Default for SharedLoadBalancer {
    fn default() -> Self {
        Self::new()
    }
}
