use crate::config::ServerId;

/// Errors that can occur when configuring or reshaping a load balancer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The maximum server count is invalid (must be greater than 0).
    InvalidMaxServers,
    /// The replica count is invalid (must be greater than 0, and
    /// `max_servers * replicas` must fit in a `u32` label).
    InvalidReplicas,
    /// The bucket count is invalid (must be greater than 0).
    InvalidBucketCount,
    /// A server with this id is already part of the ring.
    ServerAlreadyExists(ServerId),
    /// No server with this id is part of the ring.
    ServerNotFound(ServerId),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidMaxServers => write!(f, "max servers must be greater than 0"),
            Error::InvalidReplicas => write!(
                f,
                "replicas must be greater than 0 and max_servers * replicas must fit in u32"
            ),
            Error::InvalidBucketCount => write!(f, "bucket count must be greater than 0"),
            Error::ServerAlreadyExists(id) => write!(f, "server {} already exists", id),
            Error::ServerNotFound(id) => write!(f, "server {} not found", id),
        }
    }
}

impl std::error::Error for Error {}
