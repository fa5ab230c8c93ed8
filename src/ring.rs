//! Consistent-hashing ring of virtual replica points.
//!
//! The ring stores replica labels only. A label `max_servers * replica + id`
//! belongs to server `label % max_servers` and sits on the circle at
//! `server_hash(label)`. Labels are kept sorted by that hash, not by the
//! label itself, and lookups past the last point wrap to the first.

use crate::config::ServerId;
use crate::hash::server_hash;

/// Sorted ring of replica labels.
#[derive(Debug, Clone)]
pub struct HashRing {
    points: Vec<u32>,
    capacity: usize,
    max_points: usize,
    max_servers: u32,
}

impl HashRing {
    /// Create an empty ring sized for one server's replicas.
    pub fn new(replicas: u32, max_servers: u32) -> Self {
        let capacity = replicas as usize;
        Self {
            points: Vec::with_capacity(capacity),
            capacity,
            max_points: replicas as usize * max_servers as usize,
            max_servers,
        }
    }

    /// The replica labels of `server_id`, in replica order.
    pub fn labels(server_id: ServerId, replicas: u32, max_servers: u32) -> impl Iterator<Item = u32> {
        (0..replicas).map(move |replica| {
            max_servers
                .wrapping_mul(replica)
                .wrapping_add(server_id)
        })
    }

    /// Number of points on the ring.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the ring has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Reserved point capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Labels in ring order.
    pub fn points(&self) -> &[u32] {
        &self.points
    }

    /// Server owning `label`.
    #[inline]
    pub fn owner(&self, label: u32) -> ServerId {
        label % self.max_servers
    }

    /// Make room for `additional` more points, doubling the capacity as
    /// needed but never past `replicas * max_servers`.
    pub fn reserve(&mut self, additional: usize) {
        let needed = self.points.len() + additional;
        if self.points.len() == self.max_points || needed <= self.capacity {
            return;
        }
        while self.capacity < needed && self.capacity < self.max_points {
            self.capacity = (self.capacity.max(1) * 2).min(self.max_points);
        }
        self.points
            .reserve_exact(self.capacity.saturating_sub(self.points.len()));
    }

    /// Leftmost index whose point hash is not less than `hash`, or `len()`
    /// when every point hashes lower.
    #[inline]
    fn lower_bound(&self, hash: u32) -> usize {
        self.points
            .partition_point(|&label| server_hash(label) < hash)
    }

    /// Insert `label` at its sorted position and return that position.
    pub fn insert(&mut self, label: u32) -> usize {
        let index = self.lower_bound(server_hash(label));
        self.points.insert(index, label);
        index
    }

    /// Remove the point hashing to `hash`.
    ///
    /// The binary search stops at the first exact match it probes. Without
    /// an exact match it falls back to the leftmost point hashing above
    /// `hash`, and then to the last point. Returns the removed label, or
    /// `None` on an empty ring.
    pub fn remove(&mut self, hash: u32) -> Option<u32> {
        if self.points.is_empty() {
            return None;
        }

        let mut start = 0usize;
        let mut end = self.points.len() - 1;
        let mut index = None;
        while start <= end {
            let mid = start + (end - start) / 2;
            let point_hash = server_hash(self.points[mid]);
            if hash > point_hash {
                start = mid + 1;
            } else {
                index = Some(mid);
                if hash == point_hash || mid == 0 {
                    break;
                }
                end = mid - 1;
            }
        }

        let index = index.unwrap_or(self.points.len() - 1);
        Some(self.points.remove(index))
    }

    /// Index of the point responsible for `hash`.
    ///
    /// Hashes above the last point wrap around to index 0.
    pub fn locate(&self, hash: u32) -> Option<usize> {
        let last = *self.points.last()?;
        if hash > server_hash(last) {
            return Some(0);
        }
        Some(self.lower_bound(hash))
    }

    /// Server responsible for `hash`.
    pub fn route(&self, hash: u32) -> Option<ServerId> {
        self.locate(hash).map(|index| self.owner(self.points[index]))
    }

    /// Label of the clockwise neighbour of the point at `index`, if the ring
    /// has more than one point.
    pub fn successor(&self, index: usize) -> Option<u32> {
        if self.points.len() <= 1 {
            return None;
        }
        self.points.get((index + 1) % self.points.len()).copied()
    }

    /// Check that points are ordered by non-decreasing hash.
    pub fn is_sorted(&self) -> bool {
        self.points
            .windows(2)
            .all(|pair| server_hash(pair[0]) <= server_hash(pair[1]))
    }
}
