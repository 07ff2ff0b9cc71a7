// src/load_balancer/least_connections.rs
use crate::load_balancer::algorithm::{min_key_indices, SelectionPolicy};
use crate::pool::Server;

/// Idle servers rank ahead of busy ones; within the same state, the fewest
/// in-flight requests wins. Capacity (`rate`) plays no part.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self
    }
}

impl SelectionPolicy for LeastConnections {
    fn tie_set(&self, servers: &[Server]) -> Vec<usize> {
        min_key_indices(servers, |s| (s.is_busy(), s.request_count()))
    }

    fn name(&self) -> &'static str {
        "least_connections"
    }
}
