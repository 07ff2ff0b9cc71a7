// src/load_balancer/load_ratio.rs
use crate::load_balancer::algorithm::{min_key_indices, SelectionPolicy};
use crate::pool::Server;

/// Capacity-weighted variant: idle first, then lowest `request_count / rate`.
#[derive(Debug, Default)]
pub struct LeastLoadRatio;

impl LeastLoadRatio {
    pub fn new() -> Self {
        Self
    }
}

impl SelectionPolicy for LeastLoadRatio {
    fn tie_set(&self, servers: &[Server]) -> Vec<usize> {
        min_key_indices(servers, |s| (s.is_busy(), s.load_ratio()))
    }

    fn name(&self) -> &'static str {
        "least_load_ratio"
    }
}
