// src/load_balancer/mod.rs
mod algorithm;
mod least_connections;
mod load_ratio;

pub use algorithm::SelectionPolicy; // trait
pub use least_connections::LeastConnections;
pub use load_ratio::LeastLoadRatio;
pub use crate::config::SelectionAlgorithm; // enum exposed if needed

use std::sync::Arc;

pub fn create_policy(algorithm: SelectionAlgorithm) -> Arc<dyn SelectionPolicy> {
    match algorithm {
        SelectionAlgorithm::LeastConnections => Arc::new(LeastConnections::new()),
        SelectionAlgorithm::LeastLoadRatio => Arc::new(LeastLoadRatio::new()),
    }
}
