// src/lib.rs
pub mod config;
pub mod engine;
pub mod error;
pub mod load_balancer;
pub mod metrics;
pub mod pool;

pub use engine::{get_engine, init_engine, set_randomize_ties, Selection, SelectionEngine};
pub use error::SelectionError;
