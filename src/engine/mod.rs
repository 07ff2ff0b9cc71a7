// src/engine/mod.rs
mod access;
mod selector;

pub use access::{get_engine, init_engine, randomize_ties, set_randomize_ties};
pub use selector::{Selection, SelectionEngine};
