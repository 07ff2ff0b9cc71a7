// src/pool/mod.rs
mod pool;
mod server;

pub use pool::ServerPool;
pub use server::Server;
