// src/pool/pool.rs
use super::server::Server;
use crate::config::ServerConfig;
use crate::error::SelectionError;

/// Ordered set of servers, unique by name.
///
/// Not synchronized on its own; the engine keeps it behind its lock.
#[derive(Debug, Clone, Default)]
pub struct ServerPool {
    servers: Vec<Server>,
}

impl ServerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from configuration. Duplicate names keep the first entry.
    pub fn from_configs(configs: &[ServerConfig]) -> Result<Self, SelectionError> {
        let mut pool = Self::new();
        for config in configs {
            pool.add(&config.name, config.rate)?;
        }
        Ok(pool)
    }

    /// Returns `Ok(true)` if a server was inserted, `Ok(false)` if the name
    /// was already present. The rate is only checked for new names.
    pub fn add(&mut self, name: &str, rate: f64) -> Result<bool, SelectionError> {
        if self.contains(name) {
            tracing::debug!("Server {} already in pool, ignoring add", name);
            return Ok(false);
        }

        self.servers.push(Server::new(name, rate)?);
        Ok(true)
    }

    /// Removes every server named `name` and returns how many were dropped.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.servers.len();
        self.servers.retain(|s| s.name() != name);
        before - self.servers.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.servers.iter().any(|s| s.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.name() == name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Server> {
        self.servers.iter_mut().find(|s| s.name() == name)
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub(crate) fn servers_mut(&mut self) -> &mut [Server] {
        &mut self.servers
    }

    pub fn snapshot(&self) -> Vec<Server> {
        self.servers.clone()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub(crate) fn reset_loads(&mut self) {
        for server in &mut self.servers {
            server.set_load(0.0);
        }
    }
}
