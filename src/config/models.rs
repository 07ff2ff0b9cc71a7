// src/config/models.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub servers: Vec<ServerConfig>,
    pub randomize_ties: bool,
    pub algorithm: SelectionAlgorithm,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionAlgorithm {
    /// Idle servers first, then fewest in-flight requests. `rate` is ignored.
    #[default]
    LeastConnections,
    /// Idle servers first, then lowest `request_count / rate`.
    LeastLoadRatio,
}

impl std::str::FromStr for SelectionAlgorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "least_connections" => Ok(SelectionAlgorithm::LeastConnections),
            "least_load_ratio" => Ok(SelectionAlgorithm::LeastLoadRatio),
            other => bail!("Unknown selection algorithm: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ServerConfig {
    pub fn new(name: impl Into<String>, rate: f64) -> Self {
        Self {
            name: name.into(),
            rate,
        }
    }
}

/// Initial pool used when nothing else is configured.
pub fn default_servers() -> Vec<ServerConfig> {
    vec![
        ServerConfig::new("ServerI", 0.5),
        ServerConfig::new("ServerII", 1.0),
        ServerConfig::new("ServerIII", 1.0),
        ServerConfig::new("ServerIV", 1.5),
        ServerConfig::new("ServerV", 3.0),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            randomize_ties: true,
            algorithm: SelectionAlgorithm::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for server in &self.servers {
            if server.name.trim().is_empty() {
                bail!("Server name must not be empty");
            }
            if !(server.rate.is_finite() && server.rate > 0.0) {
                bail!(
                    "Server '{}' has invalid rate {}: must be positive",
                    server.name,
                    server.rate
                );
            }
            if !seen.insert(server.name.as_str()) {
                bail!("Duplicate server name: {}", server.name);
            }
        }

        Ok(())
    }
}
