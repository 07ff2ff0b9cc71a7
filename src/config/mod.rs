// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Prefix for environment overrides, e.g. `SELECTOR_RANDOMIZE_TIES=false`.
pub const ENV_PREFIX: &str = "SELECTOR";

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let mut config: Config = if path.extension().and_then(|s| s.to_str()) == Some("yaml")
        || path.extension().and_then(|s| s.to_str()) == Some("yml") {
        serde_yaml::from_str(&contents).context("Failed to parse YAML config")?
    } else {
        serde_json::from_str(&contents).context("Failed to parse JSON config")?
    };

    apply_env_overrides(&mut config, ENV_PREFIX)?;
    config.validate()?;
    Ok(config)
}

/// Overlay scalar settings from `<prefix>_RANDOMIZE_TIES` and `<prefix>_ALGORITHM`.
pub fn apply_env_overrides(config: &mut Config, prefix: &str) -> Result<()> {
    let env = ::config::Config::builder()
        .add_source(::config::Environment::with_prefix(prefix))
        .build()
        .context("Failed to read environment overrides")?;

    match env.get_bool("randomize_ties") {
        Ok(value) => {
            tracing::debug!("randomize_ties overridden from environment: {}", value);
            config.randomize_ties = value;
        }
        Err(::config::ConfigError::NotFound(_)) => {}
        Err(e) => return Err(e).context("Invalid randomize_ties override"),
    }

    match env.get_string("algorithm") {
        Ok(value) => {
            config.algorithm = value.parse().context("Invalid algorithm override")?;
            tracing::debug!("algorithm overridden from environment: {:?}", config.algorithm);
        }
        Err(::config::ConfigError::NotFound(_)) => {}
        Err(e) => return Err(e).context("Invalid algorithm override"),
    }

    Ok(())
}
