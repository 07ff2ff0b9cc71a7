// src/main.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use rust_server_selector::{
    config::{self, Config},
    engine::{self, SelectionEngine},
    metrics::MetricsRegistry,
};

const DISPATCHES: usize = 20;
const CONCURRENT_CALLERS: usize = 8;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rust_server_selector=info".parse()?),
        )
        .init();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            config::load_config(&path).await?
        }
        None => {
            let mut config = Config::default();
            config::apply_env_overrides(&mut config, config::ENV_PREFIX)?;
            config
        }
    };

    // Initialize metrics
    let metrics_registry = MetricsRegistry::new()?;

    let mut selection_engine =
        SelectionEngine::from_config(&config).context("Failed to build selection engine")?;
    if config.metrics.enabled {
        selection_engine = selection_engine.with_metrics(metrics_registry.collector());
    }
    let balancer = engine::init_engine(selection_engine);

    let handles = [
        engine::get_engine(),
        engine::get_engine(),
        engine::get_engine(),
        engine::get_engine(),
    ];
    if handles.iter().all(|h| Arc::ptr_eq(h, &balancer)) {
        println!("Same instance\n");
    }

    run_dispatch_loop(&balancer)?;
    run_concurrent_burst(balancer.clone()).await?;

    if config.metrics.enabled {
        println!("\n{}", metrics_registry.gather()?);
    }

    Ok(())
}

fn run_dispatch_loop(balancer: &SelectionEngine) -> Result<()> {
    for i in 0..DISPATCHES {
        if i > 8 {
            engine::set_randomize_ties(false);
        }

        if i == 9 {
            for name in ["ServerVI", "ServerVII", "ServerVIII"] {
                balancer.add_server(name, 1.0)?;
            }
        }

        if i == 12 {
            for name in ["ServerVI", "ServerVII", "ServerVIII"] {
                balancer.remove_server(name);
            }
        }

        let selection = balancer.select_next()?;
        println!(
            "{} Dispatch Request to: {} - request: {}",
            i, selection.server, selection.request_count
        );
    }

    Ok(())
}

async fn run_concurrent_burst(balancer: Arc<SelectionEngine>) -> Result<()> {
    engine::set_randomize_ties(true);

    let tasks = (0..CONCURRENT_CALLERS).map(|caller| {
        let balancer = balancer.clone();
        tokio::task::spawn_blocking(move || {
            balancer.select_next().map(|selection| (caller, selection))
        })
    });

    for result in futures::future::join_all(tasks).await {
        let (caller, selection) = result.context("Dispatch task panicked")??;
        println!(
            "caller {} Dispatch Request to: {} - request: {}",
            caller, selection.server, selection.request_count
        );
    }

    Ok(())
}
