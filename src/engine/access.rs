// src/engine/access.rs
//
// Process-wide engine handle. Callers that can take an engine explicitly
// should be handed an `Arc<SelectionEngine>` instead of reaching for this.

use super::selector::SelectionEngine;
use std::sync::{Arc, OnceLock};

static ENGINE: OnceLock<Arc<SelectionEngine>> = OnceLock::new();

/// Shared engine, built over the seed pool on first use.
///
/// Concurrent first callers block until the single instance is ready and
/// all of them receive the same one.
pub fn get_engine() -> Arc<SelectionEngine> {
    ENGINE
        .get_or_init(|| {
            tracing::info!("Initializing process-wide selection engine with seed pool");
            Arc::new(SelectionEngine::default())
        })
        .clone()
}

/// Install `engine` as the shared engine if none exists yet.
///
/// Returns whichever engine ends up installed; when one was already in place,
/// `engine` is dropped.
pub fn init_engine(engine: SelectionEngine) -> Arc<SelectionEngine> {
    let mut installed = false;
    let shared = ENGINE
        .get_or_init(|| {
            installed = true;
            Arc::new(engine)
        })
        .clone();

    if installed {
        tracing::info!(
            "Installed process-wide selection engine ({} servers, policy {})",
            shared.pool_size(),
            shared.policy_name()
        );
    } else {
        tracing::warn!("Selection engine already initialized, ignoring new instance");
    }

    shared
}

/// Toggle randomized tie-breaking on the shared engine.
pub fn set_randomize_ties(enabled: bool) {
    get_engine().set_randomize_ties(enabled);
}

pub fn randomize_ties() -> bool {
    get_engine().randomize_ties()
}
