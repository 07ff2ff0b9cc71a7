// src/engine/selector.rs
use chrono::{DateTime, Utc};
use crate::config::{default_servers, Config};
use crate::error::SelectionError;
use crate::load_balancer::{create_policy, LeastConnections, SelectionPolicy};
use crate::metrics::MetricsCollector;
use crate::pool::{Server, ServerPool};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of one `select_next` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub request_id: Uuid,
    pub server: String,
    /// Load of the chosen server after this request was assigned.
    pub request_count: f64,
    /// How many servers shared the best rank.
    pub tie_set_size: usize,
    pub selected_at: DateTime<Utc>,
}

// The pool and the tie-break rng share one lock so that ranking, tie-break
// and increment happen as a single step.
struct EngineState {
    pool: ServerPool,
    rng: StdRng,
}

/// Picks the next server for a unit of work and tracks per-server load.
///
/// All methods take `&self`; share it across threads with `Arc`.
pub struct SelectionEngine {
    state: Mutex<EngineState>,
    policy: Arc<dyn SelectionPolicy>,
    randomize_ties: AtomicBool,
    metrics: Option<Arc<MetricsCollector>>,
}

impl SelectionEngine {
    pub fn new(pool: ServerPool) -> Self {
        Self {
            state: Mutex::new(EngineState {
                pool,
                rng: StdRng::from_entropy(),
            }),
            policy: Arc::new(LeastConnections::new()),
            randomize_ties: AtomicBool::new(true),
            metrics: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, SelectionError> {
        let pool = ServerPool::from_configs(&config.servers)?;

        Ok(Self::new(pool)
            .with_policy(create_policy(config.algorithm))
            .with_randomize_ties(config.randomize_ties))
    }

    pub fn with_policy(mut self, policy: Arc<dyn SelectionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the tie-break source, e.g. with a seeded rng in tests.
    pub fn with_rng(self, rng: StdRng) -> Self {
        self.lock().rng = rng;
        self
    }

    pub fn with_randomize_ties(self, enabled: bool) -> Self {
        self.randomize_ties.store(enabled, Ordering::SeqCst);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        {
            let state = self.lock();
            metrics.update_pool_size(state.pool.len());
            for server in state.pool.servers() {
                metrics.update_server_load(server.name(), server.request_count());
            }
        }
        self.metrics = Some(metrics);
        self
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn randomize_ties(&self) -> bool {
        self.randomize_ties.load(Ordering::SeqCst)
    }

    pub fn set_randomize_ties(&self, enabled: bool) {
        let previous = self.randomize_ties.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            info!("Randomized tie-break {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    /// Add a server unless one with the same name exists.
    ///
    /// Returns `Ok(false)` for a duplicate name without looking at `rate`.
    /// A non-positive rate for a new name is rejected.
    pub fn add_server(&self, name: &str, rate: f64) -> Result<bool, SelectionError> {
        let mut state = self.lock();

        let result = state.pool.add(name, rate);
        let added = match result {
            Ok(added) => added,
            Err(e) => {
                drop(state);
                warn!("Rejected server {}: {}", name, e);
                self.record_error(&e);
                return Err(e);
            }
        };

        if added {
            if let Some(metrics) = &self.metrics {
                metrics.update_pool_size(state.pool.len());
                metrics.update_server_load(name, 0.0);
            }
            info!("Added server {} (rate {}), pool size {}", name, rate, state.pool.len());
        }

        Ok(added)
    }

    /// Remove every server called `name`. Missing names are not an error.
    pub fn remove_server(&self, name: &str) -> usize {
        let mut state = self.lock();
        let removed = state.pool.remove(name);

        if removed > 0 {
            if let Some(metrics) = &self.metrics {
                metrics.update_pool_size(state.pool.len());
                metrics.forget_server(name);
            }
            info!("Removed server {}, pool size {}", name, state.pool.len());
        } else {
            debug!("Server {} not in pool, nothing to remove", name);
        }

        removed
    }

    /// Rank the pool, break ties, and assign one request to the winner.
    pub fn select_next(&self) -> Result<Selection, SelectionError> {
        let mut guard = self.lock();
        let EngineState { pool, rng } = &mut *guard;

        let tied = self.policy.tie_set(pool.servers());
        if tied.is_empty() {
            drop(guard);
            warn!("Selection requested from an empty pool");
            let err = SelectionError::NoServersAvailable;
            self.record_error(&err);
            return Err(err);
        }

        let index = if self.randomize_ties() && tied.len() > 1 {
            tied[rng.gen_range(0..tied.len())]
        } else {
            tied[0]
        };

        // index comes from tie_set over this same locked pool
        let server = &mut pool.servers_mut()[index];
        server.increment_load();

        let selection = Selection {
            request_id: Uuid::new_v4(),
            server: server.name().to_string(),
            request_count: server.request_count(),
            tie_set_size: tied.len(),
            selected_at: server.last_selected().unwrap_or_else(Utc::now),
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_selection(&selection.server, selection.request_count, selection.tie_set_size);
        }

        debug!(
            request_id = %selection.request_id,
            server = %selection.server,
            load = selection.request_count,
            tied = selection.tie_set_size,
            policy = self.policy.name(),
            selected_at = %selection.selected_at,
            "Selected server"
        );

        Ok(selection)
    }

    /// Mark one request on `name` as finished. Returns the new load, or
    /// `None` if the server is not in the pool.
    pub fn complete(&self, name: &str) -> Option<f64> {
        let mut state = self.lock();
        let server = state.pool.get_mut(name)?;
        server.decrement_load();
        let load = server.request_count();

        if let Some(metrics) = &self.metrics {
            metrics.update_server_load(name, load);
        }
        debug!(server = %name, load, "Request completed");

        Some(load)
    }

    /// Drop every server's load back to zero.
    pub fn reset_loads(&self) {
        let mut state = self.lock();
        state.pool.reset_loads();

        if let Some(metrics) = &self.metrics {
            for server in state.pool.servers() {
                metrics.update_server_load(server.name(), 0.0);
            }
        }
        debug!("Reset load on {} servers", state.pool.len());
    }

    /// Copy of the pool in ranking order.
    pub fn snapshot(&self) -> Vec<Server> {
        self.lock().pool.snapshot()
    }

    pub fn get_server(&self, name: &str) -> Option<Server> {
        self.lock().pool.get(name).cloned()
    }

    pub fn pool_size(&self) -> usize {
        self.lock().pool.len()
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        // Pool invariants hold between every mutation, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_error(&self, err: &SelectionError) {
        if let Some(metrics) = &self.metrics {
            metrics.record_error(err.reason());
        }
    }
}

impl Default for SelectionEngine {
    /// Engine over the built-in seed pool.
    fn default() -> Self {
        let pool = ServerPool::from_configs(&default_servers())
            .expect("seed servers have positive rates");
        Self::new(pool)
    }
}
