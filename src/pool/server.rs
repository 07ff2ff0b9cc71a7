// src/pool/server.rs
use crate::error::SelectionError;
use chrono::{DateTime, Utc};

/// One backend tracked by the pool.
///
/// Load fields are only mutable from inside the crate so every change goes
/// through the pool's critical section.
#[derive(Debug, Clone, PartialEq)]
pub struct Server {
    name: String,
    rate: f64,

    // Runtime state
    request_count: f64,
    is_busy: bool,
    last_selected: Option<DateTime<Utc>>,
}

impl Server {
    pub fn new(name: impl Into<String>, rate: f64) -> Result<Self, SelectionError> {
        let name = name.into();
        if !(rate.is_finite() && rate > 0.0) {
            return Err(SelectionError::InvalidParameter { name, rate });
        }

        Ok(Self {
            name,
            rate,
            request_count: 0.0,
            is_busy: false,
            last_selected: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn request_count(&self) -> f64 {
        self.request_count
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }

    pub fn last_selected(&self) -> Option<DateTime<Utc>> {
        self.last_selected
    }

    /// Requests per unit of capacity. Lower means more headroom.
    pub fn load_ratio(&self) -> f64 {
        self.request_count / self.rate
    }

    /// `is_busy` always follows `request_count`.
    pub(crate) fn set_load(&mut self, count: f64) {
        let count = count.max(0.0);
        if self.request_count != count {
            self.request_count = count;
            self.is_busy = self.request_count > 0.0;
        }
    }

    pub(crate) fn increment_load(&mut self) {
        self.set_load(self.request_count + 1.0);
        self.last_selected = Some(Utc::now());
    }

    pub(crate) fn decrement_load(&mut self) {
        self.set_load(self.request_count - 1.0);
    }
}
