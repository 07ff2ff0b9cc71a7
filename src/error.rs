// src/error.rs

/// Errors surfaced by pool maintenance and server selection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("Invalid rate {rate} for server '{name}': rate must be a positive number")]
    InvalidParameter { name: String, rate: f64 },

    #[error("No servers available for selection")]
    NoServersAvailable,
}

impl SelectionError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            SelectionError::InvalidParameter { .. } => "invalid_parameter",
            SelectionError::NoServersAvailable => "no_servers_available",
        }
    }
}
