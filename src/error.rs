//! Error types for the speedhud controller.
//!
//! Steady-state operation of the mode state machine is infallible; errors
//! only arise at the edges, when loading configuration or body-threshold
//! tables from disk.

use thiserror::Error;

/// Errors related to settings and body-threshold management.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Failed to write configuration: {0}")]
    WriteError(#[from] std::io::Error),
}
