//! Error types for the hedgekit CLI.

use pricer_core::types::PricingError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration sources could not be read or deserialised
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration values were read but are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input file missing
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Pricing, hedging or risk computation failed
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML output failed
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// Command-line argument rejected
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result alias used by every command.
pub type Result<T> = std::result::Result<T, CliError>;
