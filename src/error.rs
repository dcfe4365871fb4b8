//! Error types for dispersion analysis

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for dispersion operations
pub type Result<T> = std::result::Result<T, DispersionError>;

/// Sign of a dispersion partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Close above its moving average
    Positive,
    /// Close below its moving average
    Negative,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Positive => write!(f, "positive"),
            Side::Negative => write!(f, "negative"),
        }
    }
}

/// Failures raised by a price series provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Failed to parse price data: {message}")]
    Parse { message: String },

    #[error("No price data returned for {symbol}")]
    NoData { symbol: String },

    #[error("File I/O error: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        ProviderError::Io {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for ProviderError {
    fn from(err: csv::Error) -> Self {
        ProviderError::Parse {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "yahoo")]
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Network {
            message: err.to_string(),
        }
    }
}

/// Errors that can occur while computing a dispersion report
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispersionError {
    #[error("Price provider failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Insufficient data: window of {required} needs at least {required} prices, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Empty {side} partition: no days with {side} dispersion")]
    EmptyPartition { side: Side },

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<config::ConfigError> for DispersionError {
    fn from(err: config::ConfigError) -> Self {
        DispersionError::Config {
            message: err.to_string(),
        }
    }
}
