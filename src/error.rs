//! Error types for jobrank
//!
//! The ranking pipeline is built to degrade rather than fail: most stages
//! handle bad input locally and only genuinely unexpected conditions surface
//! as a `RankError`. The ranking engine catches those at its boundary and
//! hands the caller back the unranked postings (see `rank::RankOutcome`).

use thiserror::Error;

/// Errors that can occur inside the ranking pipeline
#[derive(Error, Debug)]
pub enum RankError {
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("vectorization failed: {reason}")]
    Vectorization { reason: String },

    #[error("dimensionality reduction failed: {reason}")]
    Reduction { reason: String },

    #[error("model cache error: {reason}")]
    Cache { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RankError {
    /// Create an error for a failed vectorization step
    pub fn vectorization(reason: impl std::fmt::Display) -> Self {
        RankError::Vectorization {
            reason: reason.to_string(),
        }
    }

    /// Create an error for a failed reduction step
    pub fn reduction(reason: impl std::fmt::Display) -> Self {
        RankError::Reduction {
            reason: reason.to_string(),
        }
    }

    /// Create an error for a cache read or write failure
    pub fn cache(reason: impl std::fmt::Display) -> Self {
        RankError::Cache {
            reason: reason.to_string(),
        }
    }

    /// Create an error for an invalid configuration value
    pub fn invalid_config(reason: impl std::fmt::Display) -> Self {
        RankError::InvalidConfig {
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for jobrank operations
pub type Result<T> = std::result::Result<T, RankError>;
