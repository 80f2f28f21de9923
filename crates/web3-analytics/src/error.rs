//! Error Types for Web3 Analytics

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// A collaborator could not deliver data (HTTP status, API-level error)
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Requested chain, DEX, token or market is not in the known set
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// A derived quantity is mathematically undefined for the inputs
    #[error("Not computable: {0}")]
    NotComputable(String),

    #[error("Insufficient history for {indicator}: need {required} bars, have {available}")]
    InsufficientHistory {
        indicator: String,
        required: usize,
        available: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Raw payload did not have any recognizable shape
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalyticsError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        AnalyticsError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Stable machine-readable code, carried on failed tool results
    pub fn code(&self) -> &'static str {
        match self {
            AnalyticsError::UpstreamUnavailable(_)
            | AnalyticsError::Network(_)
            | AnalyticsError::MalformedPayload(_)
            | AnalyticsError::Serialization(_) => "UPSTREAM_UNAVAILABLE",
            AnalyticsError::NotFound { .. } => "NOT_FOUND",
            AnalyticsError::NotComputable(_) => "NOT_COMPUTABLE",
            AnalyticsError::InsufficientHistory { .. } => "INSUFFICIENT_HISTORY",
            AnalyticsError::InvalidInput(_) => "INVALID_INPUT",
            AnalyticsError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Outcomes a caller can act on (adjust arguments, pick another entity)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalyticsError::NotFound { .. }
                | AnalyticsError::NotComputable(_)
                | AnalyticsError::InsufficientHistory { .. }
                | AnalyticsError::InvalidInput(_)
        )
    }
}
