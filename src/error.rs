use thiserror::Error;

/// Main error type for offer verification and monitoring
#[derive(Error, Debug)]
pub enum GuardError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Page context errors
    #[error("Not a trade context: missing {0}")]
    NotATradeContext(String),

    // Offer lifecycle errors
    #[error("Trade offer {offer_id} is no longer active: {reason}")]
    AnomalousOfferState { offer_id: String, reason: String },

    #[error("Invalid state transition: from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Verification outcome errors (CLI exit status)
    #[error("Trade partner {0} is impersonating a trusted bot")]
    Impersonation(String),

    #[error("Verification inconclusive: {0}")]
    Inconclusive(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl GuardError {
    /// Errors that come from fetching or parsing a remote page.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            GuardError::NetworkFailure(_) | GuardError::MalformedResponse(_)
        )
    }
}

/// Result type alias for GuardError
pub type Result<T> = std::result::Result<T, GuardError>;
