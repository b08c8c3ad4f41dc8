//! # Bridge Error Types
//!
//! Typed error handling for the role bridge.
//! Every fallible operation returns `Result<T, BridgeError>`.

use thiserror::Error;

/// Core error type for checkout, webhook and role-upgrade operations
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration errors (missing keys, malformed URLs)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Client input is malformed or incomplete
    #[error("{0}")]
    Validation(String),

    /// Webhook authenticity could not be established, or the verified
    /// payload is not a well-formed event
    #[error("{0}")]
    Signature(String),

    /// The payment provider or the user platform call failed
    #[error("Upstream error [{service}]: {message}")]
    Upstream { service: String, message: String },
}

impl BridgeError {
    /// Shorthand for an upstream failure attributed to `service`
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            BridgeError::Configuration(_) => 500,
            BridgeError::Validation(_) => 400,
            BridgeError::Signature(_) => 400,
            BridgeError::Upstream { .. } => 500,
        }
    }
}

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
