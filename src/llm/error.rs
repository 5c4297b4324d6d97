// SPDX-License-Identifier: MIT

//! Typed error handling for lead-qualifier
//!
//! Every fallible operation in the crate returns [`QualifierError`]. The
//! HTTP layer maps variants onto status codes, so new variants need a
//! matching arm in `qualifier::server::ApiError`.

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, QualifierError>;

/// Top-level error type for lead-qualifier
#[derive(Debug, Error)]
pub enum QualifierError {
    /// API errors from external services (Ollama, OpenAI)
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// Configuration errors (missing env vars, invalid values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input that violates the lead contract (e.g. an email without `@`)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Model-level failures
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Lead store failures
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(String),
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Provider name not recognised
    #[error("Unknown model provider: {0}")]
    UnknownProvider(String),

    /// Response did not have the expected envelope
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),
}

impl QualifierError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a malformed input error
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    /// Create from a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// True when the failure happened while talking to the reasoning service
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Http(_) | Self::Model(_))
    }
}

impl From<&str> for QualifierError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<String> for QualifierError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}
