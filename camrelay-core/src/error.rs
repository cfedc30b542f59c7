//! Error types for camrelay.
//!
//! This module provides the error hierarchy using `thiserror`. Configuration
//! errors are fatal and halt startup; network errors are transient and are
//! absorbed per source by the refresh engine.

use thiserror::Error;

/// Result type alias using `RelayError`.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Main error type for all camrelay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS (fatal at load time)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Malformed configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Source origin URL is missing or does not parse.
    #[error("Invalid origin URL '{url}': {reason}")]
    InvalidOrigin { url: String, reason: String },

    /// A non-empty label slugified to nothing.
    #[error("Label '{label}' produces an empty slug")]
    EmptySlug { label: String },

    /// Two sources derived the same id.
    #[error("Duplicate source id '{id}' for URL '{url}'")]
    DuplicateId { id: String, url: String },

    /// Two labels slugified to the same slug.
    #[error("Duplicate slug '{0}'")]
    DuplicateSlug(String),

    /// Two groups share a name.
    #[error("Duplicate group name '{0}'")]
    DuplicateGroup(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK ERRORS (transient, retried by the next pass)
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP request failed in transport.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Request exceeded its bounded timeout.
    #[error("Request to '{url}' timed out")]
    Timeout { url: String },

    /// Origin answered with a non-success status.
    #[error("Origin '{url}' returned status {status}")]
    OriginStatus { url: String, status: u16 },

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl RelayError {
    /// Returns true if this error is recoverable (the next pass retries it).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RelayError::HttpError(_)
                | RelayError::Timeout { .. }
                | RelayError::OriginStatus { .. }
        )
    }

    /// Returns true if this is a fatal configuration error.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RelayError::ConfigError(_)
                | RelayError::InvalidOrigin { .. }
                | RelayError::EmptySlug { .. }
                | RelayError::DuplicateId { .. }
                | RelayError::DuplicateSlug(_)
                | RelayError::DuplicateGroup(_)
        )
    }
}
