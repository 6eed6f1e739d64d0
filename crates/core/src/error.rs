//! Error types for the EduAssist domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all EduAssist operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Request validation ---
    #[error("Parameter validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    // --- Completion backend ---
    #[error("Completion error: {0}")]
    Completion(#[from] ProviderError),

    // --- Session/message store ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Missing session, or a session owned by a different user.
    #[error("Session not found: {0}")]
    NotFound(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider returned an empty completion")]
    EmptyCompletion,

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Session does not exist: {0}")]
    MissingSession(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_joins_messages() {
        let err = Error::Validation(vec![
            "Unsupported parameter 'foo' for action type TRANSLATE".into(),
            "User ID is required".into(),
        ]);
        assert_eq!(
            err.to_string(),
            "Parameter validation failed: Unsupported parameter 'foo' for action type TRANSLATE, User ID is required"
        );
    }

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Completion(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn store_error_converts() {
        let err: Error = StoreError::MissingSession("session_abc".into()).into();
        assert!(matches!(err, Error::Store(StoreError::MissingSession(_))));
    }
}
