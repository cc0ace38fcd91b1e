//! countrieslib error types

/// countrieslib error types
///
/// Lookups never fail with an error: absence is reported through
/// [`Lookup`](crate::Lookup). These variants cover fetching, persistence
/// and configuration.
#[derive(Debug, thiserror::Error)]
pub enum CountriesError {
    // Remote fetch errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid payload: {0}")]
    Payload(String),

    // Persistence errors
    #[error("store error: {0}")]
    Store(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// `start()` was called outside a tokio runtime.
    #[error("no tokio runtime available to run the polling tasks")]
    NoRuntime,
}

/// Result type alias for countrieslib operations
pub type Result<T> = std::result::Result<T, CountriesError>;
