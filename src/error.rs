use std::sync::Arc;
use thiserror::Error;

/// Fallback message when a failed response carries no readable `message`
pub const GENERIC_API_ERROR: &str = "API Error";

/// Failures raised by the remote lookup client
///
/// In-band "not found" answers are not errors; they decode into a normal
/// response whose `Response` field is `"False"`.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Neither a media id nor a title was given. Raised before any request.
    #[error("Either mediaId or title must be provided")]
    MissingIdentifier,

    /// The server answered with a non-success status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the expected JSON shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LookupError {
    /// Whether the query cache may retry the request that produced this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Transport(_))
    }
}

/// A producer failure shared by every waiter on the same cache key
#[derive(Debug, Clone, Error)]
#[error("{0:#}")]
pub struct QueryError(Arc<anyhow::Error>);

impl QueryError {
    pub fn new(error: anyhow::Error) -> Self {
        Self(Arc::new(error))
    }

    /// The underlying lookup error, if the producer failed with one
    pub fn lookup_error(&self) -> Option<&LookupError> {
        self.0.downcast_ref::<LookupError>()
    }
}

/// Whether a producer error is worth another attempt
///
/// Errors that are not lookup errors are treated as transient.
pub fn is_retryable(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<LookupError>()
        .is_none_or(LookupError::is_retryable)
}
