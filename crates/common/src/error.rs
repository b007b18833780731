use std::time::Duration;

/// Post search error types
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Precondition violated by the caller (empty query, zero neighbors)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport or service failure from an upstream (model, index, store)
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream answered but the payload is unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Terminal error after the retry budget is spent
    #[error("Retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<SearchError>,
    },

    /// The whole search did not finish in time
    #[error("Search deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SearchError {
    /// Create invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create upstream unavailable error
    pub fn upstream<S: Into<String>>(msg: S) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    /// Create invalid response error
    pub fn invalid_response<S: Into<String>>(msg: S) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the failure may go away on a second try.
    ///
    /// `InvalidResponse` is reported as transient here; the retry policy
    /// decides separately whether to spend attempts on it.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_) | Self::InvalidResponse(_))
    }

    /// Whether this is a caller mistake rather than a server-side failure
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

// HTTP response conversion
impl SearchError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidArgument(_) => 400,
            Self::DeadlineExceeded(_) => 504,
            Self::UpstreamUnavailable(_) => 500,
            Self::InvalidResponse(_) => 500,
            Self::RetriesExhausted { .. } => 500,
            Self::Config(_) => 500,
            Self::Io(_) => 500,
            Self::Json(_) => 500,
            Self::Other(_) => 500,
        }
    }
}
