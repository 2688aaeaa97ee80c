//! Cardseer error types

/// Failure of a single upstream attempt, or of a whole fetch cycle.
///
/// `Clone` because one settled failure is handed to the leader and to every
/// follower that joined the same in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("upstream request timed out")]
    Timeout,

    #[error("rate limited by upstream")]
    RateLimited,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    /// The task performing the fetch ended without settling the request.
    #[error("in-flight request abandoned before settlement")]
    Abandoned,
}

impl UpstreamError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Timeouts, rate limiting, transport failures and non-2xx statuses are
    /// transient. A body that does not decode will not decode next time either.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            UpstreamError::Http(_)
                | UpstreamError::Timeout
                | UpstreamError::RateLimited
                | UpstreamError::Api { .. }
        )
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Http(err.to_string())
        }
    }
}

/// Outcome of a failed lookup, as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("too many lookups, try again shortly")]
    Throttled,

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("upstream failure: {0}")]
    UpstreamFailure(#[from] UpstreamError),

    #[error("no card named '{name}' with number {number}")]
    NotFound { name: String, number: String },

    #[error("found '{name}' number {number}, but not in a set of {total} cards")]
    Ambiguous {
        name: String,
        number: String,
        total: u32,
    },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl LookupError {
    /// Whether the same lookup might succeed if the user tries again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LookupError::Throttled | LookupError::UpstreamFailure(_))
    }
}

/// Result type alias for Cardseer operations
pub type Result<T> = std::result::Result<T, LookupError>;
