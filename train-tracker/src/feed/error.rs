//! Transit feed error types.

use std::fmt;

/// Errors from fetching transit data.
///
/// During a refresh tick every variant means the same thing to the core:
/// the feed is unavailable and the previous snapshot stays in place.
#[derive(Debug)]
pub enum FeedError {
    /// HTTP request failed (network error, connection reset, etc.)
    Http(reqwest::Error),

    /// The request did not complete within the configured timeout
    Timeout,

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    ApiError { status: u16, message: String },

    /// The response was well-formed but unusable as a whole
    Malformed(String),

    /// Rate limited by the API
    RateLimited,

    /// Invalid API key or unauthorized
    Unauthorized,
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Http(e) => write!(f, "HTTP error: {e}"),
            FeedError::Timeout => write!(f, "request timed out"),
            FeedError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            FeedError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            FeedError::Malformed(msg) => write!(f, "malformed response: {msg}"),
            FeedError::RateLimited => write!(f, "rate limited by transit API"),
            FeedError::Unauthorized => write!(f, "unauthorized (invalid API key)"),
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout
        } else {
            FeedError::Http(err)
        }
    }
}
