use saferoute_core::ShelterSource;
use thiserror::Error;

/// Failures talking to a single collaborator.
#[derive(Debug, Error)]
pub enum LocatorError {
    /// Network, TLS, or timeout failure. The URL is stripped so API keys in
    /// query strings never reach logs.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The collaborator refused the request with a readable reason (4xx body).
    #[error("request rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Google web-service envelope reported a non-OK `status`.
    #[error("{service} API returned {status}: {message}")]
    ServiceStatus {
        service: &'static str,
        status: String,
        message: String,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Failures of a whole aggregation run.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("origin is not a valid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidOrigin { latitude: f64, longitude: f64 },

    #[error("{kind} shelter source failed: {error}")]
    SourceFailed {
        kind: ShelterSource,
        #[source]
        error: LocatorError,
    },

    #[error("all shelter sources failed (moderated: {moderated}; places: {places})")]
    AllSourcesFailed {
        #[source]
        moderated: LocatorError,
        places: LocatorError,
    },
}

impl AggregateError {
    /// Whether the caller should offer a manual retry.
    ///
    /// Source failures are retryable; a bad origin is not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AggregateError::InvalidOrigin { .. })
    }
}
