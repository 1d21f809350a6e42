//! Error types shared by the upstream API clients.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`FetchError`] failures.
pub type FetchResult<T> = Result<T, FetchError>;

/// Failures that make a fetch yield no data for the current tick.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build HTTP client for {endpoint}")]
    ClientBuilder {
        /// Upstream host.
        endpoint: &'static str,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or timed out.
    #[error("request to {endpoint} failed")]
    Request {
        /// Upstream host.
        endpoint: &'static str,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The upstream answered with a non-success status code.
    #[error("unexpected response status {status} from {endpoint}")]
    Status {
        /// Upstream host.
        endpoint: &'static str,
        /// Status code returned.
        status: StatusCode,
    },
    /// Response payload could not be parsed as JSON of the expected shape.
    #[error("failed to decode response from {endpoint}")]
    Decode {
        /// Upstream host.
        endpoint: &'static str,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// Payload decoded but carries values outside the domain (unknown codes, bad levels).
    #[error("malformed payload from {endpoint}: {reason}")]
    Malformed {
        /// Upstream host.
        endpoint: &'static str,
        /// What was wrong with the payload.
        reason: String,
    },
}

impl FetchError {
    /// Whether the failure was a request timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Request { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}
