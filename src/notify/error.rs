//! Error types for chat delivery.

use reqwest::StatusCode;
use thiserror::Error;

use super::ChannelId;

/// Convenient result alias returning [`NotifySendError`] failures.
pub type NotifyResult<T> = Result<T, NotifySendError>;

/// Failures while talking to the chat platform. Logged by callers, never retried in-tick.
#[derive(Debug, Error)]
pub enum NotifySendError {
    /// Building the HTTP client failed.
    #[error("failed to build chat client")]
    ClientBuilder {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or timed out.
    #[error("failed to reach chat platform for channel {channel}")]
    Request {
        /// Target channel.
        channel: ChannelId,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The platform asked us to slow down.
    #[error("rate limited on channel {channel}, retry after {retry_after_secs}s")]
    RateLimited {
        /// Target channel.
        channel: ChannelId,
        /// Seconds to wait before the next request.
        retry_after_secs: f64,
    },
    /// Token or channel were refused (401, 403 or 404).
    #[error("chat platform rejected access to channel {channel} ({status})")]
    Rejected {
        /// Target channel.
        channel: ChannelId,
        /// Status code returned.
        status: StatusCode,
    },
    /// Any other non-success status.
    #[error("unexpected chat platform status {status} for channel {channel}")]
    Status {
        /// Target channel.
        channel: ChannelId,
        /// Status code returned.
        status: StatusCode,
    },
    /// A response body could not be decoded.
    #[error("failed to decode chat platform response for channel {channel}")]
    Decode {
        /// Target channel.
        channel: ChannelId,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
}

impl NotifySendError {
    /// Whether retrying cannot help because the configuration itself is refused.
    pub fn is_fatal(&self) -> bool {
        matches!(self, NotifySendError::Rejected { .. })
    }
}
