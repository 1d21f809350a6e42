//! Chat platform glue: the only capabilities the core needs are "is the channel reachable"
//! and "send this text to that channel".

pub mod discord;
pub mod error;

use std::{fmt, str::FromStr};

use futures::future::BoxFuture;
use serde::Deserialize;

pub use self::discord::DiscordSink;
pub use self::error::{NotifyResult, NotifySendError};

/// Chat channel identifier (a Discord snowflake).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChannelId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ChannelId)
    }
}

/// Channel metadata returned by the readiness probe.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelInfo {
    /// Channel name, absent for direct messages.
    #[serde(default)]
    pub name: Option<String>,
    /// Server the channel belongs to.
    #[serde(default)]
    pub guild_id: Option<String>,
}

/// Outbound chat capability.
pub trait NotificationSink: Send + Sync {
    /// Confirm that `channel` exists and the bot may post there.
    fn ready(&self, channel: ChannelId) -> BoxFuture<'static, NotifyResult<ChannelInfo>>;
    /// Post `text` to `channel`.
    fn send(&self, channel: ChannelId, text: String) -> BoxFuture<'static, NotifyResult<()>>;
}
