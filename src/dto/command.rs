//! DTO definitions for the inbound chat bridge.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::validate_snowflake;

/// A chat message forwarded by the gateway bridge.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct InboundMessage {
    /// Channel the message was posted in; replies go back there.
    #[validate(custom(function = "validate_snowflake"))]
    pub channel_id: String,
    /// Raw message text.
    #[validate(length(max = 4000))]
    pub content: String,
    /// Display name of the sender, for logs only.
    #[serde(default)]
    pub author: Option<String>,
}

/// What the bot did with an inbound message.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommandReply {
    /// Whether the message was a recognised command.
    pub handled: bool,
    /// Reply text sent back to the channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    /// Whether the chat platform accepted the reply.
    pub delivered: bool,
}

impl CommandReply {
    /// Reply for a message that is not a command.
    pub fn ignored() -> Self {
        Self {
            handled: false,
            reply: None,
            delivered: false,
        }
    }
}
