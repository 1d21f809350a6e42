//! Discord REST implementation of [`NotificationSink`](super::NotificationSink).

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::{Client, Method, Response, StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::upstream::USER_AGENT;

use super::{
    ChannelId, ChannelInfo, NotificationSink,
    error::{NotifyResult, NotifySendError},
};

/// Discord refuses message content longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Posts messages through the Discord REST API with a bot token.
#[derive(Clone)]
pub struct DiscordSink {
    client: Client,
    base_url: Arc<str>,
    token: Arc<str>,
}

#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct RateLimitBody {
    retry_after: f64,
}

impl DiscordSink {
    /// Build a sink against `base_url` authenticating with the bot `token`.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> NotifyResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| NotifySendError::ClientBuilder { source })?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            token: Arc::from(token.into()),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        self.client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bot {}", self.token))
            .header(header::USER_AGENT, USER_AGENT)
    }

    /// Look up `channel`, failing when the bot cannot see it.
    pub async fn channel(&self, channel: ChannelId) -> NotifyResult<ChannelInfo> {
        let response = self
            .request(Method::GET, &format!("channels/{channel}"))
            .send()
            .await
            .map_err(|source| NotifySendError::Request { channel, source })?;

        let response = check_status(channel, response).await?;
        response
            .json::<ChannelInfo>()
            .await
            .map_err(|source| NotifySendError::Decode { channel, source })
    }

    /// Post `content` to `channel`, truncated to the platform limit.
    pub async fn post_message(&self, channel: ChannelId, content: &str) -> NotifyResult<()> {
        let content = truncate_chars(content, MAX_MESSAGE_CHARS);
        let response = self
            .request(Method::POST, &format!("channels/{channel}/messages"))
            .json(&CreateMessage { content })
            .send()
            .await
            .map_err(|source| NotifySendError::Request { channel, source })?;

        check_status(channel, response).await?;
        debug!(%channel, chars = content.chars().count(), "message delivered");
        Ok(())
    }
}

impl NotificationSink for DiscordSink {
    fn ready(&self, channel: ChannelId) -> BoxFuture<'static, NotifyResult<ChannelInfo>> {
        let sink = self.clone();
        Box::pin(async move { sink.channel(channel).await })
    }

    fn send(&self, channel: ChannelId, text: String) -> BoxFuture<'static, NotifyResult<()>> {
        let sink = self.clone();
        Box::pin(async move { sink.post_message(channel, &text).await })
    }
}

async fn check_status(channel: ChannelId, response: Response) -> NotifyResult<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::TOO_MANY_REQUESTS => {
            let header_hint = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<f64>().ok());
            let body_hint = response
                .json::<RateLimitBody>()
                .await
                .ok()
                .map(|body| body.retry_after);
            Err(NotifySendError::RateLimited {
                channel,
                retry_after_secs: body_hint.or(header_hint).unwrap_or(1.0),
            })
        }
        status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND) => {
            Err(NotifySendError::Rejected { channel, status })
        }
        status => Err(NotifySendError::Status { channel, status }),
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
