//! Payloads mirrored on the alert stream.

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::partition::{Core, Ladder, Partition, ProgressLevel, Region};

#[derive(Clone, Debug)]
/// Dispatched payload carried across the alert stream.
pub struct ServerEvent {
    /// SSE event name.
    pub event: Option<String>,
    /// JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an alert stream client when it connects.
pub struct Handshake {
    /// Greeting shown to the client.
    pub message: String,
    /// Whether the most recent status poll failed.
    pub degraded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
/// Kind of alert sent to chat.
pub enum AlertKind {
    /// Confirmed level rose past the threshold.
    Progressed,
    /// Confirmed level dropped back to baseline.
    Spawned,
}

#[derive(Debug, Serialize, ToSchema)]
/// Mirrors a progress or spawn alert that was rendered for chat.
pub struct ProgressAlertEvent {
    /// Which alert fired.
    pub kind: AlertKind,
    /// Partition the alert is about.
    pub partition: Partition,
    /// New confirmed level.
    #[schema(value_type = u8, minimum = 1, maximum = 6)]
    pub level: ProgressLevel,
    /// Confirmed level before the alert.
    #[schema(value_type = u8, minimum = 1, maximum = 6)]
    pub previous: ProgressLevel,
    /// Unix seconds of the triggering report.
    pub reported_at: i64,
    /// Upstream reporter, when known.
    pub reporter_id: Option<String>,
    /// Text posted to chat.
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Mirrors a planned walk alert that was rendered for chat.
pub struct WalkAlertEvent {
    /// Walk identifier.
    pub id: String,
    /// `None` while the region is still to be decided.
    pub region: Option<Region>,
    /// Ladder mode of the walk.
    pub ladder: Ladder,
    /// Hardcore or softcore.
    pub core: Core,
    /// Unix seconds of the planned start.
    pub starts_at: i64,
    /// Who submitted the walk.
    pub reported_by: String,
    /// Whether the walk was confirmed by the site.
    pub confirmed: bool,
    /// Text posted to chat.
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the status poll starts or stops failing.
pub struct SystemStatus {
    /// Whether the most recent status poll failed.
    pub degraded: bool,
}
