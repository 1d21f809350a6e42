//! Wire representations of the upstream payloads and their conversion into domain types.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use time::{Duration, OffsetDateTime};

use crate::state::{
    partition::{Core, Ladder, Partition, ProgressLevel, Region},
    report::Report,
    walks::WalkEvent,
};

const TBD_REGION: &str = "TBD";

/// One entry of the status API response.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct RawStatusEntry {
    /// Region code, `1` to `3`.
    pub region: String,
    /// `1` ladder, `2` non-ladder.
    pub ladder: String,
    /// `1` hardcore, `2` softcore.
    pub hc: String,
    /// Level, sent as a string or a number.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub progress: u8,
    /// Unix seconds.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub timestamped: i64,
    /// Reporter identifier, string or number.
    #[serde(default, deserialize_with = "lenient_identifier")]
    pub reporter_id: Option<String>,
}

impl TryFrom<RawStatusEntry> for Report {
    type Error = String;

    fn try_from(raw: RawStatusEntry) -> Result<Self, Self::Error> {
        let region = Region::from_code(&raw.region)
            .ok_or_else(|| format!("unknown region code `{}`", raw.region))?;
        let ladder = Ladder::from_code(&raw.ladder)
            .ok_or_else(|| format!("unknown ladder code `{}`", raw.ladder))?;
        let core =
            Core::from_code(&raw.hc).ok_or_else(|| format!("unknown hc code `{}`", raw.hc))?;
        let level = ProgressLevel::new(raw.progress)
            .ok_or_else(|| format!("progress {} outside 1..=6", raw.progress))?;
        let reported_at = OffsetDateTime::from_unix_timestamp(raw.timestamped)
            .map_err(|err| format!("invalid timestamp {}: {err}", raw.timestamped))?;

        Ok(Report {
            partition: Partition::new(region, ladder, core),
            level,
            reported_at,
            reporter_id: raw.reporter_id,
        })
    }
}

/// Envelope returned by the walk API. Entries stay untyped so one bad walk cannot sink the rest.
#[derive(Debug, Deserialize)]
pub struct RawWalkResponse {
    /// Walk entries, decoded one by one.
    #[serde(default)]
    pub walks: Vec<Value>,
}

/// Decode and convert one entry of [`RawWalkResponse::walks`].
pub fn parse_walk(value: Value) -> Result<WalkEvent, String> {
    let raw: RawWalk = serde_json::from_value(value).map_err(|err| err.to_string())?;
    WalkEvent::try_from(raw)
}

/// One planned walk as submitted by the community.
#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWalk {
    /// Walk identifier.
    pub id: String,
    /// `Americas`, `Europe`, `Asia` or `TBD`.
    pub region: String,
    /// Ladder mode.
    pub ladder: bool,
    /// Hardcore mode.
    pub hardcore: bool,
    /// Unix milliseconds.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub timestamp: i64,
    /// Submitter name.
    pub display_name: String,
    /// Confirmation flag, false when missing.
    #[serde(default)]
    pub confirmed: bool,
}

impl TryFrom<RawWalk> for WalkEvent {
    type Error = String;

    fn try_from(raw: RawWalk) -> Result<Self, Self::Error> {
        let region = match raw.region.as_str() {
            TBD_REGION => None,
            name => Some(
                Region::from_name(name).ok_or_else(|| format!("unknown walk region `{name}`"))?,
            ),
        };
        let starts_at = OffsetDateTime::UNIX_EPOCH
            .checked_add(Duration::milliseconds(raw.timestamp))
            .ok_or_else(|| format!("invalid walk timestamp {}", raw.timestamp))?;

        Ok(WalkEvent {
            id: raw.id,
            region,
            ladder: Ladder::from_flag(raw.ladder),
            core: Core::from_flag(raw.hardcore),
            starts_at,
            reported_by: raw.display_name,
            confirmed: raw.confirmed,
        })
    }
}

/// Accept identifiers sent either as strings or as numbers; empty strings count as absent.
fn lenient_identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) if id.is_empty() => None,
        Some(Value::String(id)) => Some(id),
        Some(other) => Some(other.to_string()),
    })
}
