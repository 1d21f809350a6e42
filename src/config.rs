//! Environment-sourced runtime configuration, validated once at startup.

use std::{env, num::NonZeroUsize, time::Duration};

use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::{
    notify::ChannelId,
    state::partition::{Core, Ladder, PartitionFilter, ProgressLevel, Region},
};

const DISCORD_TOKEN_ENV: &str = "DCLONE_DISCORD_TOKEN";
const DISCORD_CHANNEL_ENV: &str = "DCLONE_DISCORD_CHANNEL_ID";
const DISCORD_API_ENV: &str = "DCLONE_DISCORD_API_URL";
const D2RW_TOKEN_ENV: &str = "DCLONE_D2RW_TOKEN";
const D2RW_CONTACT_ENV: &str = "DCLONE_D2RW_CONTACT";
const D2RW_API_ENV: &str = "DCLONE_D2RW_API_URL";
const STATUS_API_ENV: &str = "DCLONE_API_URL";
const REGION_ENV: &str = "DCLONE_REGION";
const LADDER_ENV: &str = "DCLONE_LADDER";
const HC_ENV: &str = "DCLONE_HC";
const THRESHOLD_ENV: &str = "DCLONE_THRESHOLD";
const REPORTS_ENV: &str = "DCLONE_REPORTS";
const POLL_INTERVAL_ENV: &str = "DCLONE_POLL_INTERVAL_SECS";
const WALK_POLL_INTERVAL_ENV: &str = "DCLONE_WALK_POLL_INTERVAL_SECS";

const DEFAULT_DISCORD_API: &str = "https://discord.com/api/v10";
const DEFAULT_STATUS_API: &str = "https://diablo2.io/dclone_api.php";
const DEFAULT_D2RW_API: &str = "https://d2runewizard.com/api/diablo-clone-progress/planned-walks";
const DEFAULT_THRESHOLD: u8 = 2;
const DEFAULT_REPORTS: usize = 3;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_PORT: u16 = 8080;

/// Timeout applied to every upstream and chat request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures while reading the configuration. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable `{var}`")]
    Missing {
        /// Environment variable name.
        var: &'static str,
    },
    /// A variable is set to something that cannot be parsed.
    #[error("invalid value `{value}` for `{var}`: {reason}")]
    Invalid {
        /// Environment variable name.
        var: &'static str,
        /// Raw value found.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// Parsed values are outside their allowed ranges.
    #[error("configuration out of range: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Chat platform credentials and target.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Bot token sent as `Authorization: Bot <token>`.
    pub token: String,
    /// Channel every alert is posted to.
    pub channel_id: ChannelId,
    /// REST API base URL.
    pub api_url: String,
}

/// Credentials for the planned-walk API. Walk alerts are disabled without them.
#[derive(Debug, Clone)]
pub struct WalkApiConfig {
    /// API token passed as the `token` query parameter.
    pub token: String,
    /// Operator contact sent in the `D2R-Contact` header.
    pub contact: String,
    /// Planned-walk endpoint.
    pub api_url: String,
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone, Validate)]
pub struct AppConfig {
    /// Chat platform settings.
    pub discord: DiscordConfig,
    /// `None` when walk alerts are disabled.
    pub walks: Option<WalkApiConfig>,
    /// Progress status endpoint.
    pub status_api_url: String,
    /// Partitions queried upstream.
    pub filter: PartitionFilter,
    /// Lowest level announced as progress.
    #[validate(range(min = 1, max = 6))]
    pub threshold: u8,
    /// Stabilization count `K`.
    #[validate(range(min = 1, max = 60))]
    pub reports: usize,
    /// Seconds between progress polls.
    #[validate(range(min = 1))]
    pub poll_interval_secs: u64,
    /// Seconds between planned-walk polls.
    #[validate(range(min = 1))]
    pub walk_poll_interval_secs: u64,
    /// HTTP listen port.
    pub port: u16,
}

impl AppConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load the configuration through `lookup`, which returns the raw value of a variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|value| value.trim().to_string());
        let non_empty = |key: &str| get(key).filter(|value| !value.is_empty());

        let token = non_empty(DISCORD_TOKEN_ENV).ok_or(ConfigError::Missing {
            var: DISCORD_TOKEN_ENV,
        })?;
        let raw_channel = non_empty(DISCORD_CHANNEL_ENV).ok_or(ConfigError::Missing {
            var: DISCORD_CHANNEL_ENV,
        })?;
        let channel_id = match raw_channel.parse::<ChannelId>() {
            Ok(ChannelId(0)) | Err(_) => {
                return Err(ConfigError::Invalid {
                    var: DISCORD_CHANNEL_ENV,
                    value: raw_channel,
                    reason: "expected a non-zero channel snowflake",
                });
            }
            Ok(channel_id) => channel_id,
        };

        let walks = match (non_empty(D2RW_TOKEN_ENV), non_empty(D2RW_CONTACT_ENV)) {
            (Some(token), Some(contact)) => Some(WalkApiConfig {
                token,
                contact,
                api_url: non_empty(D2RW_API_ENV).unwrap_or_else(|| DEFAULT_D2RW_API.into()),
            }),
            _ => None,
        };

        let filter = PartitionFilter {
            region: parse_mode(REGION_ENV, get(REGION_ENV), Region::from_code)?,
            ladder: parse_mode(LADDER_ENV, get(LADDER_ENV), Ladder::from_code)?,
            core: parse_mode(
                HC_ENV,
                Some(get(HC_ENV).unwrap_or_else(|| Core::Softcore.code().into())),
                Core::from_code,
            )?,
        };

        let config = Self {
            discord: DiscordConfig {
                token,
                channel_id,
                api_url: non_empty(DISCORD_API_ENV).unwrap_or_else(|| DEFAULT_DISCORD_API.into()),
            },
            walks,
            status_api_url: non_empty(STATUS_API_ENV).unwrap_or_else(|| DEFAULT_STATUS_API.into()),
            filter,
            threshold: parse_number(THRESHOLD_ENV, non_empty(THRESHOLD_ENV), DEFAULT_THRESHOLD)?,
            reports: parse_number(REPORTS_ENV, non_empty(REPORTS_ENV), DEFAULT_REPORTS)?,
            poll_interval_secs: parse_number(
                POLL_INTERVAL_ENV,
                non_empty(POLL_INTERVAL_ENV),
                DEFAULT_POLL_INTERVAL_SECS,
            )?,
            walk_poll_interval_secs: parse_number(
                WALK_POLL_INTERVAL_ENV,
                non_empty(WALK_POLL_INTERVAL_ENV),
                DEFAULT_POLL_INTERVAL_SECS,
            )?,
            port: resolve_port(non_empty("PORT").or_else(|| non_empty("SERVER_PORT")))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Threshold as a progress level.
    pub fn threshold_level(&self) -> ProgressLevel {
        ProgressLevel::new(self.threshold).unwrap_or(ProgressLevel::MAX)
    }

    /// Stabilization count as the tracker capacity.
    pub fn stabilization_count(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.reports).unwrap_or(NonZeroUsize::MIN)
    }

    /// Period of the progress polling task.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Period of the planned-walk task.
    pub fn walk_poll_interval(&self) -> Duration {
        Duration::from_secs(self.walk_poll_interval_secs)
    }
}

/// Parse an optional mode code where the empty string means "no filter".
fn parse_mode<T>(
    var: &'static str,
    raw: Option<String>,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(code) => parse(code).map(Some).ok_or_else(|| ConfigError::Invalid {
            var,
            value: code.to_string(),
            reason: "expected 1, 2, 3 or empty",
        }),
    }
}

fn parse_number<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            var,
            value,
            reason: "expected a positive integer",
        }),
    }
}

fn resolve_port(raw: Option<String>) -> Result<u16, ConfigError> {
    parse_number("PORT", raw, DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DCLONE_DISCORD_TOKEN", "token"),
        ("DCLONE_DISCORD_CHANNEL_ID", "123456789012345678"),
    ];

    #[test]
    fn applies_defaults() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.discord.channel_id, ChannelId(123456789012345678));
        assert_eq!(config.filter, PartitionFilter::default());
        assert_eq!(config.threshold, 2);
        assert_eq!(config.reports, 3);
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.port, 8080);
        assert!(config.walks.is_none());
        assert_eq!(config.status_api_url, DEFAULT_STATUS_API);
    }

    #[test]
    fn missing_credentials_are_fatal() {
        let err = load(&[("DCLONE_DISCORD_TOKEN", "token")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing {
                var: "DCLONE_DISCORD_CHANNEL_ID"
            }
        ));

        let err = load(&[("DCLONE_DISCORD_CHANNEL_ID", "1")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn zero_channel_is_invalid() {
        let err = load(&[("DCLONE_DISCORD_TOKEN", "t"), ("DCLONE_DISCORD_CHANNEL_ID", "0")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn empty_hc_means_all_modes() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([("DCLONE_HC", ""), ("DCLONE_REGION", "3"), ("DCLONE_LADDER", "1")]);
        let config = load(&vars).unwrap();

        assert_eq!(
            config.filter,
            PartitionFilter {
                region: Some(Region::Asia),
                ladder: Some(Ladder::Ladder),
                core: None,
            }
        );
    }

    #[test]
    fn rejects_unknown_mode_codes_and_out_of_range_numbers() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("DCLONE_REGION", "4"));
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { .. })));

        let mut vars = REQUIRED.to_vec();
        vars.push(("DCLONE_THRESHOLD", "7"));
        assert!(matches!(load(&vars), Err(ConfigError::Validation(_))));

        let mut vars = REQUIRED.to_vec();
        vars.push(("DCLONE_REPORTS", "0"));
        assert!(matches!(load(&vars), Err(ConfigError::Validation(_))));

        let mut vars = REQUIRED.to_vec();
        vars.push(("DCLONE_REPORTS", "three"));
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn walk_alerts_need_token_and_contact() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("DCLONE_D2RW_TOKEN", "secret"));
        assert!(load(&vars).unwrap().walks.is_none());

        vars.push(("DCLONE_D2RW_CONTACT", "ops@example.com"));
        let walks = load(&vars).unwrap().walks.unwrap();
        assert_eq!(walks.api_url, DEFAULT_D2RW_API);
    }
}
