//! Health check payload.

use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok`, or `degraded` while status polls are failing.
    pub status: String,
    /// Whether planned-walk alerts are configured.
    pub walk_alerts: bool,
}

impl HealthResponse {
    /// Build the payload from the degraded flag.
    pub fn new(degraded: bool, walk_alerts: bool) -> Self {
        let status = if degraded { "degraded" } else { "ok" };
        Self {
            status: status.to_string(),
            walk_alerts,
        }
    }
}
