//! Tracked progress route.

use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::status::StatusResponse, state::SharedState};

/// Read-only view of the tracked partitions.
pub fn router() -> Router<SharedState> {
    Router::new().route("/status", get(status))
}

#[utoipa::path(
    get,
    path = "/status",
    tag = "status",
    responses((status = 200, description = "Confirmed level and recent reports per partition", body = StatusResponse))
)]
/// Return the confirmed level and held reports of every partition.
pub async fn status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let tracker = state.tracker().lock().await;
    Json(StatusResponse::from_tracker(
        &tracker,
        &state.config().filter,
        state.policy().threshold(),
        state.is_degraded(),
    ))
}
