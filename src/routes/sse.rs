//! Alert stream route.

use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/alerts",
    tag = "sse",
    responses((status = 200, description = "Alert SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream every alert rendered for chat.
pub async fn alert_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_alerts(&state);
    info!(
        subscribers = state.alerts().subscriber_count(),
        "new alert SSE connection"
    );
    sse_service::to_sse_stream(sse_service::handshake(&state), receiver)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/alerts", get(alert_stream))
}
