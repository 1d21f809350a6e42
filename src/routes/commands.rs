//! Inbound chat bridge.

use axum::{Json, Router, extract::State, routing::post};
use axum_valid::Valid;

use crate::{
    dto::command::{CommandReply, InboundMessage},
    error::AppError,
    services::command_service,
    state::SharedState,
};

/// Inbound chat bridge.
pub fn router() -> Router<SharedState> {
    Router::new().route("/chat/messages", post(receive_message))
}

#[utoipa::path(
    post,
    path = "/chat/messages",
    tag = "chat",
    request_body = InboundMessage,
    responses(
        (status = 200, description = "Message processed", body = CommandReply),
        (status = 400, description = "Invalid message")
    )
)]
/// Handle a chat message, replying in its channel when it is a status command.
pub async fn receive_message(
    State(state): State<SharedState>,
    Valid(Json(message)): Valid<Json<InboundMessage>>,
) -> Result<Json<CommandReply>, AppError> {
    let reply = command_service::handle_message(&state, message).await?;
    Ok(Json(reply))
}
