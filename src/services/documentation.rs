//! OpenAPI document assembly.

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the dclone bot HTTP surface.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::status::status,
        crate::routes::commands::receive_message,
        crate::routes::sse::alert_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::status::StatusResponse,
            crate::dto::status::PartitionStatus,
            crate::dto::command::InboundMessage,
            crate::dto::command::CommandReply,
            crate::dto::sse::Handshake,
            crate::dto::sse::AlertKind,
            crate::dto::sse::ProgressAlertEvent,
            crate::dto::sse::WalkAlertEvent,
            crate::dto::sse::SystemStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "status", description = "Tracked progress per partition"),
        (name = "chat", description = "Inbound chat bridge"),
        (name = "sse", description = "Server-sent alert stream"),
    )
)]
/// OpenAPI document for the HTTP surface.
pub struct ApiDoc;
