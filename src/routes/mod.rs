//! HTTP routes, merged into one router.

use axum::Router;

use crate::state::SharedState;

pub mod commands;
pub mod docs;
pub mod health;
pub mod sse;
pub mod status;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(status::router())
        .merge(commands::router())
        .merge(sse::router())
        .merge(docs::router());

    api_router.with_state(state)
}
