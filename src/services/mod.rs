//! Application services driven by the scheduler and the routes.

/// Chat command handling.
pub mod command_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Chat message rendering.
pub mod messages;
/// Progress polling and alert evaluation.
pub mod progress_service;
/// Startup sequencing and periodic tasks.
pub mod scheduler;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming service.
pub mod sse_service;
/// Planned-walk polling.
pub mod walk_service;

#[cfg(test)]
mod test_support;
