//! Request and response types of the HTTP surface.

pub mod command;
pub mod health;
pub mod sse;
pub mod status;
pub mod validation;
