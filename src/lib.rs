//! Library crate for dclone-bot, exposing modules for binaries and integration tests.

pub mod config;
mod dto;
mod error;
pub mod notify;
pub mod routes;
pub mod services;
pub mod state;
pub mod upstream;
