//! Tunequiz Server Library
//!
//! This library exposes the HTTP API, configuration and server lifecycle
//! for testing and embedding.

pub mod api;
pub mod config;
pub mod server;

pub use api::{ApiError, AppState, build_router};
pub use config::{ServerConfig, load_config};
pub use server::{ServerHandle, start_server};
