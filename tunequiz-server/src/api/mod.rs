//! HTTP API for the playlist wizard.
//!
//! - [`handlers`] - quiz, search, recommendations and playlist creation
//! - [`auth`] - sign-in, callback, session and sign-out

pub mod auth;
pub mod cookies;
pub mod error;
pub mod handlers;
pub mod state;
pub mod types;

pub use error::ApiError;
pub use state::AppState;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/quiz", get(handlers::quiz_questions))
        .route("/api/youtube/search", get(handlers::search))
        .route("/api/get-recommendations", post(handlers::recommendations))
        .route("/api/create-playlist", post(handlers::create_playlist))
        .route("/api/auth/signin/{provider}", get(auth::signin))
        .route("/api/auth/callback/{provider}", get(auth::callback))
        .route("/api/auth/session", get(auth::session))
        .route("/api/auth/signout", post(auth::signout))
        .with_state(Arc::new(state))
}
