//! # Tunequiz Core
//!
//! Core library for the Tunequiz playlist wizard.
//!
//! This crate provides:
//! - The session token lifecycle: issuance, expiry check, silent refresh
//!   and error propagation
//! - Authorization-code grant issuance for YouTube (Google) and Spotify
//! - The playlist write proxy: create a playlist, then attach items
//! - The quiz catalogue and playlist search sources
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tunequiz_core::{session, HttpTokenRefresher, ProviderConfig, SessionTokenRecord};
//!
//! async fn current_session(record: Option<SessionTokenRecord>) {
//!     let refresher = HttpTokenRefresher::for_provider(&ProviderConfig::spotify(), "client-id", None);
//!     let outcome = session::token_callback(record, None, chrono::Utc::now(), &refresher).await;
//!     if let Some(record) = outcome.record {
//!         let visible = session::session_callback(&record);
//!     }
//! }
//! ```

pub mod model;
pub mod oauth;
pub mod platform;
pub mod playlist;
pub mod provider;
pub mod quiz;
pub mod refresh;
pub mod search;
pub mod session;
pub mod store;
pub mod token;

// Re-export commonly used types at crate root
pub use model::{Platform, SessionId, UserIdentity};

pub use store::{MemorySessionStore, Secret, SessionStore, StoreError};

pub use token::{Grant, SessionErrorTag, SessionTokenRecord};

pub use refresh::{HttpTokenRefresher, RefreshError, TokenRefresher, refresh_access_token};

pub use session::{
    CallbackOutcome, LifecycleState, Session, SessionError, Transition, session_callback,
    token_callback,
};

pub use provider::ProviderConfig;

pub use playlist::{
    CreatedPlaylist, PartialWrite, PlaylistError, PlaylistRequest, PlaylistWriter,
    create_playlist_with_items,
};

pub use platform::PlatformError;

pub use search::{PlaylistSearch, SearchQuery, SearchResult, StaticCatalog};

pub use quiz::QuizAnswers;
