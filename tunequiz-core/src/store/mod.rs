//! Secret wrapper and session token storage.
//!
//! This module provides:
//! - [`Secret`] - A wrapper for sensitive values that prevents accidental logging
//! - [`SessionStore`] - Trait for session record backends
//! - [`MemorySessionStore`] - In-process implementation
//!
//! One [`SessionTokenRecord`] is held per [`SessionId`]. Saving a record for
//! an existing session replaces it; records are never duplicated.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::model::SessionId;
use crate::token::SessionTokenRecord;

mod memory;

pub use memory::MemorySessionStore;

/// A secret value that prevents accidental exposure in logs.
///
/// The inner value is only accessible via [`expose()`](Secret::expose).
/// Debug and Display implementations show `[REDACTED]` instead of the value,
/// and the buffer is zeroed when dropped.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Create a new secret from a string value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret value.
    ///
    /// Use sparingly and never log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the secret holds an empty (or whitespace-only) value.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Secret {}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Error type for session store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage backend encountered an error.
    #[error("backend error: {message}")]
    BackendError { message: String },
}

/// Abstraction over session record backends.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Retrieve the record for a session.
    ///
    /// Returns `Ok(None)` if the session is unknown.
    async fn load(&self, session: &SessionId) -> Result<Option<SessionTokenRecord>, StoreError>;

    /// Store the record for a session, replacing any previous one.
    async fn save(&self, session: &SessionId, record: SessionTokenRecord) -> Result<(), StoreError>;

    /// Forget a session.
    ///
    /// Returns `Ok(())` even if the session didn't exist.
    async fn remove(&self, session: &SessionId) -> Result<(), StoreError>;

    /// Forget every session whose access token expired before `cutoff`.
    ///
    /// Returns the number of sessions removed.
    async fn prune_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;

    /// Check if a session exists without cloning its record.
    async fn contains(&self, session: &SessionId) -> Result<bool, StoreError> {
        Ok(self.load(session).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_debug_redacted() {
        let secret = Secret::new("super-secret");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_secret_display_redacted() {
        let secret = Secret::new("super-secret");
        let display = format!("{}", secret);
        assert!(!display.contains("super-secret"));
        assert!(display.contains("REDACTED"));
    }

    #[test]
    fn test_secret_serializes_transparently() {
        let json = serde_json::to_string(&Secret::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }

    #[test]
    fn test_secret_is_blank() {
        assert!(Secret::new("  ").is_blank());
        assert!(!Secret::new("t").is_blank());
    }
}
