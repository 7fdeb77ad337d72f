//! Session token records.
//!
//! This module provides:
//! - [`Grant`] - The outcome of a completed authorization handshake
//! - [`SessionTokenRecord`] - The one live token record of a session
//! - [`SessionErrorTag`] - Why a record can no longer be trusted

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Platform, UserIdentity};
use crate::store::Secret;

/// Error annotation carried by a degraded [`SessionTokenRecord`].
///
/// Serialized with the exact tag names the UI layer matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionErrorTag {
    /// A refresh was attempted and failed.
    RefreshAccessTokenError,
    /// The access token expired and no refresh token was ever issued.
    RefreshTokenMissing,
}

impl SessionErrorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionErrorTag::RefreshAccessTokenError => "RefreshAccessTokenError",
            SessionErrorTag::RefreshTokenMissing => "RefreshTokenMissing",
        }
    }
}

impl fmt::Display for SessionErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokens and identity handed back by a platform after authorization.
#[derive(Debug, Clone)]
pub struct Grant {
    /// Platform that issued the grant.
    pub platform: Platform,

    /// Freshly issued access token.
    pub access_token: Secret,

    /// Refresh token, if the platform issued one.
    pub refresh_token: Option<Secret>,

    /// Lifetime of the access token as reported by the platform.
    ///
    /// `None` makes the resulting record expire immediately, so the next
    /// callback invocation refreshes it.
    pub expires_in: Option<Duration>,

    /// Verified identity of the user.
    pub user: UserIdentity,

    /// The platform's own subject identifier for the user.
    pub provider_account_id: String,
}

/// The token state of one authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTokenRecord {
    /// Platform the tokens belong to.
    pub platform: Platform,

    /// Current access token. May be stale when `last_error` is set.
    pub access_token: Secret,

    /// Refresh token (if available).
    pub refresh_token: Option<Secret>,

    /// Instant at which the access token stops being valid.
    pub expires_at: DateTime<Utc>,

    /// Verified identity of the user.
    pub user: UserIdentity,

    /// The platform's own subject identifier for the user.
    pub provider_account_id: String,

    /// Set when the record could not be kept valid.
    pub last_error: Option<SessionErrorTag>,
}

impl SessionTokenRecord {
    /// Build a brand-new record from a grant issued at `now`.
    pub fn from_grant(grant: Grant, now: DateTime<Utc>) -> Self {
        let expires_at = match grant.expires_in {
            // an absurd lifetime is clamped rather than overflowing
            Some(lifetime) => now
                .checked_add_signed(lifetime)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            None => now,
        };

        Self {
            platform: grant.platform,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at,
            user: grant.user,
            provider_account_id: grant.provider_account_id,
            last_error: None,
        }
    }

    /// Whether the access token is expired at `now` (`now >= expires_at`).
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Expiry as milliseconds since the Unix epoch.
    pub fn expires_at_ms(&self) -> i64 {
        self.expires_at.timestamp_millis()
    }

    /// Return this record annotated with an error tag.
    pub fn with_error(mut self, tag: SessionErrorTag) -> Self {
        self.last_error = Some(tag);
        self
    }
}
