//! Session callback chain.
//!
//! Two hooks drive the token lifecycle of a session:
//!
//! - [`token_callback`] runs on every request that touches the session. It
//!   issues a record from a fresh [`Grant`], keeps a valid record untouched, or
//!   refreshes an expired one before returning.
//! - [`session_callback`] turns a record into the [`Session`] handed to the UI
//!   layer, and refuses to do so for a record carrying an error tag.
//!
//! ```text
//! Unauthenticated -> Issued -> Valid -> Expired -> Refreshing -> Valid
//!                                                            \-> Errored
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::UserIdentity;
use crate::refresh::{TokenRefresher, refresh_access_token};
use crate::store::Secret;
use crate::token::{Grant, SessionErrorTag, SessionTokenRecord};

/// Errors raised when materializing the externally visible session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No record exists for the session.
    #[error("not authenticated")]
    Unauthenticated,

    /// The record exists but its token cannot be used; re-authentication is required.
    #[error("session requires re-authentication: {tag}")]
    Errored { tag: SessionErrorTag },
}

impl SessionError {
    /// Tag reported to the UI layer in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Unauthenticated => "Unauthenticated",
            SessionError::Errored { tag } => tag.as_str(),
        }
    }
}

/// The session object visible to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: Secret,
    pub user: UserIdentity,
}

/// Observable lifecycle state of a session at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleState {
    Unauthenticated,
    Valid,
    Expired,
    Errored,
}

impl LifecycleState {
    /// Classify a (possibly absent) record at `now`.
    pub fn of(record: Option<&SessionTokenRecord>, now: DateTime<Utc>) -> Self {
        match record {
            None => LifecycleState::Unauthenticated,
            Some(r) if r.last_error.is_some() => LifecycleState::Errored,
            Some(r) if r.is_expired_at(now) => LifecycleState::Expired,
            Some(_) => LifecycleState::Valid,
        }
    }
}

/// What a [`token_callback`] invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No grant and no record.
    Unauthenticated,
    /// A new record was built from a grant.
    Issued,
    /// The record was still valid and returned as-is.
    Unchanged,
    /// The record was expired and has been refreshed.
    Refreshed,
    /// The record was expired and could not be refreshed.
    Errored(SessionErrorTag),
}

/// Result of a [`token_callback`] invocation.
#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    pub record: Option<SessionTokenRecord>,
    pub transition: Transition,
}

/// Advance a session's token record.
///
/// - `grant` present: a brand-new record is built, any prior one discarded.
/// - no grant and no record: stays unauthenticated.
/// - `now < expires_at`: the record is returned unchanged, no outbound call.
/// - `now >= expires_at`: the refresh procedure runs before returning.
pub async fn token_callback<R>(
    current: Option<SessionTokenRecord>,
    grant: Option<Grant>,
    now: DateTime<Utc>,
    refresher: &R,
) -> CallbackOutcome
where
    R: TokenRefresher + ?Sized,
{
    if let Some(grant) = grant {
        tracing::info!("Issuing {} session for {}", grant.platform, grant.user.id);
        return CallbackOutcome {
            record: Some(SessionTokenRecord::from_grant(grant, now)),
            transition: Transition::Issued,
        };
    }

    let Some(record) = current else {
        return CallbackOutcome {
            record: None,
            transition: Transition::Unauthenticated,
        };
    };

    if !record.is_expired_at(now) {
        tracing::debug!("Using cached {} access token for {}", record.platform, record.user.id);
        return CallbackOutcome {
            record: Some(record),
            transition: Transition::Unchanged,
        };
    }

    tracing::info!(
        "Access token for {} expired at {}, attempting refresh",
        record.user.id,
        record.expires_at
    );

    let record = refresh_access_token(record, now, refresher).await;
    let transition = match record.last_error {
        Some(tag) => Transition::Errored(tag),
        None => Transition::Refreshed,
    };

    CallbackOutcome {
        record: Some(record),
        transition,
    }
}

/// Materialize the externally visible session.
///
/// Fails for any record carrying an error tag, so callers never receive a
/// session that looks authenticated while holding a dead token.
pub fn session_callback(record: &SessionTokenRecord) -> Result<Session, SessionError> {
    if let Some(tag) = record.last_error {
        return Err(SessionError::Errored { tag });
    }

    Ok(Session {
        access_token: record.access_token.clone(),
        user: record.user.clone(),
    })
}
