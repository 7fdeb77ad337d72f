//! Sign-in routes and session resolution.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tunequiz_core::{
    LifecycleState, Platform, SessionError, SessionId, SessionTokenRecord, Transition,
    session_callback, token_callback,
};
use uuid::Uuid;

use super::cookies;
use super::error::ApiError;
use super::state::{AppState, PendingAuthorization};
use super::types::{CallbackParams, SessionResponse};

fn parse_platform(provider: &str) -> Result<Platform, ApiError> {
    provider
        .parse()
        .map_err(|_| ApiError::UnknownProvider(provider.to_string()))
}

/// Run the token callback for the session named by the cookie.
///
/// The record is written back whenever the callback changed it, so a
/// refreshed (or newly errored) record replaces the old one in place.
/// Expired records are refreshed under the session's refresh lock.
pub(super) async fn current_record(
    state: &AppState,
    jar: &CookieJar,
) -> Result<(SessionId, SessionTokenRecord), ApiError> {
    let session_id = cookies::get_session_id(jar).ok_or(SessionError::Unauthenticated)?;
    let record = load_record(state, &session_id).await?;
    if !record.is_expired_at(Utc::now()) {
        return Ok((session_id, record));
    }

    let session_lock = state.refresh_locks.lock_for(&session_id);
    let result: Result<SessionTokenRecord, ApiError> = async {
        let _guard = session_lock.lock().await;
        // another request may have refreshed while we waited
        let record = load_record(state, &session_id).await?;
        advance_record(state, &session_id, record).await
    }
    .await;
    drop(session_lock);
    state.refresh_locks.release(&session_id);

    result.map(|record| (session_id, record))
}

async fn load_record(
    state: &AppState,
    session_id: &SessionId,
) -> Result<SessionTokenRecord, ApiError> {
    Ok(state
        .sessions
        .load(session_id)
        .await?
        .ok_or(SessionError::Unauthenticated)?)
}

async fn advance_record(
    state: &AppState,
    session_id: &SessionId,
    record: SessionTokenRecord,
) -> Result<SessionTokenRecord, ApiError> {
    let refresher = state
        .refreshers
        .get(&record.platform)
        .ok_or_else(|| ApiError::ProviderNotConfigured(record.platform.to_string()))?;

    let outcome = token_callback(Some(record), None, Utc::now(), refresher.as_ref()).await;
    let record = outcome.record.ok_or(SessionError::Unauthenticated)?;

    match outcome.transition {
        Transition::Refreshed | Transition::Errored(_) => {
            state.sessions.save(session_id, record.clone()).await?;
        }
        Transition::Unchanged | Transition::Issued | Transition::Unauthenticated => {}
    }

    Ok(record)
}

/// `GET /api/auth/signin/{provider}`
pub async fn signin(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
) -> Result<Redirect, ApiError> {
    let platform = parse_platform(&provider)?;
    let flow = state
        .flows
        .get(&platform)
        .ok_or_else(|| ApiError::ProviderNotConfigured(platform.to_string()))?;

    let request = flow.authorize_url(&[]);
    state.pending.insert(
        request.csrf_state,
        PendingAuthorization {
            platform,
            pkce_verifier: request.pkce_verifier,
            started_at: Utc::now(),
        },
    );

    tracing::debug!(%platform, "Redirecting to provider for sign-in");
    Ok(Redirect::to(&request.url))
}

/// `GET /api/auth/callback/{provider}`
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    let platform = parse_platform(&provider)?;

    if let Some(error) = &params.error {
        let desc = params.error_description.as_deref().unwrap_or("unknown error");
        tracing::warn!(%platform, error = %error, description = %desc, "Provider denied sign-in");
        return Err(ApiError::bad_request(format!("sign-in denied: {}", desc)));
    }

    let code = params
        .code
        .ok_or_else(|| ApiError::bad_request("missing authorization code"))?;
    let csrf_state = params
        .state
        .ok_or_else(|| ApiError::bad_request("missing state"))?;

    let pending = state
        .pending
        .take(&csrf_state, Utc::now())
        .filter(|p| p.platform == platform)
        .ok_or_else(|| {
            tracing::warn!(%platform, "OAuth state mismatch");
            ApiError::bad_request("state mismatch")
        })?;

    let flow = state
        .flows
        .get(&platform)
        .ok_or_else(|| ApiError::ProviderNotConfigured(platform.to_string()))?;
    let refresher = state
        .refreshers
        .get(&platform)
        .ok_or_else(|| ApiError::ProviderNotConfigured(platform.to_string()))?;

    let grant = flow.exchange_code(&code, &pending.pkce_verifier).await?;

    // a new grant replaces whatever session the browser held before
    if let Some(previous) = cookies::get_session_id(&jar) {
        state.sessions.remove(&previous).await?;
    }

    let outcome = token_callback(None, Some(grant), Utc::now(), refresher.as_ref()).await;
    let record = outcome.record.ok_or(SessionError::Unauthenticated)?;

    let session_id = SessionId::new(Uuid::new_v4().to_string());
    state.sessions.save(&session_id, record).await?;

    let cutoff = Utc::now() - Duration::days(cookies::SESSION_MAX_AGE_DAYS);
    let pruned = state.sessions.prune_expired_before(cutoff).await?;
    if pruned > 0 {
        tracing::debug!(pruned, "Pruned idle sessions");
    }

    let jar = jar.add(cookies::session_cookie(&session_id, state.secure_cookies));
    Ok((jar, Redirect::to("/")))
}

/// `GET /api/auth/session`
pub async fn session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<SessionResponse>, ApiError> {
    let (_, record) = current_record(&state, &jar).await?;
    let now = Utc::now();
    let session = session_callback(&record)?;

    Ok(Json(SessionResponse {
        session,
        platform: record.platform,
        expires_at: record.expires_at.to_rfc3339(),
        state: LifecycleState::of(Some(&record), now),
    }))
}

/// `POST /api/auth/signout`
pub async fn signout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    if let Some(session_id) = cookies::get_session_id(&jar) {
        state.sessions.remove(&session_id).await?;
        tracing::info!("Session signed out");
    }
    Ok((cookies::clear_session_cookie(jar), StatusCode::NO_CONTENT))
}
