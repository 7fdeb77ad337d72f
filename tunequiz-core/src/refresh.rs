//! Access token refresh.
//!
//! [`refresh_access_token`] is the only place a session record is renewed.
//! The outbound call sits behind the [`TokenRefresher`] trait so the
//! transition logic can be driven without a network.
//!
//! Refresh failures never escape this module as errors: the record is
//! returned with a [`SessionErrorTag`] instead, and the session callback
//! decides what the caller sees.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::provider::ProviderConfig;
use crate::store::Secret;
use crate::token::{SessionErrorTag, SessionTokenRecord};

/// Error type for a single refresh attempt.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The token endpoint could not be reached.
    #[error("network error: {message}")]
    Network { message: String },

    /// The token endpoint answered with a non-success status.
    #[error("token endpoint returned {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The response body lacked a required field.
    #[error("token response missing `{field}`")]
    MissingField { field: &'static str },

    /// The response body was not the expected JSON.
    #[error("invalid token response: {message}")]
    InvalidResponse { message: String },
}

/// Tokens returned by a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    pub access_token: Secret,
    pub expires_in: Duration,
    /// Present only when the provider rotated the refresh token.
    pub refresh_token: Option<Secret>,
}

/// Raw token endpoint body. Every field is optional until validated.
#[derive(Debug, Deserialize)]
pub struct TokenEndpointResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl TokenEndpointResponse {
    /// Validate the body into [`RefreshedTokens`].
    pub fn into_refreshed(self) -> Result<RefreshedTokens, RefreshError> {
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(RefreshError::MissingField {
                field: "access_token",
            })?;
        let expires_in = self.expires_in.ok_or(RefreshError::MissingField {
            field: "expires_in",
        })?;

        let expires_in =
            Duration::try_seconds(expires_in).ok_or_else(|| RefreshError::InvalidResponse {
                message: format!("expires_in out of range: {}", expires_in),
            })?;

        Ok(RefreshedTokens {
            access_token: Secret::new(access_token),
            expires_in,
            refresh_token: self
                .refresh_token
                .filter(|t| !t.is_empty())
                .map(Secret::new),
        })
    }
}

/// Exchanges a refresh token for a new access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Perform exactly one refresh request.
    async fn refresh(&self, refresh_token: &Secret) -> Result<RefreshedTokens, RefreshError>;
}

/// [`TokenRefresher`] that posts to a provider's OAuth token endpoint.
pub struct HttpTokenRefresher {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: Option<Secret>,
}

impl HttpTokenRefresher {
    /// Create a refresher for the given token endpoint.
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: Option<Secret>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret,
        }
    }

    /// Create a refresher from a provider configuration.
    pub fn for_provider(
        config: &ProviderConfig,
        client_id: impl Into<String>,
        client_secret: Option<Secret>,
    ) -> Self {
        Self::new(config.token_url.clone(), client_id, client_secret)
    }

    /// Use a shared HTTP client.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &Secret) -> Result<RefreshedTokens, RefreshError> {
        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose()),
            ("client_id", self.client_id.as_str()),
        ];
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.expose()));
        }

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| RefreshError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| RefreshError::Network {
            message: e.to_string(),
        })?;

        let parsed = serde_json::from_str::<TokenEndpointResponse>(&body);

        if !status.is_success() {
            let message = match parsed {
                Ok(TokenEndpointResponse {
                    error_description: Some(description),
                    ..
                }) => description,
                Ok(TokenEndpointResponse {
                    error: Some(error), ..
                }) => error,
                _ => body,
            };
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        parsed
            .map_err(|e| RefreshError::InvalidResponse {
                message: e.to_string(),
            })?
            .into_refreshed()
    }
}

/// Renew an expired record.
///
/// - No refresh token: no call is made, the record is tagged
///   [`SessionErrorTag::RefreshTokenMissing`].
/// - Refresh fails: the original record is returned tagged
///   [`SessionErrorTag::RefreshAccessTokenError`], its access token untouched.
/// - Refresh succeeds: new access token, `expires_at = now + expires_in`, the
///   refresh token replaced only if a new one was issued, error tag cleared.
pub async fn refresh_access_token<R>(
    record: SessionTokenRecord,
    now: DateTime<Utc>,
    refresher: &R,
) -> SessionTokenRecord
where
    R: TokenRefresher + ?Sized,
{
    let Some(refresh_token) = record.refresh_token.clone() else {
        tracing::warn!(
            "Access token for {} expired and no refresh token is available",
            record.user.id
        );
        return record.with_error(SessionErrorTag::RefreshTokenMissing);
    };

    let refreshed = refresher.refresh(&refresh_token).await.and_then(|refreshed| {
        let lifetime = refreshed.expires_in;
        match now.checked_add_signed(lifetime) {
            Some(expires_at) => Ok((refreshed, expires_at)),
            None => Err(RefreshError::InvalidResponse {
                message: format!("expires_in of {} overflows the expiry", lifetime),
            }),
        }
    });

    match refreshed {
        Ok((refreshed, expires_at)) => {
            tracing::info!("Refreshed {} access token for {}", record.platform, record.user.id);
            SessionTokenRecord {
                access_token: refreshed.access_token,
                expires_at,
                refresh_token: refreshed.refresh_token.or(Some(refresh_token)),
                last_error: None,
                ..record
            }
        }
        Err(e) => {
            tracing::warn!(
                "Failed to refresh {} access token for {}: {}",
                record.platform,
                record.user.id,
                e
            );
            record.with_error(SessionErrorTag::RefreshAccessTokenError)
        }
    }
}
