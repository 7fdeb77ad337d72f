//! REST clients for the external platforms.
//!
//! - [`youtube::YouTubeClient`] - search, playlist creation and item insertion
//! - [`spotify::SpotifyClient`] - recommendations, playlist creation and track insertion
//!
//! Every upstream response is decoded into a typed struct at this boundary;
//! failures become a [`PlatformError`] that keeps the upstream status and
//! message so they can be passed through to the caller.

pub mod spotify;
pub mod youtube;

use serde::Deserialize;
use thiserror::Error;

/// Error type for calls to an external platform.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// The platform could not be reached.
    #[error("network error: {message}")]
    Network { message: String },

    /// The platform answered with a non-success status.
    #[error("upstream returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The platform answered with an unexpected body.
    #[error("invalid upstream response: {message}")]
    InvalidResponse { message: String },

    /// A search response carried no item list at all.
    #[error("no results found")]
    NoResults,

    /// The client is missing configuration needed for the call.
    #[error("not configured: {message}")]
    NotConfigured { message: String },
}

impl PlatformError {
    /// Upstream HTTP status, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            PlatformError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PlatformError::InvalidResponse {
                message: e.to_string(),
            }
        } else {
            PlatformError::Network {
                message: e.to_string(),
            }
        }
    }
}

/// `{"error": {"message": ...}}`, the shape both platforms use for failures.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed { message: String },
    Plain(String),
}

/// Decode a successful JSON body, or turn a failed response into a [`PlatformError`].
pub(crate) async fn decode<T>(response: reqwest::Response) -> Result<T, PlatformError>
where
    T: serde::de::DeserializeOwned,
{
    let response = check(response).await?;
    Ok(response.json::<T>().await?)
}

/// Pass a successful response through, or turn a failed one into a [`PlatformError`].
pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(ErrorEnvelope {
            error: ErrorBody::Detailed { message },
        }) => message,
        Ok(ErrorEnvelope {
            error: ErrorBody::Plain(message),
        }) => message,
        Err(_) if body.is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => body,
    };

    Err(PlatformError::Api {
        status: status.as_u16(),
        message,
    })
}
