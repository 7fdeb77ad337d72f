//! HTTP error responses.
//!
//! Every failure leaves the API as `{"error": <message>, "code": <tag>, ...}`
//! with 400 for invalid input, 401 for a missing or errored session and 500
//! for upstream failures.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use thiserror::Error;
use tunequiz_core::{
    PlatformError, PlaylistError, SessionError, StoreError,
    oauth::OAuthError,
    platform::spotify::RecommendationError,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("unknown provider `{0}`")]
    UnknownProvider(String),

    #[error("provider {0} is not configured")]
    ProviderNotConfigured(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("authorization failed: {0}")]
    OAuth(#[from] OAuthError),

    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    #[error("failed to fetch recommendations: {0}")]
    Recommendation(#[from] RecommendationError),

    #[error("search failed: {0}")]
    Search(PlatformError),

    #[error("session store failure: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } | ApiError::UnknownProvider(_) => StatusCode::BAD_REQUEST,
            ApiError::OAuth(OAuthError::MissingEmail | OAuthError::UnverifiedEmail { .. }) => {
                StatusCode::FORBIDDEN
            }
            ApiError::OAuth(_) => StatusCode::BAD_GATEWAY,
            ApiError::Session(_) => StatusCode::UNAUTHORIZED,
            ApiError::Playlist(PlaylistError::Validation { .. })
            | ApiError::Recommendation(RecommendationError::Validation { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ProviderNotConfigured(_)
            | ApiError::Playlist(_)
            | ApiError::Recommendation(_)
            | ApiError::Search(_)
            | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable tag for the `code` field.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } | ApiError::UnknownProvider(_) => "BadRequest",
            ApiError::ProviderNotConfigured(_) => "NotConfigured",
            ApiError::Session(e) => e.code(),
            ApiError::OAuth(_) => "AuthorizationError",
            ApiError::Playlist(e) => e.kind(),
            ApiError::Recommendation(RecommendationError::Validation { .. }) => "ValidationError",
            ApiError::Recommendation(_) | ApiError::Search(_) => "UpstreamError",
            ApiError::Store(_) => "InternalError",
        }
    }

    fn body(&self) -> Value {
        let mut body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });

        let upstream = match self {
            ApiError::Playlist(PlaylistError::Create(e))
            | ApiError::Recommendation(RecommendationError::Platform(e))
            | ApiError::Search(e) => e.status(),
            _ => None,
        };
        if let Some(status) = upstream {
            body["upstreamStatus"] = json!(status);
        }

        if let ApiError::Playlist(PlaylistError::Attach(partial)) = self {
            body["partial"] = json!(partial);
        }
        body
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunequiz_core::{SessionErrorTag, playlist::ItemFailure, playlist::PartialWrite};

    #[test]
    fn test_validation_is_bad_request() {
        let err = ApiError::from(PlaylistError::Validation { field: "items" });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body()["code"], "ValidationError");
    }

    #[test]
    fn test_errored_session_is_unauthorized() {
        let err = ApiError::from(SessionError::Errored {
            tag: SessionErrorTag::RefreshAccessTokenError,
        });
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.body()["code"], "RefreshAccessTokenError");
    }

    #[test]
    fn test_partial_write_body() {
        let err = ApiError::from(PlaylistError::Attach(PartialWrite {
            playlist_identifier: "PL1".to_string(),
            url: "https://www.youtube.com/playlist?list=PL1".to_string(),
            attached: 1,
            failures: vec![ItemFailure {
                item: "v2".to_string(),
                status: Some(404),
                message: "gone".to_string(),
            }],
        }));

        let body = err.body();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "UpstreamWriteError");
        assert_eq!(body["partial"]["playlistIdentifier"], "PL1");
        assert_eq!(body["partial"]["failures"][0]["item"], "v2");
    }

    #[test]
    fn test_upstream_status_passed_through() {
        let err = ApiError::from(PlaylistError::Create(PlatformError::Api {
            status: 403,
            message: "forbidden".to_string(),
        }));
        assert_eq!(err.body()["upstreamStatus"], 403);
    }
}
