//! API request/response types.

use serde::{Deserialize, Serialize};
use tunequiz_core::{LifecycleState, Platform, SearchResult, Session, quiz::Question};

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizResponse {
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub items: Vec<SearchResult>,
}

/// Body of `POST /api/create-playlist`.
///
/// `accessToken` and `userId` fall back to the signed-in session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePlaylistBody {
    pub platform: Option<Platform>,
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "trackUris", alias = "videoIds")]
    pub items: Vec<String>,
}

/// Body of `POST /api/get-recommendations`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsBody {
    #[serde(default)]
    pub access_token: Option<String>,
    pub genres: Vec<String>,
    pub mood: f32,
    pub popularity: u8,
}

/// Body of `GET /api/auth/session`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: Session,
    pub platform: Platform,
    pub expires_at: String,
    pub state: LifecycleState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}
