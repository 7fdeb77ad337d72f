//! Wizard API handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum_extra::extract::WithRejection;
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tunequiz_core::{
    CreatedPlaylist, Platform, PlaylistRequest, SearchQuery, Secret,
    create_playlist_with_items,
    platform::spotify::{RecommendationRequest, Track},
    quiz, session_callback,
};

use super::auth::current_record;
use super::cookies;
use super::error::ApiError;
use super::state::AppState;
use super::types::{
    CreatePlaylistBody, HealthResponse, QuizResponse, RecommendationsBody, SearchParams,
    SearchResponse,
};

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /api/quiz`
pub async fn quiz_questions() -> Json<QuizResponse> {
    Json(QuizResponse {
        questions: quiz::questions().to_vec(),
    })
}

/// `GET /api/youtube/search?query=`
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter is required"))?;

    let query = SearchQuery::parse(query);
    tracing::debug!(text = %query.search_text(), "Searching playlists");

    let items = state.search.search(&query).await.map_err(ApiError::Search)?;
    Ok(Json(SearchResponse { items }))
}

/// Access token and owner id of the signed-in session for `platform`.
async fn session_credentials(
    state: &AppState,
    jar: &CookieJar,
    platform: Platform,
) -> Result<(Secret, String), ApiError> {
    let (_, record) = current_record(state, jar).await?;
    let session = session_callback(&record)?;
    if record.platform != platform {
        return Err(ApiError::bad_request(format!(
            "signed in with {}, not {}",
            record.platform, platform
        )));
    }
    Ok((session.access_token, record.provider_account_id))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `POST /api/get-recommendations`
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<RecommendationsBody>, ApiError>,
) -> Result<Json<Vec<Track>>, ApiError> {
    let access_token = match non_blank(body.access_token) {
        Some(token) => Secret::new(token),
        None => session_credentials(&state, &jar, Platform::Spotify).await?.0,
    };

    let request = RecommendationRequest {
        genres: body.genres,
        mood: body.mood,
        popularity: body.popularity,
    };

    let tracks = state.recommender.recommendations(&access_token, &request).await?;
    Ok(Json(tracks))
}

/// `POST /api/create-playlist`
pub async fn create_playlist(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<CreatePlaylistBody>, ApiError>,
) -> Result<Json<CreatedPlaylist>, ApiError> {
    let platform = body.platform.unwrap_or(Platform::Spotify);
    let writer = state
        .writers
        .get(&platform)
        .ok_or_else(|| ApiError::ProviderNotConfigured(platform.to_string()))?;

    let (access_token, session_owner) = match non_blank(body.access_token) {
        Some(token) => (Secret::new(token), None),
        None if cookies::get_session_id(&jar).is_some() => {
            let (token, owner) = session_credentials(&state, &jar, platform).await?;
            (token, Some(owner))
        }
        // left blank so validation rejects it
        None => (Secret::new(""), None),
    };

    let request = PlaylistRequest {
        access_token,
        owner: non_blank(body.user_id).or(session_owner).unwrap_or_default(),
        name: body.name.unwrap_or_default(),
        description: non_blank(body.description),
        items: body.items,
    };

    let created = create_playlist_with_items(writer.as_ref(), &request).await?;
    tracing::info!(
        %platform,
        playlist = %created.playlist_identifier,
        items = request.items.len(),
        "Playlist written"
    );
    Ok(Json(created))
}
