//! Spotify Web API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::{PlatformError, check, decode};
use crate::playlist::{PlaylistDraft, PlaylistWriter, Visibility};
use crate::provider::ProviderConfig;
use crate::store::Secret;

/// Spotify accepts at most this many URIs per add-tracks request.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

/// Spotify accepts at most this many seeds per recommendation request.
pub const MAX_SEED_GENRES: usize = 5;

/// Number of tracks requested per recommendation.
pub const DEFAULT_RECOMMENDATION_LIMIT: u32 = 10;

/// Error type for recommendation requests.
#[derive(Debug, Error)]
pub enum RecommendationError {
    /// The request was rejected before any outbound call.
    #[error("invalid recommendation request: {field}")]
    Validation { field: &'static str },

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Parameters for a recommendation query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    /// Seed genres, at most [`MAX_SEED_GENRES`].
    pub genres: Vec<String>,
    /// Target valence in `0.0..=1.0`.
    pub mood: f32,
    /// Target popularity in `0..=100`.
    pub popularity: u8,
}

impl RecommendationRequest {
    pub fn validate(&self) -> Result<(), RecommendationError> {
        if self.genres.is_empty()
            || self.genres.len() > MAX_SEED_GENRES
            || self.genres.iter().any(|g| g.trim().is_empty())
        {
            return Err(RecommendationError::Validation { field: "genres" });
        }
        if !(0.0..=1.0).contains(&self.mood) {
            return Err(RecommendationError::Validation { field: "mood" });
        }
        if self.popularity > 100 {
            return Err(RecommendationError::Validation {
                field: "popularity",
            });
        }
        Ok(())
    }
}

/// A recommended track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub artists: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Client for the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    api_base: String,
}

impl SpotifyClient {
    /// Create a client against the given API base (e.g. `https://api.spotify.com/v1`).
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    /// Create a client from the provider configuration.
    pub fn for_provider(config: &ProviderConfig) -> Self {
        Self::new(config.api_base.clone())
    }

    /// Use a shared HTTP client.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Build an endpoint URL, percent-encoding each path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PlatformError> {
        let mut url = Url::parse(&self.api_base).map_err(|e| PlatformError::NotConfigured {
            message: format!("invalid Spotify API base {}: {}", self.api_base, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| PlatformError::NotConfigured {
                message: format!("Spotify API base cannot be a base: {}", self.api_base),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Fetch track recommendations for the signed-in user.
    pub async fn recommendations(
        &self,
        access_token: &Secret,
        request: &RecommendationRequest,
    ) -> Result<Vec<Track>, RecommendationError> {
        request.validate()?;

        let seed_genres = request.genres.join(",");
        let valence = request.mood.to_string();
        let popularity = request.popularity.to_string();
        let limit = DEFAULT_RECOMMENDATION_LIMIT.to_string();

        let response = self
            .http
            .get(self.endpoint(&["recommendations"])?)
            .query(&[
                ("seed_genres", seed_genres.as_str()),
                ("target_valence", valence.as_str()),
                ("target_popularity", popularity.as_str()),
                ("limit", limit.as_str()),
            ])
            .bearer_auth(access_token.expose())
            .send()
            .await
            .map_err(PlatformError::from)?;

        let body: RecommendationsResponse = decode(response).await?;
        Ok(body.tracks.into_iter().map(Track::from).collect())
    }

    async fn add_tracks(
        &self,
        access_token: &Secret,
        playlist_id: &str,
        uris: &[&str],
    ) -> Result<(), PlatformError> {
        let response = self
            .http
            .post(self.endpoint(&["playlists", playlist_id, "tracks"])?)
            .bearer_auth(access_token.expose())
            .json(&AddTracks { uris })
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl PlaylistWriter for SpotifyClient {
    async fn create_playlist(
        &self,
        access_token: &Secret,
        owner: &str,
        draft: &PlaylistDraft,
    ) -> Result<String, PlatformError> {
        let body = CreatePlaylist {
            name: &draft.name,
            description: &draft.description,
            public: draft.visibility == Visibility::Public,
        };

        let response = self
            .http
            .post(self.endpoint(&["users", owner, "playlists"])?)
            .bearer_auth(access_token.expose())
            .json(&body)
            .send()
            .await?;

        let created: PlaylistObject = decode(response).await?;
        Ok(created.id)
    }

    async fn attach_item(
        &self,
        access_token: &Secret,
        playlist_id: &str,
        item: &str,
    ) -> Result<(), PlatformError> {
        self.add_tracks(access_token, playlist_id, &[item]).await
    }

    /// Tracks are added in order, one request per chunk of
    /// [`MAX_TRACKS_PER_REQUEST`]; a failed chunk fails each of its items.
    async fn attach_items(
        &self,
        access_token: &Secret,
        playlist_id: &str,
        items: &[String],
    ) -> Vec<Result<(), PlatformError>> {
        let mut outcomes = Vec::with_capacity(items.len());
        for chunk in items.chunks(MAX_TRACKS_PER_REQUEST) {
            let uris: Vec<&str> = chunk.iter().map(String::as_str).collect();
            let outcome = self.add_tracks(access_token, playlist_id, &uris).await;
            outcomes.extend(std::iter::repeat_n(outcome, chunk.len()));
        }
        outcomes
    }

    fn playlist_url(&self, playlist_id: &str) -> String {
        format!("https://open.spotify.com/playlist/{playlist_id}")
    }
}

// Request bodies

#[derive(Serialize)]
struct CreatePlaylist<'a> {
    name: &'a str,
    description: &'a str,
    public: bool,
}

#[derive(Serialize)]
struct AddTracks<'a> {
    uris: &'a [&'a str],
}

// Response bodies

#[derive(Debug, Deserialize)]
struct PlaylistObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RecommendationsResponse {
    #[serde(default)]
    tracks: Vec<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    id: String,
    uri: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
    album: Option<AlbumObject>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumObject {
    #[serde(default)]
    images: Vec<ImageObject>,
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    url: String,
}

impl From<TrackObject> for Track {
    fn from(track: TrackObject) -> Self {
        Self {
            id: track.id,
            uri: track.uri,
            name: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            image_url: track
                .album
                .and_then(|album| album.images.into_iter().next())
                .map(|image| image.url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(genres: &[&str], mood: f32, popularity: u8) -> RecommendationRequest {
        RecommendationRequest {
            genres: genres.iter().map(|s| s.to_string()).collect(),
            mood,
            popularity,
        }
    }

    #[test]
    fn test_recommendation_validation() {
        assert!(request(&["rock"], 0.5, 50).validate().is_ok());
        assert!(matches!(
            request(&[], 0.5, 50).validate(),
            Err(RecommendationError::Validation { field: "genres" })
        ));
        assert!(matches!(
            request(&["a", "b", "c", "d", "e", "f"], 0.5, 50).validate(),
            Err(RecommendationError::Validation { field: "genres" })
        ));
        assert!(matches!(
            request(&["rock"], 1.5, 50).validate(),
            Err(RecommendationError::Validation { field: "mood" })
        ));
        assert!(matches!(
            request(&["rock"], 0.5, 101).validate(),
            Err(RecommendationError::Validation { field: "popularity" })
        ));
    }

    #[test]
    fn test_endpoint_encodes_owner() {
        let client = SpotifyClient::new("https://api.spotify.com/v1/");
        let url = client.endpoint(&["users", "a b/c", "playlists"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.spotify.com/v1/users/a%20b%2Fc/playlists"
        );
    }

    #[test]
    fn test_track_conversion_takes_first_image() {
        let track: TrackObject = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "uri": "spotify:track:t1",
            "name": "Song",
            "artists": [{ "name": "A" }, { "name": "B" }],
            "album": { "images": [{ "url": "big.jpg" }, { "url": "small.jpg" }] }
        }))
        .unwrap();

        let track = Track::from(track);
        assert_eq!(track.artists, vec!["A", "B"]);
        assert_eq!(track.image_url.as_deref(), Some("big.jpg"));
    }

    #[test]
    fn test_playlist_url() {
        let client = SpotifyClient::new("https://api.spotify.com/v1");
        assert_eq!(
            client.playlist_url("PL1"),
            "https://open.spotify.com/playlist/PL1"
        );
    }
}
