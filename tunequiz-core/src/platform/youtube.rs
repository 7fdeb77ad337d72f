//! YouTube Data API v3 client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{PlatformError, check, decode};
use crate::playlist::{PlaylistDraft, PlaylistWriter, Visibility};
use crate::provider::ProviderConfig;
use crate::search::{PlaylistSearch, SearchQuery, SearchResult, Thumbnails};
use crate::store::Secret;

/// Number of results requested per search.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// YouTube category id for music.
const MUSIC_CATEGORY_ID: &str = "10";

/// Client for the YouTube Data API.
///
/// Searches authenticate with an API key; playlist writes use the signed-in
/// user's bearer token.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<Secret>,
    max_results: u32,
}

impl YouTubeClient {
    /// Create a client against the given API base (e.g. `https://www.googleapis.com/youtube/v3`).
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: None,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Create a client from the provider configuration.
    pub fn for_provider(config: &ProviderConfig) -> Self {
        Self::new(config.api_base.clone())
    }

    /// Set the API key used for searches.
    pub fn with_api_key(mut self, key: Secret) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Use a shared HTTP client.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Limit the number of search results.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Search music videos matching free text.
    pub async fn search_videos(&self, text: &str) -> Result<Vec<SearchResult>, PlatformError> {
        let key = self.api_key.as_ref().ok_or_else(|| PlatformError::NotConfigured {
            message: "YouTube API key is not set".to_string(),
        })?;

        let max_results = self.max_results.to_string();
        let response = self
            .http
            .get(format!("{}/search", self.api_base))
            .query(&[
                ("part", "snippet"),
                ("q", text),
                ("maxResults", max_results.as_str()),
                ("type", "video"),
                ("videoCategoryId", MUSIC_CATEGORY_ID),
                ("key", key.expose()),
            ])
            .send()
            .await?;

        let body: SearchListResponse = decode(response).await?;
        // an empty list is a valid answer; only a missing one is an error
        let items = body.items.ok_or(PlatformError::NoResults)?;

        Ok(items
            .into_iter()
            .filter_map(SearchItem::into_result)
            .collect())
    }
}

#[async_trait]
impl PlaylistSearch for YouTubeClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, PlatformError> {
        self.search_videos(&query.search_text()).await
    }
}

#[async_trait]
impl PlaylistWriter for YouTubeClient {
    /// YouTube always creates the playlist on the token holder's channel;
    /// `owner` is not sent.
    async fn create_playlist(
        &self,
        access_token: &Secret,
        _owner: &str,
        draft: &PlaylistDraft,
    ) -> Result<String, PlatformError> {
        let body = PlaylistInsert {
            snippet: PlaylistSnippet {
                title: &draft.name,
                description: &draft.description,
            },
            status: PlaylistStatus {
                privacy_status: draft.visibility,
            },
        };

        let response = self
            .http
            .post(format!("{}/playlists", self.api_base))
            .query(&[("part", "snippet,status")])
            .bearer_auth(access_token.expose())
            .json(&body)
            .send()
            .await?;

        let created: PlaylistResource = decode(response).await?;
        Ok(created.id)
    }

    async fn attach_item(
        &self,
        access_token: &Secret,
        playlist_id: &str,
        item: &str,
    ) -> Result<(), PlatformError> {
        let body = PlaylistItemInsert {
            snippet: PlaylistItemSnippet {
                playlist_id,
                resource_id: ResourceId {
                    kind: "youtube#video",
                    video_id: item,
                },
            },
        };

        let response = self
            .http
            .post(format!("{}/playlistItems", self.api_base))
            .query(&[("part", "snippet")])
            .bearer_auth(access_token.expose())
            .json(&body)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    fn playlist_url(&self, playlist_id: &str) -> String {
        format!("https://www.youtube.com/playlist?list={playlist_id}")
    }
}

// Request bodies

#[derive(Serialize)]
struct PlaylistInsert<'a> {
    snippet: PlaylistSnippet<'a>,
    status: PlaylistStatus,
}

#[derive(Serialize)]
struct PlaylistSnippet<'a> {
    title: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistStatus {
    privacy_status: Visibility,
}

#[derive(Serialize)]
struct PlaylistItemInsert<'a> {
    snippet: PlaylistItemSnippet<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet<'a> {
    playlist_id: &'a str,
    resource_id: ResourceId<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId<'a> {
    kind: &'a str,
    video_id: &'a str,
}

// Response bodies

#[derive(Debug, Deserialize)]
struct PlaylistResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Option<SearchSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchSnippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnails: SnippetThumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct SnippetThumbnails {
    default: Option<ThumbnailRef>,
    medium: Option<ThumbnailRef>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailRef {
    url: String,
}

impl SearchItem {
    /// Items without a video id (channels, playlists) are dropped.
    fn into_result(self) -> Option<SearchResult> {
        let identifier = self.id.video_id?;
        let snippet = self.snippet?;
        Some(SearchResult {
            identifier,
            title: snippet.title,
            description: snippet.description,
            thumbnails: Thumbnails {
                default: snippet.thumbnails.default.map(|t| t.url),
                medium: snippet.thumbnails.medium.map(|t| t.url),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_insert_body_shape() {
        let body = PlaylistInsert {
            snippet: PlaylistSnippet {
                title: "Mix",
                description: "",
            },
            status: PlaylistStatus {
                privacy_status: Visibility::Private,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"]["privacyStatus"], "private");
        assert_eq!(json["snippet"]["title"], "Mix");
    }

    #[test]
    fn test_search_item_without_video_id_dropped() {
        let item: SearchItem = serde_json::from_value(serde_json::json!({
            "id": { "kind": "youtube#channel", "channelId": "UC1" },
            "snippet": { "title": "A channel" }
        }))
        .unwrap();

        assert!(item.into_result().is_none());
    }

    #[test]
    fn test_playlist_url() {
        let client = YouTubeClient::new("http://localhost/");
        assert_eq!(
            client.playlist_url("PL1"),
            "https://www.youtube.com/playlist?list=PL1"
        );
        assert_eq!(client.api_base, "http://localhost");
    }
}
