//! Integration tests for the platform clients against mock APIs.
//!
//! These tests verify that:
//! - A playlist is created once and every item attached to it
//! - Attach failures leave the playlist in place and are reported per item
//! - Invalid requests never reach the network
//! - Search and recommendation responses are decoded into typed results

use serde_json::{Value, json};
use tunequiz_core::{
    PlatformError, PlaylistError, PlaylistRequest, SearchQuery, Secret, create_playlist_with_items,
    platform::spotify::{RecommendationRequest, SpotifyClient},
    platform::youtube::YouTubeClient,
    search::PlaylistSearch,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, query_param},
};

fn request(items: &[&str]) -> PlaylistRequest {
    PlaylistRequest {
        access_token: Secret::new("user-token"),
        owner: "listener".to_string(),
        name: "Rock Energetic 80s".to_string(),
        description: Some("Made by the quiz".to_string()),
        items: items.iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::test]
async fn test_youtube_playlist_created_and_filled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/playlists"))
        .and(query_param("part", "snippet,status"))
        .and(header("authorization", "Bearer user-token"))
        .and(body_partial_json(json!({
            "snippet": { "title": "Rock Energetic 80s" },
            "status": { "privacyStatus": "private" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "PL1" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/playlistItems"))
        .and(body_partial_json(json!({ "snippet": { "playlistId": "PL1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "item" })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(mock_server.uri());
    let created = create_playlist_with_items(&client, &request(&["v1", "v2"]))
        .await
        .unwrap();

    assert_eq!(created.playlist_identifier, "PL1");
    assert!(created.url.contains("PL1"));
}

#[tokio::test]
async fn test_youtube_attach_failure_keeps_playlist() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/playlists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "PL1" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/playlistItems"))
        .and(body_partial_json(
            json!({ "snippet": { "resourceId": { "videoId": "v1" } } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "item" })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/playlistItems"))
        .and(body_partial_json(
            json!({ "snippet": { "resourceId": { "videoId": "v2" } } }),
        ))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "Video not found." }
        })))
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(mock_server.uri());
    let err = create_playlist_with_items(&client, &request(&["v1", "v2"]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "UpstreamWriteError");
    let partial = err.partial().unwrap();
    assert_eq!(partial.playlist_identifier, "PL1");
    assert_eq!(partial.attached, 1);
    assert_eq!(partial.failures.len(), 1);
    assert_eq!(partial.failures[0].item, "v2");
    assert_eq!(partial.failures[0].status, Some(404));
    assert!(partial.failures[0].message.contains("Video not found."));
}

#[tokio::test]
async fn test_create_failure_attaches_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/playlists"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "insufficientPermissions" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(mock_server.uri());
    let err = create_playlist_with_items(&client, &request(&["v1"]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PlaylistError::Create(PlatformError::Api {
            status: 403,
            message: "insufficientPermissions".to_string(),
        })
    );
}

#[tokio::test]
async fn test_empty_items_sends_nothing() {
    let mock_server = MockServer::start().await;

    let client = YouTubeClient::new(mock_server.uri());
    let err = create_playlist_with_items(&client, &request(&[]))
        .await
        .unwrap_err();

    assert_eq!(err, PlaylistError::Validation { field: "items" });
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_spotify_tracks_added_in_ordered_batches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/listener/playlists"))
        .and(body_partial_json(json!({ "public": false })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "SP1" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/playlists/SP1/tracks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "s" })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let uris: Vec<String> = (0..150).map(|i| format!("spotify:track:{i}")).collect();
    let uri_refs: Vec<&str> = uris.iter().map(String::as_str).collect();

    let client = SpotifyClient::new(mock_server.uri());
    let created = create_playlist_with_items(&client, &request(&uri_refs))
        .await
        .unwrap();
    assert_eq!(created.url, "https://open.spotify.com/playlist/SP1");

    let batches: Vec<Vec<String>> = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().ends_with("/tracks"))
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            serde_json::from_value(body["uris"].clone()).unwrap()
        })
        .collect();

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 100);
    assert_eq!(batches[1].len(), 50);
    assert_eq!(batches[0][0], "spotify:track:0");
    assert_eq!(batches[1][0], "spotify:track:100");
}

#[tokio::test]
async fn test_youtube_search_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Rock Energetic music 80s"))
        .and(query_param("type", "video"))
        .and(query_param("videoCategoryId", "10"))
        .and(query_param("maxResults", "10"))
        .and(query_param("key", "api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": { "kind": "youtube#video", "videoId": "abc" },
                "snippet": {
                    "title": "Arena Anthems",
                    "description": "Loud",
                    "thumbnails": {
                        "default": { "url": "https://i.ytimg.com/d.jpg" },
                        "medium": { "url": "https://i.ytimg.com/m.jpg" }
                    }
                }
            }]
        })))
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(mock_server.uri()).with_api_key(Secret::new("api-key"));
    let results = client
        .search(&SearchQuery::parse("Rock Energetic 80s"))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].identifier, "abc");
    assert_eq!(
        results[0].thumbnails.medium.as_deref(),
        Some("https://i.ytimg.com/m.jpg")
    );
}

#[tokio::test]
async fn test_youtube_search_empty_list_is_ok() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(mock_server.uri()).with_api_key(Secret::new("api-key"));
    let result = client.search_videos("nothing").await;

    assert_eq!(result, Ok(vec![]));
}

#[tokio::test]
async fn test_youtube_search_missing_items_is_no_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "kind": "youtube#searchListResponse" })),
        )
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(mock_server.uri()).with_api_key(Secret::new("api-key"));
    let result = client.search_videos("nothing").await;

    assert_eq!(result, Err(PlatformError::NoResults));
}

#[tokio::test]
async fn test_spotify_recommendations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/recommendations"))
        .and(query_param("seed_genres", "rock,metal"))
        .and(query_param("target_popularity", "70"))
        .and(query_param("limit", "10"))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": [{
                "id": "t1",
                "uri": "spotify:track:t1",
                "name": "Thunder",
                "artists": [{ "name": "Band" }],
                "album": { "images": [] }
            }]
        })))
        .mount(&mock_server)
        .await;

    let client = SpotifyClient::new(mock_server.uri());
    let tracks = client
        .recommendations(
            &Secret::new("user-token"),
            &RecommendationRequest {
                genres: vec!["rock".to_string(), "metal".to_string()],
                mood: 0.8,
                popularity: 70,
            },
        )
        .await
        .unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].uri, "spotify:track:t1");
    assert_eq!(tracks[0].image_url, None);
}
