//! Playlist write proxy.
//!
//! [`create_playlist_with_items`] validates a [`PlaylistRequest`], creates an
//! empty private playlist and then attaches every item to it.
//!
//! Attach failures do not roll the creation back. The caller receives
//! [`PlaylistError::Attach`] with a [`PartialWrite`] naming the playlist that
//! now exists upstream and which items are missing from it.

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;

use crate::platform::PlatformError;
use crate::store::Secret;

/// Playlist visibility on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
}

/// The empty playlist to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistDraft {
    pub name: String,
    pub description: String,
    pub visibility: Visibility,
}

/// A request to create a playlist and fill it.
#[derive(Debug, Clone)]
pub struct PlaylistRequest {
    pub access_token: Secret,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    /// Item references in the order they should appear.
    pub items: Vec<String>,
}

impl PlaylistRequest {
    /// Check the preconditions that must hold before any outbound call.
    pub fn validate(&self) -> Result<(), PlaylistError> {
        if self.access_token.is_blank() {
            return Err(PlaylistError::Validation {
                field: "accessToken",
            });
        }
        if self.owner.trim().is_empty() {
            return Err(PlaylistError::Validation { field: "userId" });
        }
        if self.name.trim().is_empty() {
            return Err(PlaylistError::Validation { field: "name" });
        }
        if self.items.is_empty() || self.items.iter().any(|i| i.trim().is_empty()) {
            return Err(PlaylistError::Validation { field: "items" });
        }
        Ok(())
    }

    fn draft(&self) -> PlaylistDraft {
        PlaylistDraft {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            visibility: Visibility::Private,
        }
    }
}

/// A fully written playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPlaylist {
    pub name: String,
    pub playlist_identifier: String,
    pub url: String,
}

/// One item that could not be attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub item: String,
    pub status: Option<u16>,
    pub message: String,
}

/// A playlist that was created but only partly filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialWrite {
    pub playlist_identifier: String,
    pub url: String,
    pub attached: usize,
    pub failures: Vec<ItemFailure>,
}

impl std::fmt::Display for PartialWrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "playlist {} created but {} of {} items failed to attach",
            self.playlist_identifier,
            self.failures.len(),
            self.attached + self.failures.len()
        )
    }
}

/// Error type for the write proxy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaylistError {
    /// A required input was missing; nothing was sent upstream.
    #[error("missing required field: {field}")]
    Validation { field: &'static str },

    /// The playlist could not be created; no items were attempted.
    #[error("failed to create playlist: {0}")]
    Create(PlatformError),

    /// The playlist exists but some items could not be attached.
    #[error("playlist write incomplete: {0}")]
    Attach(PartialWrite),
}

impl PlaylistError {
    /// Taxonomy name reported to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            PlaylistError::Validation { .. } => "ValidationError",
            PlaylistError::Create(_) | PlaylistError::Attach(_) => "UpstreamWriteError",
        }
    }

    /// The partially written playlist, if creation succeeded.
    pub fn partial(&self) -> Option<&PartialWrite> {
        match self {
            PlaylistError::Attach(partial) => Some(partial),
            _ => None,
        }
    }
}

/// A platform that can create playlists and attach items to them.
#[async_trait]
pub trait PlaylistWriter: Send + Sync {
    /// Create an empty playlist and return its platform identifier.
    async fn create_playlist(
        &self,
        access_token: &Secret,
        owner: &str,
        draft: &PlaylistDraft,
    ) -> Result<String, PlatformError>;

    /// Attach one item to a playlist.
    async fn attach_item(
        &self,
        access_token: &Secret,
        playlist_id: &str,
        item: &str,
    ) -> Result<(), PlatformError>;

    /// Attach every item, returning one outcome per item in input order.
    ///
    /// The default issues one concurrent request per item and waits for all
    /// of them to settle.
    async fn attach_items(
        &self,
        access_token: &Secret,
        playlist_id: &str,
        items: &[String],
    ) -> Vec<Result<(), PlatformError>> {
        join_all(
            items
                .iter()
                .map(|item| self.attach_item(access_token, playlist_id, item)),
        )
        .await
    }

    /// Deep link to a playlist.
    fn playlist_url(&self, playlist_id: &str) -> String;
}

/// Create a playlist and attach every requested item to it.
pub async fn create_playlist_with_items<W>(
    writer: &W,
    request: &PlaylistRequest,
) -> Result<CreatedPlaylist, PlaylistError>
where
    W: PlaylistWriter + ?Sized,
{
    request.validate()?;

    let playlist_id = writer
        .create_playlist(&request.access_token, &request.owner, &request.draft())
        .await
        .map_err(PlaylistError::Create)?;

    if playlist_id.trim().is_empty() {
        return Err(PlaylistError::Create(PlatformError::InvalidResponse {
            message: "playlist created without an identifier".to_string(),
        }));
    }

    tracing::info!(
        "Created playlist {} for {}, attaching {} items",
        playlist_id,
        request.owner,
        request.items.len()
    );

    let outcomes = writer
        .attach_items(&request.access_token, &playlist_id, &request.items)
        .await;

    let url = writer.playlist_url(&playlist_id);
    let mut attached = 0;
    let mut failures = Vec::new();
    for (item, outcome) in request.items.iter().zip(outcomes) {
        match outcome {
            Ok(()) => attached += 1,
            Err(e) => failures.push(ItemFailure {
                item: item.clone(),
                status: e.status(),
                message: e.to_string(),
            }),
        }
    }

    if !failures.is_empty() {
        tracing::warn!(
            "Playlist {} left incomplete: {} of {} items failed",
            playlist_id,
            failures.len(),
            request.items.len()
        );
        return Err(PlaylistError::Attach(PartialWrite {
            playlist_identifier: playlist_id,
            url,
            attached,
            failures,
        }));
    }

    Ok(CreatedPlaylist {
        name: request.name.clone(),
        playlist_identifier: playlist_id,
        url,
    })
}
