//! Playlist search.
//!
//! Two sources implement [`PlaylistSearch`]: the YouTube search API
//! ([`crate::platform::youtube::YouTubeClient`]) and the [`StaticCatalog`]
//! lookup table loaded from TOML.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::platform::PlatformError;
use crate::quiz::QuizAnswers;

/// A search as typed by the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Raw text received from the caller.
    pub raw: String,
    /// Parsed quiz answers, when the text is a recognised answer triple.
    pub answers: Option<QuizAnswers>,
}

impl SearchQuery {
    /// Parse a raw query, recognising quiz answers when possible.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let answers = QuizAnswers::from_query(&raw);
        Self { raw, answers }
    }

    /// Text to send to a free-text search surface.
    pub fn search_text(&self) -> String {
        match &self.answers {
            Some(answers) => answers.search_text(),
            None => self.raw.trim().to_string(),
        }
    }
}

impl From<QuizAnswers> for SearchQuery {
    fn from(answers: QuizAnswers) -> Self {
        Self {
            raw: format!("{} {} {}", answers.genre, answers.mood, answers.era),
            answers: Some(answers),
        }
    }
}

/// Thumbnail URLs of a result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// A source of playlist search results.
#[async_trait]
pub trait PlaylistSearch: Send + Sync {
    /// Return results in ranked order. No matches is an empty list.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, PlatformError>;
}

/// Error type for loading a [`StaticCatalog`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One curated playlist in the lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub genre: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub era: Option<String>,
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "playlist")]
    playlists: Vec<CatalogEntry>,
}

/// Static lookup table of curated playlists.
///
/// ```toml
/// [[playlist]]
/// genre = "Rock"
/// mood = "Energetic"
/// identifier = "PLabc"
/// title = "Stadium Rock"
/// ```
///
/// Entries are matched on genre; entries that also match the mood or era
/// rank first.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;
        Ok(Self::new(file.playlists))
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, query: &SearchQuery) -> Vec<SearchResult> {
        let mut scored: Vec<(usize, &CatalogEntry)> = match &query.answers {
            Some(answers) => self
                .entries
                .iter()
                .filter(|e| e.genre.eq_ignore_ascii_case(&answers.genre))
                .map(|e| {
                    let mood = matches_opt(&e.mood, &answers.mood);
                    let era = matches_opt(&e.era, &answers.era);
                    (usize::from(mood) + usize::from(era), e)
                })
                .collect(),
            None => {
                let text = query.raw.to_lowercase();
                self.entries
                    .iter()
                    .filter(|e| text.contains(&e.genre.to_lowercase()))
                    .map(|e| (0, e))
                    .collect()
            }
        };

        // stable: equal scores keep file order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .map(|(_, e)| SearchResult {
                identifier: e.identifier.clone(),
                title: e.title.clone(),
                description: e.description.clone(),
                thumbnails: Thumbnails {
                    default: e.thumbnail.clone(),
                    medium: e.thumbnail.clone(),
                },
            })
            .collect()
    }
}

fn matches_opt(field: &Option<String>, answer: &str) -> bool {
    field
        .as_deref()
        .is_some_and(|value| value.eq_ignore_ascii_case(answer))
}

#[async_trait]
impl PlaylistSearch for StaticCatalog {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, PlatformError> {
        Ok(self.lookup(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[[playlist]]
genre = "Rock"
identifier = "PL-rock"
title = "Rock Essentials"

[[playlist]]
genre = "Rock"
mood = "Energetic"
era = "80s"
identifier = "PL-rock-80s"
title = "Eighties Arena Rock"
thumbnail = "https://img.example.com/rock80.jpg"

[[playlist]]
genre = "Jazz"
mood = "Relaxed"
identifier = "PL-jazz"
title = "Late Night Jazz"
"#;

    #[test]
    fn test_search_query_parses_answers() {
        let query = SearchQuery::parse("Hip Hop Party 90s");
        assert!(query.answers.is_some());
        assert_eq!(query.search_text(), "Hip Hop Party music 90s");

        let free = SearchQuery::parse("  chiptune  ");
        assert!(free.answers.is_none());
        assert_eq!(free.search_text(), "chiptune");
    }

    #[tokio::test]
    async fn test_catalog_ranks_closer_matches_first() {
        let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 3);

        let results = catalog
            .search(&SearchQuery::parse("Rock Energetic 80s"))
            .await
            .unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["PL-rock-80s", "PL-rock"]);
        assert_eq!(
            results[0].thumbnails.medium.as_deref(),
            Some("https://img.example.com/rock80.jpg")
        );
    }

    #[tokio::test]
    async fn test_catalog_no_match_is_empty() {
        let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();

        let result = catalog.search(&SearchQuery::parse("Metal Party Modern")).await;

        assert_eq!(result, Ok(vec![]));
    }

    #[tokio::test]
    async fn test_catalog_free_text_matches_genre_word() {
        let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();

        let results = catalog.search(&SearchQuery::parse("some jazz please")).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].identifier, "PL-jazz");
    }

    #[test]
    fn test_catalog_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, CATALOG).unwrap();

        let catalog = StaticCatalog::load(&path).unwrap();
        assert!(!catalog.is_empty());

        assert!(StaticCatalog::load(&dir.path().join("missing.toml")).is_err());
    }
}
