//! OAuth provider configuration.
//!
//! [`ProviderConfig::youtube`] (through Google OAuth) and
//! [`ProviderConfig::spotify`] carry the production endpoints. Endpoints can be overridden, which is how tests point the clients
//! at mock servers.

use serde::{Deserialize, Serialize};

use crate::model::Platform;

/// Configuration for one platform's OAuth and REST endpoints.
///
/// # Example
///
/// ```
/// use tunequiz_core::{Platform, provider::ProviderConfig};
///
/// let spotify = ProviderConfig::new(Platform::Spotify, "Spotify")
///     .with_auth_url("https://accounts.spotify.com/authorize")
///     .with_token_url("https://accounts.spotify.com/api/token");
/// assert_eq!(spotify.platform, Platform::Spotify);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Platform this configuration belongs to.
    pub platform: Platform,

    /// Human-readable name (e.g., "YouTube", "Spotify").
    pub name: String,

    /// OAuth authorization endpoint URL.
    pub auth_url: String,

    /// OAuth token endpoint URL.
    pub token_url: String,

    /// Endpoint returning the signed-in user's profile.
    pub userinfo_url: String,

    /// Base URL of the platform's REST API.
    pub api_base: String,

    /// Default OAuth scopes to request.
    pub default_scopes: Vec<String>,

    /// Extra query parameters appended to the authorization URL.
    #[serde(default)]
    pub extra_auth_params: Vec<(String, String)>,
}

impl ProviderConfig {
    /// Create a new provider configuration with empty endpoints.
    pub fn new(platform: Platform, name: impl Into<String>) -> Self {
        Self {
            platform,
            name: name.into(),
            auth_url: String::new(),
            token_url: String::new(),
            userinfo_url: String::new(),
            api_base: String::new(),
            default_scopes: Vec::new(),
            extra_auth_params: Vec::new(),
        }
    }

    /// Set the authorization URL.
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    /// Set the token URL.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Set the profile endpoint URL.
    pub fn with_userinfo_url(mut self, url: impl Into<String>) -> Self {
        self.userinfo_url = url.into();
        self
    }

    /// Set the REST API base URL.
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Set the default scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.default_scopes = scopes;
        self
    }

    /// Add an extra authorization URL parameter.
    pub fn with_auth_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_auth_params.push((key.into(), value.into()));
        self
    }

    /// YouTube Data API through Google OAuth.
    ///
    /// Requests offline access so Google issues a refresh token.
    pub fn youtube() -> Self {
        Self::new(Platform::Youtube, "YouTube")
            .with_auth_url("https://accounts.google.com/o/oauth2/v2/auth")
            .with_token_url("https://oauth2.googleapis.com/token")
            .with_userinfo_url("https://openidconnect.googleapis.com/v1/userinfo")
            .with_api_base("https://www.googleapis.com/youtube/v3")
            .with_scopes(
                [
                    "openid",
                    "email",
                    "profile",
                    "https://www.googleapis.com/auth/youtube",
                    "https://www.googleapis.com/auth/youtube.force-ssl",
                    "https://www.googleapis.com/auth/youtube.readonly",
                    "https://www.googleapis.com/auth/youtubepartner",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            )
            .with_auth_param("access_type", "offline")
            .with_auth_param("prompt", "consent")
    }

    /// Spotify Web API.
    pub fn spotify() -> Self {
        Self::new(Platform::Spotify, "Spotify")
            .with_auth_url("https://accounts.spotify.com/authorize")
            .with_token_url("https://accounts.spotify.com/api/token")
            .with_userinfo_url("https://api.spotify.com/v1/me")
            .with_api_base("https://api.spotify.com/v1")
            .with_scopes(
                [
                    "user-read-private",
                    "user-read-email",
                    "playlist-modify-public",
                    "playlist-modify-private",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            )
    }
}
