//! Server configuration handling.
//!
//! Settings come from a TOML file (`--config`, or `server.toml` in the
//! platform config directory) with environment variables layered on top for
//! client credentials.

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tunequiz_core::{Platform, ProviderConfig, Secret};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,

    /// Externally reachable base URL, used to build OAuth redirect URIs.
    pub public_url: String,

    /// Logging level (`RUST_LOG` wins when set).
    pub log_level: String,

    /// Curated playlist table; when set it replaces YouTube search.
    pub catalog_path: Option<PathBuf>,

    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,

    pub youtube: ProviderSettings,

    pub spotify: ProviderSettings,

    /// Path to the configuration file that was loaded.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Credentials and endpoint overrides for one platform.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<Secret>,
    /// API key for unauthenticated calls (YouTube search).
    pub api_key: Option<Secret>,
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub userinfo_url: Option<String>,
    pub api_base: Option<String>,
}

impl ProviderSettings {
    /// Apply the endpoint overrides to a provider's defaults.
    pub fn apply(&self, mut provider: ProviderConfig) -> ProviderConfig {
        if let Some(url) = &self.auth_url {
            provider.auth_url = url.clone();
        }
        if let Some(url) = &self.token_url {
            provider.token_url = url.clone();
        }
        if let Some(url) = &self.userinfo_url {
            provider.userinfo_url = url.clone();
        }
        if let Some(url) = &self.api_base {
            provider.api_base = url.clone();
        }
        provider
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            public_url: "http://localhost:3000".to_string(),
            log_level: "info".to_string(),
            catalog_path: None,
            secure_cookies: false,
            youtube: ProviderSettings::default(),
            spotify: ProviderSettings::default(),
            config_path: None,
        }
    }
}

impl ServerConfig {
    pub fn provider(&self, platform: Platform) -> &ProviderSettings {
        match platform {
            Platform::Youtube => &self.youtube,
            Platform::Spotify => &self.spotify,
        }
    }

    /// Provider configuration with this server's overrides applied.
    pub fn provider_config(&self, platform: Platform) -> ProviderConfig {
        let defaults = match platform {
            Platform::Youtube => ProviderConfig::youtube(),
            Platform::Spotify => ProviderConfig::spotify(),
        };
        self.provider(platform).apply(defaults)
    }

    /// OAuth redirect URI for a platform.
    pub fn redirect_uri(&self, platform: Platform) -> String {
        format!(
            "{}/api/auth/callback/{}",
            self.public_url.trim_end_matches('/'),
            platform
        )
    }

    /// Layer environment variables over the file settings.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut Option<String>, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *target = Some(value);
            }
        };
        let set_secret = |target: &mut Option<Secret>, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *target = Some(Secret::new(value));
            }
        };

        set(&mut self.youtube.client_id, "YOUTUBE_CLIENT_ID");
        set_secret(&mut self.youtube.client_secret, "YOUTUBE_CLIENT_SECRET");
        set_secret(&mut self.youtube.api_key, "YOUTUBE_API_KEY");
        set(&mut self.spotify.client_id, "SPOTIFY_CLIENT_ID");
        set_secret(&mut self.spotify.client_secret, "SPOTIFY_CLIENT_SECRET");

        if let Some(url) = lookup("TUNEQUIZ_PUBLIC_URL").filter(|v| !v.is_empty()) {
            self.public_url = url;
        }
    }
}

/// Read and parse a configuration file.
pub fn read_config(path: &Path) -> Result<ServerConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {:?}", path))?;
    let mut config: ServerConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config from {:?}", path))?;
    config.config_path = Some(path.to_path_buf());
    Ok(config)
}

/// Load configuration from `path`, or the default location, or defaults.
///
/// An explicitly given path must exist.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file {:?} does not exist", path);
            }
            read_config(path)?
        }
        None => match default_config_path() {
            Some(default) if default.exists() => read_config(&default)?,
            _ => ServerConfig::default(),
        },
    };

    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("server.toml"))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "tunequiz", "tunequiz")
}
