//! State shared across request handlers.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tunequiz_core::{
    HttpTokenRefresher, MemorySessionStore, Platform, PlaylistSearch, PlaylistWriter, Secret,
    SessionId, SessionStore, StaticCatalog, TokenRefresher,
    oauth::AuthorizationFlow,
    platform::{spotify::SpotifyClient, youtube::YouTubeClient},
};

use crate::config::ServerConfig;

/// How long a started sign-in may take before its state is discarded.
pub const PENDING_AUTHORIZATION_TTL_MINUTES: i64 = 10;

/// A sign-in waiting for the provider redirect.
#[derive(Debug)]
pub struct PendingAuthorization {
    pub platform: Platform,
    pub pkce_verifier: Secret,
    pub started_at: DateTime<Utc>,
}

/// Sign-ins in flight, keyed by CSRF state.
#[derive(Debug, Default)]
pub struct PendingAuthorizations {
    inner: Mutex<HashMap<String, PendingAuthorization>>,
}

impl PendingAuthorizations {
    pub fn insert(&self, state: String, pending: PendingAuthorization) {
        let mut inner = self.inner.lock();
        let cutoff = pending.started_at - Duration::minutes(PENDING_AUTHORIZATION_TTL_MINUTES);
        inner.retain(|_, p| p.started_at > cutoff);
        inner.insert(state, pending);
    }

    /// Remove and return the sign-in for `state` if it has not expired.
    pub fn take(&self, state: &str, now: DateTime<Utc>) -> Option<PendingAuthorization> {
        let pending = self.inner.lock().remove(state)?;
        let age = now - pending.started_at;
        (age <= Duration::minutes(PENDING_AUTHORIZATION_TTL_MINUTES)).then_some(pending)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-session locks held while an expired record is refreshed.
///
/// Concurrent requests on one session then make a single refresh call; the
/// waiters re-read the record the winner saved.
#[derive(Debug, Default)]
pub struct RefreshLocks {
    inner: Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl RefreshLocks {
    /// Lock for `session_id`, created on first use.
    pub fn lock_for(&self, session_id: &SessionId) -> Arc<tokio::sync::Mutex<()>> {
        self.inner
            .lock()
            .entry(session_id.clone())
            .or_default()
            .clone()
    }

    /// Drop the entry for `session_id` unless another request still holds it.
    pub fn release(&self, session_id: &SessionId) {
        let mut inner = self.inner.lock();
        if inner
            .get(session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            inner.remove(session_id);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub flows: HashMap<Platform, Arc<AuthorizationFlow>>,
    pub refreshers: HashMap<Platform, Arc<dyn TokenRefresher>>,
    pub writers: HashMap<Platform, Arc<dyn PlaylistWriter>>,
    pub search: Arc<dyn PlaylistSearch>,
    pub recommender: Arc<SpotifyClient>,
    pub pending: Arc<PendingAuthorizations>,
    pub refresh_locks: Arc<RefreshLocks>,
    pub secure_cookies: bool,
}

impl AppState {
    /// State with the given session store and search source, default
    /// platform clients and no sign-in providers.
    pub fn new(sessions: Arc<dyn SessionStore>, search: Arc<dyn PlaylistSearch>) -> Self {
        let youtube = YouTubeClient::for_provider(&tunequiz_core::ProviderConfig::youtube());
        let spotify = SpotifyClient::for_provider(&tunequiz_core::ProviderConfig::spotify());

        let mut writers: HashMap<Platform, Arc<dyn PlaylistWriter>> = HashMap::new();
        writers.insert(Platform::Youtube, Arc::new(youtube));
        writers.insert(Platform::Spotify, Arc::new(spotify.clone()));

        Self {
            sessions,
            flows: HashMap::new(),
            refreshers: HashMap::new(),
            writers,
            search,
            recommender: Arc::new(spotify),
            pending: Arc::new(PendingAuthorizations::default()),
            refresh_locks: Arc::new(RefreshLocks::default()),
            secure_cookies: false,
        }
    }

    pub fn with_flow(mut self, flow: AuthorizationFlow) -> Self {
        self.flows.insert(flow.platform(), Arc::new(flow));
        self
    }

    pub fn with_refresher(mut self, platform: Platform, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refreshers.insert(platform, refresher);
        self
    }

    pub fn with_writer(mut self, platform: Platform, writer: Arc<dyn PlaylistWriter>) -> Self {
        self.writers.insert(platform, writer);
        self
    }

    pub fn with_recommender(mut self, client: SpotifyClient) -> Self {
        self.recommender = Arc::new(client);
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Build the production state from configuration.
    ///
    /// Platforms without a client id get no sign-in flow; their sessions
    /// cannot be created.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let http = reqwest::Client::new();

        let youtube_config = config.provider_config(Platform::Youtube);
        let spotify_config = config.provider_config(Platform::Spotify);

        let mut youtube = YouTubeClient::for_provider(&youtube_config).with_http_client(http.clone());
        if let Some(key) = &config.youtube.api_key {
            youtube = youtube.with_api_key(key.clone());
        }
        let spotify = SpotifyClient::for_provider(&spotify_config).with_http_client(http.clone());

        let search: Arc<dyn PlaylistSearch> = match &config.catalog_path {
            Some(path) => {
                let catalog = StaticCatalog::load(path)
                    .with_context(|| format!("Failed to load playlist catalog {:?}", path))?;
                tracing::info!("Loaded {} catalog playlists from {:?}", catalog.len(), path);
                Arc::new(catalog)
            }
            None => {
                if config.youtube.api_key.is_none() {
                    tracing::warn!("YOUTUBE_API_KEY is not set; searches will fail");
                }
                Arc::new(youtube.clone())
            }
        };

        let mut state = Self::new(Arc::new(MemorySessionStore::new()), search)
            .with_writer(Platform::Youtube, Arc::new(youtube))
            .with_writer(Platform::Spotify, Arc::new(spotify.clone()))
            .with_recommender(spotify)
            .with_secure_cookies(config.secure_cookies);

        for (platform, provider) in [
            (Platform::Youtube, youtube_config),
            (Platform::Spotify, spotify_config),
        ] {
            let settings = config.provider(platform);
            let Some(client_id) = settings.client_id.as_deref() else {
                tracing::warn!("No client id for {}; sign-in disabled", platform);
                continue;
            };

            let flow = AuthorizationFlow::new(
                provider.clone(),
                client_id,
                settings.client_secret.as_ref(),
                &config.redirect_uri(platform),
            )
            .with_context(|| format!("Invalid OAuth settings for {}", platform))?
            .with_http_client(http.clone());

            let refresher =
                HttpTokenRefresher::for_provider(&provider, client_id, settings.client_secret.clone())
                    .with_http_client(http.clone());

            state = state
                .with_flow(flow)
                .with_refresher(platform, Arc::new(refresher));
        }

        Ok(state)
    }
}
