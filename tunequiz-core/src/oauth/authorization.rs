//! Authorization Code flow with PKCE.
//!
//! 1. [`AuthorizationFlow::authorize_url`] builds the provider URL and hands
//!    back the CSRF state and PKCE verifier the caller must keep.
//! 2. The provider redirects back with a code.
//! 3. [`AuthorizationFlow::exchange_code`] trades the code for tokens, looks
//!    up the user's profile and returns a [`Grant`].
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), tunequiz_core::oauth::OAuthError> {
//! use tunequiz_core::oauth::AuthorizationFlow;
//! use tunequiz_core::provider::ProviderConfig;
//!
//! let flow = AuthorizationFlow::new(
//!     ProviderConfig::spotify(),
//!     "client-id",
//!     None,
//!     "http://localhost:3000/api/auth/callback/spotify",
//! )?;
//!
//! let request = flow.authorize_url(&[]);
//! println!("Visit: {}", request.url);
//!
//! // after the redirect...
//! let grant = flow.exchange_code("code", &request.pkce_verifier).await?;
//! # let _ = grant;
//! # Ok(())
//! # }
//! ```

use oauth2::{
    AuthorizationCode, CsrfToken, PkceCodeChallenge, PkceCodeVerifier, Scope, TokenResponse,
    basic::BasicClient, reqwest::async_http_client,
};

use super::profile::fetch_profile;
use super::{OAuthError, create_oauth_client};
use crate::model::Platform;
use crate::provider::ProviderConfig;
use crate::store::Secret;
use crate::token::Grant;

/// A started authorization.
#[derive(Debug)]
pub struct AuthorizationRequest {
    /// URL to send the user to.
    pub url: String,
    /// State value that must come back unchanged on the redirect.
    pub csrf_state: String,
    /// PKCE verifier needed for the code exchange.
    pub pkce_verifier: Secret,
}

/// Authorization-code flow for one platform.
pub struct AuthorizationFlow {
    config: ProviderConfig,
    client: BasicClient,
    http: reqwest::Client,
}

impl AuthorizationFlow {
    pub fn new(
        config: ProviderConfig,
        client_id: &str,
        client_secret: Option<&Secret>,
        redirect_uri: &str,
    ) -> Result<Self, OAuthError> {
        let client = create_oauth_client(&config, client_id, client_secret, Some(redirect_uri))?;
        Ok(Self {
            config,
            client,
            http: reqwest::Client::new(),
        })
    }

    /// Use a shared HTTP client for the profile lookup.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn platform(&self) -> Platform {
        self.config.platform
    }

    /// Build the authorization URL.
    ///
    /// An empty `scopes` slice requests the provider's default scopes.
    pub fn authorize_url(&self, scopes: &[String]) -> AuthorizationRequest {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let scopes = if scopes.is_empty() {
            &self.config.default_scopes
        } else {
            scopes
        };

        let mut request = self
            .client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge)
            .add_scopes(scopes.iter().cloned().map(Scope::new));

        for (key, value) in &self.config.extra_auth_params {
            request = request.add_extra_param(key.as_str(), value.as_str());
        }

        let (url, csrf_state) = request.url();

        AuthorizationRequest {
            url: url.to_string(),
            csrf_state: csrf_state.secret().clone(),
            pkce_verifier: Secret::new(pkce_verifier.secret().clone()),
        }
    }

    /// Exchange an authorization code and resolve the user.
    pub async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &Secret,
    ) -> Result<Grant, OAuthError> {
        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.expose().to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| OAuthError::Exchange {
                message: e.to_string(),
            })?;

        let access_token = Secret::new(token_result.access_token().secret().clone());
        let refresh_token = token_result
            .refresh_token()
            .map(|t| Secret::new(t.secret().clone()));
        let expires_in = token_result
            .expires_in()
            .map(chrono::Duration::from_std)
            .transpose()
            .map_err(|e| OAuthError::Exchange {
                message: format!("invalid expiration duration: {}", e),
            })?;

        if refresh_token.is_none() {
            tracing::warn!(
                platform = %self.config.platform,
                "Provider issued no refresh token; the session ends when the access token expires"
            );
        }

        let profile = fetch_profile(&self.http, &self.config, &access_token).await?;

        tracing::info!(platform = %self.config.platform, user = %profile.user.id, "Authorization completed");

        Ok(Grant {
            platform: self.config.platform,
            access_token,
            refresh_token,
            expires_in,
            user: profile.user,
            provider_account_id: profile.provider_account_id,
        })
    }
}
