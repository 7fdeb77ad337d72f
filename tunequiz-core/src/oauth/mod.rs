//! Authorization-code grant issuance.
//!
//! - [`authorization`] - Authorization URL with PKCE, code exchange
//! - [`profile`] - Turning a platform profile into a verified identity
//!
//! The output of a completed handshake is a [`crate::token::Grant`], which is
//! fed into [`crate::session::token_callback`].

pub mod authorization;
pub mod profile;

pub use authorization::{AuthorizationFlow, AuthorizationRequest};

use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl, basic::BasicClient};
use thiserror::Error;

use crate::provider::ProviderConfig;
use crate::store::Secret;

/// Error type for grant issuance.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Provider endpoints or client settings are unusable.
    #[error("invalid OAuth configuration: {message}")]
    Configuration { message: String },

    /// The authorization code could not be exchanged.
    #[error("token exchange failed: {message}")]
    Exchange { message: String },

    /// The profile endpoint failed or returned an unexpected body.
    #[error("failed to fetch user profile: {message}")]
    Profile { message: String },

    /// The profile carries no email address.
    #[error("the account has no email address")]
    MissingEmail,

    /// The provider reports the email address as unverified.
    #[error("email address {email} is not verified")]
    UnverifiedEmail { email: String },
}

/// Create an OAuth2 client from a provider configuration.
pub fn create_oauth_client(
    config: &ProviderConfig,
    client_id: &str,
    client_secret: Option<&Secret>,
    redirect_uri: Option<&str>,
) -> Result<BasicClient, OAuthError> {
    let auth_url = AuthUrl::new(config.auth_url.clone()).map_err(|e| OAuthError::Configuration {
        message: format!("invalid auth URL: {}", e),
    })?;

    let token_url =
        TokenUrl::new(config.token_url.clone()).map_err(|e| OAuthError::Configuration {
            message: format!("invalid token URL: {}", e),
        })?;

    let mut client = BasicClient::new(
        ClientId::new(client_id.to_string()),
        client_secret.map(|s| ClientSecret::new(s.expose().to_string())),
        auth_url,
        Some(token_url),
    );

    if let Some(redirect) = redirect_uri {
        let redirect_url =
            RedirectUrl::new(redirect.to_string()).map_err(|e| OAuthError::Configuration {
                message: format!("invalid redirect URL: {}", e),
            })?;
        client = client.set_redirect_uri(redirect_url);
    }

    Ok(client)
}
