//! Profile lookup after a code exchange.
//!
//! Google exposes an OpenID Connect userinfo document, Spotify its `/me`
//! resource. Both are reduced to a [`UserIdentity`] keyed by the verified
//! email plus the platform's own account id.

use serde::Deserialize;

use super::OAuthError;
use crate::model::{Platform, UserIdentity};
use crate::provider::ProviderConfig;
use crate::store::Secret;

/// Identity resolved from a profile endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    pub user: UserIdentity,
    pub provider_account_id: String,
}

/// OpenID Connect userinfo claims.
#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub sub: String,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl GoogleUserInfo {
    pub fn into_profile(self) -> Result<ResolvedProfile, OAuthError> {
        let email = non_empty(self.email).ok_or(OAuthError::MissingEmail)?;
        if self.email_verified == Some(false) {
            return Err(OAuthError::UnverifiedEmail { email });
        }
        Ok(ResolvedProfile {
            user: UserIdentity::from_verified_email(email, self.name, self.picture),
            provider_account_id: self.sub,
        })
    }
}

/// Spotify's current-user object.
#[derive(Debug, Deserialize)]
pub struct SpotifyUser {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

impl SpotifyUser {
    /// Spotify only returns emails it has verified.
    pub fn into_profile(self) -> Result<ResolvedProfile, OAuthError> {
        let email = non_empty(self.email).ok_or(OAuthError::MissingEmail)?;
        let image = self.images.into_iter().next().map(|i| i.url);
        Ok(ResolvedProfile {
            user: UserIdentity::from_verified_email(email, self.display_name, image),
            provider_account_id: self.id,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Fetch the signed-in user's profile with a fresh access token.
pub async fn fetch_profile(
    http: &reqwest::Client,
    config: &ProviderConfig,
    access_token: &Secret,
) -> Result<ResolvedProfile, OAuthError> {
    let response = http
        .get(&config.userinfo_url)
        .bearer_auth(access_token.expose())
        .send()
        .await
        .map_err(|e| OAuthError::Profile {
            message: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(OAuthError::Profile {
            message: format!("{} returned {}: {}", config.userinfo_url, status, body),
        });
    }

    let profile = match config.platform {
        Platform::Youtube => response
            .json::<GoogleUserInfo>()
            .await
            .map_err(profile_decode_error)?
            .into_profile(),
        Platform::Spotify => response
            .json::<SpotifyUser>()
            .await
            .map_err(profile_decode_error)?
            .into_profile(),
    }?;

    tracing::debug!(
        platform = %config.platform,
        account = %profile.provider_account_id,
        "Resolved user profile"
    );
    Ok(profile)
}

fn profile_decode_error(e: reqwest::Error) -> OAuthError {
    OAuthError::Profile {
        message: format!("unexpected profile body: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_google_profile_uses_email_as_id() {
        let info: GoogleUserInfo = serde_json::from_value(json!({
            "sub": "1098",
            "email": "ada@example.com",
            "email_verified": true,
            "name": "Ada",
            "picture": "https://img.example.com/ada.png"
        }))
        .unwrap();

        let profile = info.into_profile().unwrap();
        assert_eq!(profile.user.id, "ada@example.com");
        assert_eq!(profile.user.image.as_deref(), Some("https://img.example.com/ada.png"));
        assert_eq!(profile.provider_account_id, "1098");
    }

    #[test]
    fn test_google_unverified_email_rejected() {
        let info: GoogleUserInfo = serde_json::from_value(json!({
            "sub": "1098",
            "email": "ada@example.com",
            "email_verified": false
        }))
        .unwrap();

        assert!(matches!(
            info.into_profile(),
            Err(OAuthError::UnverifiedEmail { .. })
        ));
    }

    #[test]
    fn test_spotify_profile_without_email_rejected() {
        let user: SpotifyUser = serde_json::from_value(json!({
            "id": "ada",
            "display_name": "Ada"
        }))
        .unwrap();

        assert!(matches!(user.into_profile(), Err(OAuthError::MissingEmail)));
    }

    #[test]
    fn test_spotify_profile_keeps_account_id() {
        let user: SpotifyUser = serde_json::from_value(json!({
            "id": "ada",
            "email": "ada@example.com",
            "display_name": "Ada",
            "images": [{ "url": "https://i.scdn.co/image/ada" }]
        }))
        .unwrap();

        let profile = user.into_profile().unwrap();
        assert_eq!(profile.user.id, "ada@example.com");
        assert_eq!(profile.user.name.as_deref(), Some("Ada"));
        assert_eq!(profile.provider_account_id, "ada");
    }
}
