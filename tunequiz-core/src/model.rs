//! Domain model types for Tunequiz.
//!
//! This module defines the identifiers shared by every other module:
//! - [`Platform`] - The external platform a session or playlist belongs to
//! - [`SessionId`] - Opaque identifier of one authenticated browser session
//! - [`UserIdentity`] - The user as exposed to the UI layer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The two platforms Tunequiz can authenticate against and write to.
///
/// # Examples
///
/// ```
/// use tunequiz_core::Platform;
///
/// let platform: Platform = "YouTube".parse().unwrap();
/// assert_eq!(platform, Platform::Youtube);
/// assert_eq!(platform.as_str(), "youtube");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// YouTube, authorized through Google OAuth.
    Youtube,
    /// Spotify.
    Spotify,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Platform; 2] = [Platform::Youtube, Platform::Spotify];

    /// Lowercase identifier used in routes and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Spotify => "spotify",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown platform name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "youtube" => Ok(Platform::Youtube),
            "spotify" => Ok(Platform::Spotify),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

/// Identifier for one authenticated session.
///
/// The value is opaque; the service layer chooses the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a session ID from an existing value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the session ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// The authenticated user as visible to callers.
///
/// `id` is always the verified email address, never the platform's own
/// subject identifier, so the identity survives re-authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Stable identifier (the verified email).
    pub id: String,

    /// Verified email address.
    pub email: String,

    /// Display name, if the platform provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Avatar URL, if the platform provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl UserIdentity {
    /// Build an identity keyed by a verified email address.
    pub fn from_verified_email(
        email: impl Into<String>,
        name: Option<String>,
        image: Option<String>,
    ) -> Self {
        let email = email.into();
        Self {
            id: email.clone(),
            email,
            name,
            image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse_is_case_insensitive() {
        assert_eq!("SPOTIFY".parse::<Platform>().unwrap(), Platform::Spotify);
        assert_eq!(" youtube ".parse::<Platform>().unwrap(), Platform::Youtube);
        assert!("vimeo".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_serde_lowercase() {
        let json = serde_json::to_string(&Platform::Youtube).unwrap();
        assert_eq!(json, "\"youtube\"");
    }

    #[test]
    fn test_identity_id_is_email() {
        let user = UserIdentity::from_verified_email("ada@example.com", Some("Ada".into()), None);
        assert_eq!(user.id, "ada@example.com");
        assert_eq!(user.email, "ada@example.com");

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("image").is_none());
    }
}
