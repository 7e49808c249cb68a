//! Session identity.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Identity provider a user signed in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Apple,
    Mock,
}

impl Provider {
    /// Wire name of the provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Apple => "apple",
            Self::Mock => "mock",
        }
    }

    /// Human-readable name with a capitalized first letter.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Apple => "Apple",
            Self::Mock => "Mock",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown provider name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown provider '{0}' (expected google, apple or mock)")]
pub struct ProviderParseError(String);

impl FromStr for Provider {
    type Err = ProviderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "apple" => Ok(Self::Apple),
            "mock" => Ok(Self::Mock),
            other => Err(ProviderParseError(other.to_owned())),
        }
    }
}

/// A signed-in user.
///
/// Serialized with camelCase keys (`displayName`, `photoURL`) so that
/// sessions written by earlier clients restore unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub provider: Provider,
}

impl User {
    /// Fabricate the deterministic user for a mocked provider sign-in.
    #[must_use]
    pub fn mock(provider: Provider) -> Self {
        Self {
            id: UserId::new(format!("mock-user-id-{provider}")),
            email: Some(format!("mockuser@{provider}.com")),
            display_name: Some(format!("Mock {} User", provider.title())),
            photo_url: None,
            provider,
        }
    }

    /// Name to show in the account section.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or("User")
    }
}
