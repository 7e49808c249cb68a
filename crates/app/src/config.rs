//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! Nothing is required: a missing credential disables the matching feature
//! and is reported by [`AppConfig::warnings`].
//!
//! ## Generative recipes
//! - `GEMINI_API_KEY` - Gemini API key
//! - `GEMINI_MODEL` - Model id (default: gemini-2.5-flash-preview-04-17)
//! - `GEMINI_API_BASE_URL` - API base (default: <https://generativelanguage.googleapis.com>)
//!
//! ## Recipe search
//! - `ALGOLIA_APP_ID` - Algolia application id
//! - `ALGOLIA_SEARCH_KEY` - Search-only API key
//! - `ALGOLIA_INDEX_NAME` - Index name (default: recipes)
//! - `ALGOLIA_HOST` - API base override (default: https://{app id}-dsn.algolia.net)
//!
//! ## Storage
//! - `COOKMATE_DATA_DIR` - Directory holding the persisted state (default: .cookmate)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-04-17";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_ALGOLIA_INDEX: &str = "recipes";
pub const DEFAULT_DATA_DIR: &str = ".cookmate";

pub const GEMINI_MISSING_WARNING: &str = "Gemini API key is not configured. AI features may not work.";
pub const ALGOLIA_INCOMPLETE_WARNING: &str =
    "Algolia configuration is incomplete. Recipe search may be limited to local data.";

/// Prefixes of template values such as `your-api-key-here` (case-insensitive).
const PLACEHOLDER_PREFIXES: &[&str] = &[
    "your-",
    "your_",
    "put-your",
    "add-your",
    "insert-",
    "insert_",
    "replace-",
    "replace_",
    "<",
];

/// Whole values that stand in for a missing credential (case-insensitive).
const PLACEHOLDER_VALUES: &[&str] = &[
    "changeme",
    "change-me",
    "placeholder",
    "todo",
    "tbd",
    "none",
    "null",
    "api-key",
    "apikey",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory for the file-backed key-value store
    pub data_dir: PathBuf,
    /// Generative text API configuration
    pub gemini: GeminiConfig,
    /// Search index configuration
    pub algolia: AlgoliaConfig,
}

/// Gemini API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key; `None` disables generation
    pub api_key: Option<SecretString>,
    /// Model identifier
    pub model: String,
    /// API base URL
    pub base_url: Url,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Algolia search configuration.
///
/// Search is only attempted when application id, search key and index
/// name are all present. Implements `Debug` manually to redact the key.
#[derive(Clone, Default)]
pub struct AlgoliaConfig {
    /// Application id
    pub app_id: Option<String>,
    /// Search-only API key
    pub search_key: Option<SecretString>,
    /// Index to query
    pub index_name: Option<String>,
    /// Explicit API base, otherwise derived from the application id
    pub host: Option<Url>,
}

impl std::fmt::Debug for AlgoliaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgoliaConfig")
            .field("app_id", &self.app_id)
            .field("search_key", &self.search_key.as_ref().map(|_| "[REDACTED]"))
            .field("index_name", &self.index_name)
            .field("host", &self.host.as_ref().map(Url::as_str))
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a URL variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a URL variable cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| get_optional(&lookup, key);

        let data_dir = PathBuf::from(get("COOKMATE_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));

        let gemini = GeminiConfig {
            api_key: get_credential(&lookup, "GEMINI_API_KEY"),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: parse_url(
                "GEMINI_API_BASE_URL",
                &get("GEMINI_API_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            )?,
        };

        let algolia = AlgoliaConfig {
            app_id: get("ALGOLIA_APP_ID"),
            search_key: get_credential(&lookup, "ALGOLIA_SEARCH_KEY"),
            index_name: Some(
                get("ALGOLIA_INDEX_NAME").unwrap_or_else(|| DEFAULT_ALGOLIA_INDEX.to_string()),
            ),
            host: get("ALGOLIA_HOST")
                .map(|host| parse_url("ALGOLIA_HOST", &host))
                .transpose()?,
        };

        Ok(Self {
            data_dir,
            gemini,
            algolia,
        })
    }

    /// Human-readable warnings for features degraded by missing settings.
    #[must_use]
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.gemini.api_key.is_none() {
            warnings.push(GEMINI_MISSING_WARNING);
        }
        if !self.algolia.is_configured() {
            warnings.push(ALGOLIA_INCOMPLETE_WARNING);
        }
        warnings
    }
}

impl AlgoliaConfig {
    /// Whether all three settings needed for remote search are present.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.app_id.is_some() && self.search_key.is_some() && self.index_name.is_some()
    }

    /// API base URL: the explicit host or `https://{app id}-dsn.algolia.net`.
    #[must_use]
    pub fn base_url(&self) -> Option<Url> {
        if let Some(host) = &self.host {
            return Some(host.clone());
        }
        let app_id = self.app_id.as_deref()?;
        Url::parse(&format!("https://{}-dsn.algolia.net", app_id.to_lowercase())).ok()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable, treating blank values as absent.
fn get_optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get an optional credential, discarding obvious placeholders.
fn get_credential(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<SecretString> {
    let value = get_optional(lookup, key)?;
    if let Some(pattern) = placeholder_pattern(&value) {
        tracing::warn!(
            variable = key,
            pattern,
            "ignoring credential that looks like a placeholder"
        );
        return None;
    }
    Some(SecretString::from(value))
}

/// Return the placeholder `value` matches, if any.
///
/// Only whole values and leading template text count. A real key that
/// merely contains "todo" or "xxx" somewhere is kept.
fn placeholder_pattern(value: &str) -> Option<&'static str> {
    let lower = value.to_lowercase();
    if lower.chars().all(|c| c == 'x' || c == '*') {
        return Some("masked");
    }
    PLACEHOLDER_VALUES
        .iter()
        .copied()
        .find(|placeholder| lower == *placeholder)
        .or_else(|| {
            PLACEHOLDER_PREFIXES
                .iter()
                .copied()
                .find(|prefix| lower.starts_with(prefix))
        })
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
