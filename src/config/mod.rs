//! Configuration
//!
//! Credential resolution for social providers. Client id, client secret
//! and redirect URI are never hardcoded in a descriptor; they are looked
//! up through a [`ConfigReader`] at engine construction so that a
//! missing value fails fast, before any redirect is issued.

use std::collections::HashMap;
use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Source of configuration values, keyed by dotted path
/// (e.g. `social.google.client_id`).
pub trait ConfigReader: Send + Sync {
    /// Look up a configuration value. `None` means the key is absent.
    fn get(&self, path: &str) -> Option<String>;
}

/// Reads configuration from environment variables.
///
/// A dotted path maps to an upper-snake variable name:
/// `social.google.client_id` is read from `SOCIAL_GOOGLE_CLIENT_ID`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvConfigReader;

impl EnvConfigReader {
    /// Create a new environment-backed reader.
    pub fn new() -> Self {
        Self
    }

    fn variable_name(path: &str) -> String {
        path.chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl ConfigReader for EnvConfigReader {
    fn get(&self, path: &str) -> Option<String> {
        std::env::var(Self::variable_name(path)).ok()
    }
}

/// In-memory reader backed by a map. Intended for tests and for
/// applications that load configuration through their own machinery.
#[derive(Clone, Debug, Default)]
pub struct MapConfigReader {
    values: HashMap<String, String>,
}

impl MapConfigReader {
    /// Create an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style.
    pub fn with(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(path.into(), value.into());
        self
    }
}

impl From<HashMap<String, String>> for MapConfigReader {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl ConfigReader for MapConfigReader {
    fn get(&self, path: &str) -> Option<String> {
        self.values.get(path).cloned()
    }
}

/// Configuration paths a provider's credentials are read from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPaths {
    /// Path of the OAuth2 client id.
    pub client_id: String,
    /// Path of the OAuth2 client secret.
    pub client_secret: String,
    /// Path of the registered redirect URI.
    pub redirect_uri: String,
}

impl ConfigPaths {
    /// Standard paths under a common prefix: `{prefix}.client_id`,
    /// `{prefix}.client_secret` and `{prefix}.redirect_uri`.
    pub fn under(prefix: &str) -> Self {
        Self {
            client_id: format!("{prefix}.client_id"),
            client_secret: format!("{prefix}.client_secret"),
            redirect_uri: format!("{prefix}.redirect_uri"),
        }
    }
}

/// Resolved OAuth2 client credentials.
#[derive(Clone)]
pub struct ClientSettings {
    /// OAuth2 client id.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: SecretString,
    /// Redirect URI registered with the provider.
    pub redirect_uri: String,
}

impl ClientSettings {
    /// Resolve credentials through a reader. Any absent key is a
    /// [`ConfigurationError::MissingKey`].
    pub fn resolve(
        paths: &ConfigPaths,
        reader: &dyn ConfigReader,
    ) -> Result<Self, ConfigurationError> {
        let client_id = Self::require(reader, &paths.client_id)?;
        let client_secret = Self::require(reader, &paths.client_secret)?;
        let redirect_uri = Self::require(reader, &paths.redirect_uri)?;

        Ok(Self {
            client_id,
            client_secret: SecretString::new(client_secret),
            redirect_uri,
        })
    }

    fn require(reader: &dyn ConfigReader, path: &str) -> Result<String, ConfigurationError> {
        reader.get(path).ok_or_else(|| ConfigurationError::MissingKey {
            key: path.to_string(),
        })
    }
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}
