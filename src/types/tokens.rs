//! Token Types
//!
//! The token endpoint's successful answer. Providers attach all sorts
//! of extra fields (`expires_in`, `scope`, `id_token`, vendor data);
//! everything not modelled explicitly is preserved in `extra` so
//! nothing the provider said is lost.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tokens returned by a successful authorization-code exchange.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SocialTokens {
    /// The access token.
    pub access_token: String,
    /// Token type as reported by the provider, usually `bearer`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Refresh token, when the provider issues one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// All other response fields, verbatim.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl SocialTokens {
    /// Token type, defaulting to `bearer` when the provider omitted it
    /// (RFC 6749 providers are required to send it; some do not).
    pub fn token_type_or_bearer(&self) -> &str {
        self.token_type.as_deref().unwrap_or("bearer")
    }

    /// Look up a passthrough field by name.
    pub fn extra_field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}
