//! Provider Descriptors
//!
//! A provider is pure data: endpoints, default scopes and fixed
//! parameters. Supporting a new provider means writing a descriptor,
//! not a subclass, so provider quirks (comma-separated scopes, extra
//! audience parameters, form-encoded token requests) are all expressed
//! here.

use serde::{Deserialize, Serialize};

use crate::config::ConfigPaths;

/// How the token exchange request carries its parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRequestStyle {
    /// POST with parameters in the URL query string.
    #[default]
    QueryParams,
    /// POST with an `application/x-www-form-urlencoded` body
    /// (RFC 6749 section 4.1.3).
    FormBody,
    /// POST with a JSON body.
    JsonBody,
}

/// Declarative description of an OAuth2 provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Short provider name used in config paths and telemetry
    /// (e.g. `google`).
    pub name: String,
    /// Authorization endpoint the end user is redirected to.
    pub authorization_endpoint: String,
    /// Token endpoint the authorization code is exchanged at.
    pub token_endpoint: String,
    /// Scopes requested when the caller supplies none.
    #[serde(default)]
    pub default_scopes: Vec<String>,
    /// Separator used to join scopes into the `scope` parameter.
    /// RFC 6749 says space; some providers want a comma.
    #[serde(default = "default_scope_separator")]
    pub scope_separator: char,
    /// Fixed parameters always added to the authorization URL.
    #[serde(default)]
    pub base_authorization_params: Vec<(String, String)>,
    /// Fixed parameters always sent with the token exchange.
    #[serde(default)]
    pub base_token_params: Vec<(String, String)>,
    /// Encoding of the token exchange request.
    #[serde(default)]
    pub token_request_style: TokenRequestStyle,
    /// Where the client credentials are read from.
    pub config_paths: ConfigPaths,
}

fn default_scope_separator() -> char {
    ' '
}

impl ProviderDescriptor {
    /// Create a descriptor with credentials under `social.{name}` and
    /// RFC defaults for everything else.
    pub fn new(
        name: impl Into<String>,
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let config_paths = ConfigPaths::under(&format!("social.{name}"));
        Self {
            name,
            authorization_endpoint: authorization_endpoint.into(),
            token_endpoint: token_endpoint.into(),
            default_scopes: Vec::new(),
            scope_separator: default_scope_separator(),
            base_authorization_params: Vec::new(),
            base_token_params: Vec::new(),
            token_request_style: TokenRequestStyle::default(),
            config_paths,
        }
    }

    /// Set the scopes requested when the caller supplies none.
    pub fn with_default_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the scope separator.
    pub fn with_scope_separator(mut self, separator: char) -> Self {
        self.scope_separator = separator;
        self
    }

    /// Add a fixed authorization URL parameter.
    pub fn with_base_authorization_param(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.base_authorization_params
            .push((name.into(), value.into()));
        self
    }

    /// Add a fixed token exchange parameter.
    pub fn with_base_token_param(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.base_token_params.push((name.into(), value.into()));
        self
    }

    /// Set the token exchange encoding.
    pub fn with_token_request_style(mut self, style: TokenRequestStyle) -> Self {
        self.token_request_style = style;
        self
    }

    /// Override the configuration paths.
    pub fn with_config_paths(mut self, paths: ConfigPaths) -> Self {
        self.config_paths = paths;
        self
    }
}
