//! Login Redirect Types
//!
//! The outcome of starting a login: the authorization URL to send the
//! user to, paired with the CSRF state cookie that must ride along on
//! the same response.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Name of the CSRF state cookie.
pub const STATE_COOKIE_NAME: &str = "oauth2-state";

/// Per-request options for building a login redirect.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RedirectOptions {
    /// Scopes to request. Replaces the descriptor's default scopes
    /// entirely when set; `None` keeps the defaults.
    pub scopes: Option<Vec<String>>,
    /// Extra authorization URL parameters. Override fixed descriptor
    /// parameters of the same name.
    pub params: Vec<(String, String)>,
}

impl RedirectOptions {
    /// Options that keep all descriptor defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the requested scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Add an extra authorization URL parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }
}

/// `SameSite` cookie attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Sent on top-level cross-site navigations. The OAuth2 callback is
    /// exactly such a navigation, so this is the default.
    Lax,
    /// Never sent cross-site. Breaks the callback on most browsers.
    Strict,
    /// Always sent; requires `Secure`.
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Lax => "Lax",
            Self::Strict => "Strict",
            Self::None => "None",
        }
    }
}

/// Attributes applied to the state cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieAttributes {
    /// Cookie path.
    pub path: String,
    /// Optional cookie domain.
    pub domain: Option<String>,
    /// Whether the cookie is hidden from script.
    pub http_only: bool,
    /// Whether the cookie is restricted to HTTPS.
    pub secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
    /// Optional lifetime. `None` makes it a session cookie.
    pub max_age: Option<Duration>,
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            domain: None,
            http_only: true,
            // Off by default so local plain-HTTP development works;
            // production deployments should turn it on.
            secure: false,
            same_site: SameSite::Lax,
            max_age: None,
        }
    }
}

impl CookieAttributes {
    /// Restrict the cookie to HTTPS.
    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    /// Set the cookie path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the cookie domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the cookie lifetime.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Set the `SameSite` policy.
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }
}

/// The CSRF state cookie to set on the redirect response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateCookie {
    /// Cookie name, always [`STATE_COOKIE_NAME`].
    pub name: &'static str,
    /// The state token. Identical to the `state` query parameter of the
    /// authorization URL.
    pub value: String,
    /// Cookie attributes.
    pub attributes: CookieAttributes,
}

impl StateCookie {
    /// Render the cookie as a `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut header = format!("{}={}", self.name, self.value);
        header.push_str("; Path=");
        header.push_str(&self.attributes.path);
        if let Some(domain) = &self.attributes.domain {
            header.push_str("; Domain=");
            header.push_str(domain);
        }
        if let Some(max_age) = self.attributes.max_age {
            header.push_str("; Max-Age=");
            header.push_str(&max_age.as_secs().to_string());
        }
        header.push_str("; SameSite=");
        header.push_str(self.attributes.same_site.as_str());
        if self.attributes.secure {
            header.push_str("; Secure");
        }
        if self.attributes.http_only {
            header.push_str("; HttpOnly");
        }
        header
    }
}

/// A login redirect: where to send the user, and the cookie to set.
#[derive(Clone, Debug)]
pub struct RedirectResponse {
    /// Fully assembled authorization URL for the `Location` header.
    pub location: String,
    /// CSRF state cookie for the `Set-Cookie` header.
    pub state_cookie: StateCookie,
}

impl RedirectResponse {
    /// The state token carried by both the URL and the cookie.
    pub fn state(&self) -> &str {
        &self.state_cookie.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(attributes: CookieAttributes) -> StateCookie {
        StateCookie {
            name: STATE_COOKIE_NAME,
            value: "abc123".to_string(),
            attributes,
        }
    }

    #[test]
    fn test_header_value_defaults() {
        let header = cookie(CookieAttributes::default()).header_value();
        assert_eq!(header, "oauth2-state=abc123; Path=/; SameSite=Lax; HttpOnly");
    }

    #[test]
    fn test_header_value_full() {
        let attributes = CookieAttributes::default()
            .secure()
            .with_path("/auth")
            .with_domain("app.example.com")
            .with_max_age(Duration::from_secs(300))
            .with_same_site(SameSite::Strict);
        let header = cookie(attributes).header_value();
        assert_eq!(
            header,
            "oauth2-state=abc123; Path=/auth; Domain=app.example.com; \
             Max-Age=300; SameSite=Strict; Secure; HttpOnly"
        );
    }

    #[test]
    fn test_options_builder() {
        let options = RedirectOptions::new()
            .with_scopes(["openid", "email"])
            .with_param("prompt", "consent");
        assert_eq!(
            options.scopes,
            Some(vec!["openid".to_string(), "email".to_string()])
        );
        assert_eq!(
            options.params,
            vec![("prompt".to_string(), "consent".to_string())]
        );
    }
}
