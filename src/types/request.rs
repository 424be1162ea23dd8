//! Callback Request Types
//!
//! What the engine needs to see of the provider's callback request:
//! cookies and query parameters, nothing else. Web frameworks implement
//! [`CallbackContext`] over their own request type; [`CallbackRequest`]
//! is a ready-made owned implementation.

use std::collections::HashMap;

use crate::types::redirect::{StateCookie, STATE_COOKIE_NAME};

/// Read-only view of the callback request.
pub trait CallbackContext: Send + Sync {
    /// Value of the cookie with the given name, if present.
    fn cookie(&self, name: &str) -> Option<&str>;

    /// Value of the query parameter with the given name, if present.
    fn query(&self, name: &str) -> Option<&str>;
}

/// Owned callback request built from parts.
#[derive(Clone, Debug, Default)]
pub struct CallbackRequest {
    cookies: HashMap<String, String>,
    query: HashMap<String, String>,
}

impl CallbackRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from the full callback URL, decoding its query
    /// string. Cookies must still be added separately.
    pub fn from_callback_url(url: &str) -> Result<Self, url::ParseError> {
        let parsed = url::Url::parse(url)?;
        let query = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Ok(Self {
            cookies: HashMap::new(),
            query,
        })
    }

    /// Add a query parameter, builder style.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Add a cookie, builder style.
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Attach the state cookie from a login redirect.
    pub fn with_state_cookie(self, cookie: &StateCookie) -> Self {
        self.with_cookie(STATE_COOKIE_NAME, cookie.value.clone())
    }
}

impl CallbackContext for CallbackRequest {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}
