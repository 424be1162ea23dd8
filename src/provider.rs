//! Social Login Engine
//!
//! The authorization-code flow engine. One [`SocialProvider`] value per
//! configured provider serves two operations: [`redirect`] starts a
//! login by producing the authorization URL and its CSRF state cookie,
//! and [`get_tokens`] finishes it by validating the callback and
//! exchanging the authorization code at the token endpoint.
//!
//! [`redirect`]: SocialProvider::redirect
//! [`get_tokens`]: SocialProvider::get_tokens

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{ClientSettings, ConfigReader};
use crate::core::state::generate_state_token;
use crate::core::transport::{HttpBody, HttpRequest, HttpTransport, ReqwestHttpTransport};
use crate::error::{
    AuthorizationError, ConfigurationError, InvalidStateError, ProtocolError, SocialAuthError,
    SocialResult, TokenError,
};
use crate::types::descriptor::{ProviderDescriptor, TokenRequestStyle};
use crate::types::redirect::{
    CookieAttributes, RedirectOptions, RedirectResponse, StateCookie, STATE_COOKIE_NAME,
};
use crate::types::request::CallbackContext;
use crate::types::tokens::SocialTokens;

/// Strategy for turning freshly exchanged tokens into a user profile.
///
/// Each provider shapes its user-info endpoint differently, so the
/// lookup is injected rather than baked into the engine. The profile
/// comes back as raw JSON; mapping it onto an application's user model
/// is the embedder's job.
#[async_trait]
pub trait UserInfoFetcher: Send + Sync {
    /// Fetch the user profile reachable with `tokens`.
    async fn user_from_tokens(&self, tokens: &SocialTokens) -> SocialResult<Value>;
}

/// Result of [`SocialProvider::get_user_info`]: the profile together
/// with the tokens that fetched it.
#[derive(Clone, Debug)]
pub struct UserInfoAndTokens {
    /// Raw user profile as returned by the fetcher.
    pub user_info: Value,
    /// Tokens from the code exchange.
    pub tokens: SocialTokens,
}

/// OAuth2 authorization-code flow engine for one provider.
///
/// Stateless and immutable after construction; share one instance
/// across request handlers with `Arc`. CSRF correlation lives entirely
/// in the state cookie, so no server-side session store is involved.
pub struct SocialProvider<T: HttpTransport = ReqwestHttpTransport> {
    descriptor: ProviderDescriptor,
    settings: ClientSettings,
    authorization_endpoint: Url,
    token_endpoint: Url,
    cookie_attributes: CookieAttributes,
    transport: Arc<T>,
}

impl SocialProvider<ReqwestHttpTransport> {
    /// Create an engine with the default `reqwest` transport.
    ///
    /// Credentials are resolved through `config` immediately; a missing
    /// key or malformed endpoint fails here, not on the first login.
    pub fn new(descriptor: ProviderDescriptor, config: &dyn ConfigReader) -> SocialResult<Self> {
        let transport = Arc::new(ReqwestHttpTransport::new()?);
        Self::with_transport(descriptor, config, transport)
    }
}

impl<T: HttpTransport> SocialProvider<T> {
    /// Create an engine with an injected transport.
    pub fn with_transport(
        descriptor: ProviderDescriptor,
        config: &dyn ConfigReader,
        transport: Arc<T>,
    ) -> SocialResult<Self> {
        let settings = ClientSettings::resolve(&descriptor.config_paths, config)?;
        let authorization_endpoint = parse_endpoint(&descriptor.authorization_endpoint)?;
        let token_endpoint = parse_endpoint(&descriptor.token_endpoint)?;
        Ok(Self {
            descriptor,
            settings,
            authorization_endpoint,
            token_endpoint,
            cookie_attributes: CookieAttributes::default(),
            transport,
        })
    }

    /// Replace the state cookie attributes (deployment policy such as
    /// `Secure` or a custom path).
    pub fn with_cookie_attributes(mut self, attributes: CookieAttributes) -> Self {
        self.cookie_attributes = attributes;
        self
    }

    /// Provider name, as used in config paths and telemetry.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// The descriptor this engine was built from.
    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    /// Start a login: build the authorization URL and its state cookie.
    ///
    /// Pure computation. The returned URL carries `response_type=code`,
    /// the client id, the redirect URI, a fresh state token and the
    /// effective scopes; the same state token is the cookie value, which
    /// is what ties the eventual callback to this redirect.
    pub fn redirect(&self, options: &RedirectOptions) -> RedirectResponse {
        let state = generate_state_token();

        let scopes = options
            .scopes
            .as_ref()
            .unwrap_or(&self.descriptor.default_scopes);

        let mut params: Vec<(String, String)> = vec![
            ("response_type".to_string(), "code".to_string()),
            ("client_id".to_string(), self.settings.client_id.clone()),
            ("redirect_uri".to_string(), self.settings.redirect_uri.clone()),
            ("state".to_string(), state.clone()),
        ];
        if !scopes.is_empty() {
            let separator = self.descriptor.scope_separator.to_string();
            params.push(("scope".to_string(), scopes.join(separator.as_str())));
        }
        for (name, value) in &self.descriptor.base_authorization_params {
            upsert(&mut params, name, value);
        }
        for (name, value) in &options.params {
            upsert(&mut params, name, value);
        }

        let mut location = self.authorization_endpoint.clone();
        {
            let mut pairs = location.query_pairs_mut();
            for (name, value) in &params {
                pairs.append_pair(name, value);
            }
        }

        debug!(provider = %self.descriptor.name, "built login redirect");

        RedirectResponse {
            location: location.to_string(),
            state_cookie: StateCookie {
                name: STATE_COOKIE_NAME,
                value: state,
                attributes: self.cookie_attributes.clone(),
            },
        }
    }

    /// Finish a login: validate the callback and exchange the code.
    ///
    /// Checks run in a fixed order, each short-circuiting before any
    /// network traffic: (1) the state cookie must equal the `state`
    /// query parameter, (2) a provider-reported `error` becomes
    /// [`AuthorizationError`], (3) the `code` parameter must be
    /// present. Only then is the token endpoint called; a non-2xx
    /// answer becomes [`TokenError`] with the response body verbatim.
    #[instrument(skip(self, ctx), fields(provider = %self.descriptor.name))]
    pub async fn get_tokens(&self, ctx: &dyn CallbackContext) -> SocialResult<SocialTokens> {
        let cookie_state = ctx.cookie(STATE_COOKIE_NAME);
        let query_state = ctx.query("state");
        let state_ok = matches!(
            (cookie_state, query_state),
            (Some(cookie), Some(query)) if !cookie.is_empty() && cookie == query
        );
        if !state_ok {
            warn!("state cookie and state query parameter mismatch");
            return Err(InvalidStateError.into());
        }

        if let Some(error) = ctx.query("error") {
            let error = AuthorizationError {
                error: error.to_string(),
                description: ctx.query("error_description").map(String::from),
                uri: ctx.query("error_uri").map(String::from),
            };
            warn!(code = %error.error, "provider reported an authorization error");
            return Err(error.into());
        }

        let code = ctx
            .query("code")
            .ok_or_else(|| SocialAuthError::InvalidRequest {
                message: "callback is missing the `code` query parameter".to_string(),
            })?;

        debug!("exchanging authorization code");
        let response = self.transport.send(self.token_request(code)).await?;

        if !response.is_success() {
            warn!(status = response.status, "token endpoint rejected the exchange");
            return Err(TokenError {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        serde_json::from_value(response.body).map_err(|e| {
            SocialAuthError::Protocol(ProtocolError::InvalidTokenResponse {
                message: e.to_string(),
            })
        })
    }

    /// Finish a login and fetch the user profile in one call.
    #[instrument(skip(self, ctx, fetcher), fields(provider = %self.descriptor.name))]
    pub async fn get_user_info(
        &self,
        ctx: &dyn CallbackContext,
        fetcher: &dyn UserInfoFetcher,
    ) -> SocialResult<UserInfoAndTokens> {
        let tokens = self.get_tokens(ctx).await?;
        let user_info = fetcher.user_from_tokens(&tokens).await?;
        Ok(UserInfoAndTokens { user_info, tokens })
    }

    fn token_request(&self, code: &str) -> HttpRequest {
        let mut params: Vec<(String, String)> = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("code".to_string(), code.to_string()),
            ("redirect_uri".to_string(), self.settings.redirect_uri.clone()),
            ("client_id".to_string(), self.settings.client_id.clone()),
            (
                "client_secret".to_string(),
                self.settings.client_secret.expose_secret().clone(),
            ),
        ];
        for (name, value) in &self.descriptor.base_token_params {
            upsert(&mut params, name, value);
        }

        let request = match self.descriptor.token_request_style {
            TokenRequestStyle::QueryParams => {
                let mut url = self.token_endpoint.clone();
                {
                    let mut pairs = url.query_pairs_mut();
                    for (name, value) in &params {
                        pairs.append_pair(name, value);
                    }
                }
                HttpRequest::post(url.to_string())
            }
            TokenRequestStyle::FormBody => {
                HttpRequest::post(self.token_endpoint.as_str()).with_body(HttpBody::Form(params))
            }
            TokenRequestStyle::JsonBody => {
                let body: serde_json::Map<String, Value> = params
                    .into_iter()
                    .map(|(name, value)| (name, Value::String(value)))
                    .collect();
                HttpRequest::post(self.token_endpoint.as_str())
                    .with_body(HttpBody::Json(Value::Object(body)))
            }
        };
        // GitHub answers in form encoding unless JSON is asked for.
        request.with_header("accept", "application/json")
    }
}

fn parse_endpoint(url: &str) -> Result<Url, ConfigurationError> {
    Url::parse(url).map_err(|source| ConfigurationError::InvalidEndpoint {
        url: url.to_string(),
        source,
    })
}

/// Insert a parameter, replacing the value of an existing one with the
/// same name. Later writers win; insertion order is preserved.
fn upsert(params: &mut Vec<(String, String)>, name: &str, value: &str) {
    if let Some(entry) = params.iter_mut().find(|(n, _)| n.as_str() == name) {
        entry.1 = value.to_string();
    } else {
        params.push((name.to_string(), value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::config::MapConfigReader;
    use crate::core::transport::MockHttpTransport;
    use crate::types::redirect::SameSite;
    use crate::types::request::CallbackRequest;

    const AUTH_ENDPOINT: &str = "https://id.acme.test/authorize";
    const TOKEN_ENDPOINT: &str = "https://id.acme.test/token";

    fn create_descriptor() -> ProviderDescriptor {
        ProviderDescriptor::new("acme", AUTH_ENDPOINT, TOKEN_ENDPOINT)
    }

    fn create_reader() -> MapConfigReader {
        MapConfigReader::new()
            .with("social.acme.client_id", "an_id")
            .with("social.acme.client_secret", "a_secret")
            .with("social.acme.redirect_uri", "https://app.example.com/callback")
    }

    fn create_provider(descriptor: ProviderDescriptor) -> SocialProvider<MockHttpTransport> {
        let transport = Arc::new(MockHttpTransport::new());
        SocialProvider::with_transport(descriptor, &create_reader(), transport)
            .expect("test provider should construct")
    }

    fn query_map(location: &str) -> HashMap<String, String> {
        Url::parse(location)
            .expect("redirect location should be a valid URL")
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_redirect_carries_required_params() {
        let provider = create_provider(create_descriptor());
        let response = provider.redirect(&RedirectOptions::new());

        assert!(response.location.starts_with(AUTH_ENDPOINT));
        let query = query_map(&response.location);
        assert_eq!(query.get("response_type").map(String::as_str), Some("code"));
        assert_eq!(query.get("client_id").map(String::as_str), Some("an_id"));
        assert_eq!(
            query.get("redirect_uri").map(String::as_str),
            Some("https://app.example.com/callback")
        );
        // The raw location percent-encodes the redirect URI.
        assert!(response
            .location
            .contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback"));
    }

    #[test]
    fn test_redirect_omits_scope_when_none_configured() {
        let provider = create_provider(create_descriptor());
        let response = provider.redirect(&RedirectOptions::new());
        assert!(!query_map(&response.location).contains_key("scope"));
    }

    #[test]
    fn test_redirect_joins_default_scopes_with_space() {
        let provider =
            create_provider(create_descriptor().with_default_scopes(["scope1", "scope2"]));
        let response = provider.redirect(&RedirectOptions::new());
        assert_eq!(
            query_map(&response.location).get("scope").map(String::as_str),
            Some("scope1 scope2")
        );
    }

    #[test]
    fn test_redirect_respects_custom_scope_separator() {
        let provider = create_provider(
            create_descriptor()
                .with_default_scopes(["scope1", "scope2"])
                .with_scope_separator(','),
        );
        let response = provider.redirect(&RedirectOptions::new());
        assert_eq!(
            query_map(&response.location).get("scope").map(String::as_str),
            Some("scope1,scope2")
        );
    }

    #[test]
    fn test_redirect_scopes_option_replaces_defaults() {
        let provider =
            create_provider(create_descriptor().with_default_scopes(["scope1", "scope2"]));
        let response =
            provider.redirect(&RedirectOptions::new().with_scopes(["only_this"]));
        assert_eq!(
            query_map(&response.location).get("scope").map(String::as_str),
            Some("only_this")
        );
    }

    #[test]
    fn test_redirect_empty_scopes_option_omits_scope() {
        let provider =
            create_provider(create_descriptor().with_default_scopes(["scope1", "scope2"]));
        let response =
            provider.redirect(&RedirectOptions::new().with_scopes(Vec::<String>::new()));
        assert!(!query_map(&response.location).contains_key("scope"));
    }

    #[test]
    fn test_redirect_state_matches_cookie() {
        let provider = create_provider(create_descriptor());
        let response = provider.redirect(&RedirectOptions::new());
        let query = query_map(&response.location);
        assert_eq!(query.get("state").map(String::as_str), Some(response.state()));
        assert!(!response.state().is_empty());
        assert_eq!(response.state_cookie.name, STATE_COOKIE_NAME);
    }

    #[test]
    fn test_redirect_states_are_fresh_per_call() {
        let provider = create_provider(create_descriptor());
        let first = provider.redirect(&RedirectOptions::new());
        let second = provider.redirect(&RedirectOptions::new());
        assert_ne!(first.state(), second.state());
    }

    #[test]
    fn test_redirect_applies_custom_cookie_attributes() {
        let attributes = CookieAttributes::default()
            .secure()
            .with_path("/auth")
            .with_max_age(Duration::from_secs(300))
            .with_same_site(SameSite::Strict);
        let provider =
            create_provider(create_descriptor()).with_cookie_attributes(attributes.clone());

        let response = provider.redirect(&RedirectOptions::new());
        assert_eq!(response.state_cookie.attributes, attributes);

        let header = response.state_cookie.header_value();
        assert!(header.contains("Path=/auth"));
        assert!(header.contains("Max-Age=300"));
        assert!(header.contains("SameSite=Strict"));
        assert!(header.contains("; Secure"));
    }

    #[test]
    fn test_redirect_uses_default_cookie_attributes_when_unset() {
        let provider = create_provider(create_descriptor());
        let response = provider.redirect(&RedirectOptions::new());
        assert_eq!(response.state_cookie.attributes, CookieAttributes::default());
    }

    #[test]
    fn test_redirect_base_params_and_caller_override() {
        let provider = create_provider(
            create_descriptor()
                .with_base_authorization_param("foo", "bar")
                .with_base_authorization_param("access_type", "offline"),
        );

        let plain = provider.redirect(&RedirectOptions::new());
        assert_eq!(query_map(&plain.location).get("foo").map(String::as_str), Some("bar"));

        let overridden =
            provider.redirect(&RedirectOptions::new().with_param("foo", "bar2"));
        let query = query_map(&overridden.location);
        assert_eq!(query.get("foo").map(String::as_str), Some("bar2"));
        assert_eq!(query.get("access_type").map(String::as_str), Some("offline"));
        // No duplicate foo left behind.
        let foo_count = Url::parse(&overridden.location)
            .unwrap()
            .query_pairs()
            .filter(|(k, _)| k == "foo")
            .count();
        assert_eq!(foo_count, 1);
    }

    #[test]
    fn test_construction_fails_on_missing_config_key() {
        let reader = MapConfigReader::new().with("social.acme.client_id", "an_id");
        let err = SocialProvider::with_transport(
            create_descriptor(),
            &reader,
            Arc::new(MockHttpTransport::new()),
        )
        .err()
        .expect("construction should fail");
        assert!(matches!(
            err,
            SocialAuthError::Configuration(ConfigurationError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_construction_fails_on_invalid_endpoint() {
        let descriptor = ProviderDescriptor::new("acme", "not a url", TOKEN_ENDPOINT);
        let err = SocialProvider::with_transport(
            descriptor,
            &create_reader(),
            Arc::new(MockHttpTransport::new()),
        )
        .err()
        .expect("construction should fail");
        assert!(matches!(
            err,
            SocialAuthError::Configuration(ConfigurationError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_token_request_query_style() {
        let provider = create_provider(
            create_descriptor().with_base_token_param("audience", "api.acme.test"),
        );
        let request = provider.token_request("an_auth_code");

        assert!(request.body.is_none());
        assert_eq!(
            request.query_param("grant_type").as_deref(),
            Some("authorization_code")
        );
        assert_eq!(request.query_param("code").as_deref(), Some("an_auth_code"));
        assert_eq!(request.query_param("client_secret").as_deref(), Some("a_secret"));
        assert_eq!(request.query_param("audience").as_deref(), Some("api.acme.test"));
    }

    #[test]
    fn test_token_request_form_style() {
        let provider = create_provider(
            create_descriptor().with_token_request_style(TokenRequestStyle::FormBody),
        );
        let request = provider.token_request("an_auth_code");

        assert_eq!(request.url, TOKEN_ENDPOINT);
        match request.body {
            Some(HttpBody::Form(ref pairs)) => {
                let grant = ("grant_type".to_string(), "authorization_code".to_string());
                assert!(pairs.contains(&grant));
                assert!(pairs.contains(&("code".to_string(), "an_auth_code".to_string())));
            }
            ref other => panic!("expected form body, got {other:?}"),
        }
    }

    #[test]
    fn test_token_request_json_style() {
        let provider = create_provider(
            create_descriptor().with_token_request_style(TokenRequestStyle::JsonBody),
        );
        let request = provider.token_request("an_auth_code");

        match request.body {
            Some(HttpBody::Json(ref body)) => {
                assert_eq!(body["grant_type"], "authorization_code");
                assert_eq!(body["client_id"], "an_id");
            }
            ref other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[test]
    fn test_token_request_asks_for_json() {
        let provider = create_provider(create_descriptor());
        let request = provider.token_request("an_auth_code");
        assert!(request
            .headers
            .iter()
            .any(|(n, v)| n == "accept" && v == "application/json"));
    }

    #[tokio::test]
    async fn test_get_tokens_rejects_empty_states_even_when_equal() {
        let provider = create_provider(create_descriptor());
        let request = CallbackRequest::new()
            .with_cookie(STATE_COOKIE_NAME, "")
            .with_query("state", "")
            .with_query("code", "an_auth_code");
        let err = provider.get_tokens(&request).await.unwrap_err();
        assert!(matches!(err, SocialAuthError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_get_tokens_missing_code_is_invalid_request() {
        let transport = Arc::new(MockHttpTransport::new());
        let provider = SocialProvider::with_transport(
            create_descriptor(),
            &create_reader(),
            Arc::clone(&transport),
        )
        .unwrap();

        let request = CallbackRequest::new()
            .with_cookie(STATE_COOKIE_NAME, "xyz")
            .with_query("state", "xyz");
        let err = provider.get_tokens(&request).await.unwrap_err();
        assert!(matches!(err, SocialAuthError::InvalidRequest { .. }));
        assert_eq!(transport.request_count(), 0);
    }
}
