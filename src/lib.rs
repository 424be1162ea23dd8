//! # Social Login Integration
//!
//! OAuth2 authorization-code "social login" engine. One data-driven
//! provider type covers Google, GitHub and any other RFC 6749 provider;
//! CSRF protection is stateless, carried entirely by a cookie.
//!
//! ## Features
//!
//! - **Data-driven providers**: a provider is a [`ProviderDescriptor`]
//!   value (endpoints, scopes, fixed parameters), not a subclass
//! - **Stateless CSRF protection**: a random state token travels both as
//!   a cookie and as the `state` query parameter; the callback is only
//!   honored when the two match
//! - **Strict callback validation**: state first, provider-reported
//!   errors next, code exchange last; nothing touches the network until
//!   the callback is proven legitimate
//! - **Injectable transport**: [`HttpTransport`] seam with a `reqwest`
//!   production implementation and a recording mock for tests
//! - **Error taxonomy**: configuration, state, authorization, token,
//!   network and protocol failures are distinct types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use social_login_integration::{
//!     EnvConfigReader, ProviderDescriptor, RedirectOptions, SocialProvider,
//! };
//!
//! let google = ProviderDescriptor::new(
//!     "google",
//!     "https://accounts.google.com/o/oauth2/v2/auth",
//!     "https://oauth2.googleapis.com/token",
//! )
//! .with_default_scopes(["openid", "email", "profile"]);
//!
//! // Reads SOCIAL_GOOGLE_CLIENT_ID / _CLIENT_SECRET / _REDIRECT_URI.
//! let provider = SocialProvider::new(google, &EnvConfigReader::new())?;
//!
//! // Login route: send the user off and set the state cookie.
//! let redirect = provider.redirect(&RedirectOptions::new());
//! // -> 302 redirect.location, Set-Cookie: redirect.state_cookie.header_value()
//!
//! // Callback route: validate the callback and exchange the code.
//! let tokens = provider.get_tokens(&callback_request).await?;
//! ```
//!
//! ## Architecture
//!
//! - [`provider`] - the engine: `redirect()` and `get_tokens()`
//! - [`types`] - descriptors, redirect/callback/token values
//! - [`config`] - configuration readers and resolved credentials
//! - [`core`] - state token generation and the HTTP transport seam
//! - [`error`] - error taxonomy

pub mod config;
pub mod core;
pub mod error;
pub mod provider;
pub mod types;

pub use config::{ClientSettings, ConfigPaths, ConfigReader, EnvConfigReader, MapConfigReader};
pub use crate::core::{
    generate_state_token, HttpBody, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
    MockHttpTransport, ReqwestHttpTransport,
};
pub use error::{
    AuthorizationError, ConfigurationError, InvalidStateError, NetworkError, ProtocolError,
    SocialAuthError, SocialResult, TokenError,
};
pub use provider::{SocialProvider, UserInfoAndTokens, UserInfoFetcher};
pub use types::{
    CallbackContext, CallbackRequest, CookieAttributes, ProviderDescriptor, RedirectOptions,
    RedirectResponse, SameSite, SocialTokens, StateCookie, TokenRequestStyle, STATE_COOKIE_NAME,
};
