//! Data types exchanged with the engine.

pub mod descriptor;
pub mod redirect;
pub mod request;
pub mod tokens;

pub use descriptor::{ProviderDescriptor, TokenRequestStyle};
pub use redirect::{
    CookieAttributes, RedirectOptions, RedirectResponse, SameSite, StateCookie, STATE_COOKIE_NAME,
};
pub use request::{CallbackContext, CallbackRequest};
pub use tokens::SocialTokens;
