//! Core building blocks: state token generation and the HTTP transport
//! seam.

pub mod state;
pub mod transport;

pub use state::generate_state_token;
pub use transport::{
    HttpBody, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport,
};
