//! CSRF state token generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::Rng;

/// Number of random bytes in a state token.
const STATE_TOKEN_BYTES: usize = 32;

/// Generate an unguessable state token for CSRF protection.
///
/// 32 bytes from the thread-local CSPRNG, base64url encoded without
/// padding so the token is safe in both a query parameter and a cookie
/// value.
pub fn generate_state_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; STATE_TOKEN_BYTES] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}
