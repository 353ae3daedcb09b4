//! Session tokens for the order listing gate.
//!
//! Tokens are HS256 JWTs carried in the `token` cookie. `POST /jwt` issues one
//! from whatever claims the client sends, `POST /signOut` expires the cookie,
//! and [`crate::handlers::require_token`] verifies it.

pub mod cookies;
pub mod tokens;

pub use cookies::{removal_cookie, session_cookie, TOKEN_COOKIE};
pub use tokens::{AuthError, AuthResult, Claims, TokenService};
