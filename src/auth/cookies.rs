use axum_extra::extract::cookie::{Cookie, SameSite};

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

/// HTTP-only, secure, cross-site cookie holding a signed token
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .build()
}

/// The same cookie, emptied and already expired
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = session_cookie(String::new());
    cookie.make_removal();
    cookie
}
