use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderValue, header, request::Parts},
};

use crate::{
    config::{AppConfig, Env},
    models::SessionContext,
};

/// Cookie holding the opaque session token issued by the back-end login.
pub const TOKEN_COOKIE: &str = "token";
/// Cookie holding the role string returned alongside the token.
pub const ROLE_COOKIE: &str = "userRole";

/// Local-only header overriding the token cookie.
pub const TOKEN_OVERRIDE_HEADER: &str = "x-session-token";
/// Local-only header overriding the role cookie.
pub const ROLE_OVERRIDE_HEADER: &str = "x-session-role";

/// Session Extractor Result
///
/// The session state observed for a single request. Handlers pass the inner
/// `SessionContext` to the guard; the extractor itself never rejects, since a missing
/// session is the ordinary anonymous state.
#[derive(Debug, Clone, Default)]
pub struct Session(pub SessionContext);

/// Session Extractor Implementation
///
/// Reads the `token` and `userRole` cookies. In `Env::Local`, the `x-session-token` and
/// `x-session-role` headers take precedence so pages can be exercised with curl without
/// a login round-trip. The override is ignored in production.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let mut token = cookie_value(parts, TOKEN_COOKIE);
        let mut role = cookie_value(parts, ROLE_COOKIE);

        if config.env == Env::Local {
            if let Some(value) = header_value(parts, TOKEN_OVERRIDE_HEADER) {
                token = Some(value);
            }
            if let Some(value) = header_value(parts, ROLE_OVERRIDE_HEADER) {
                role = Some(value);
            }
        }

        Ok(Session(SessionContext::new(token, role)))
    }
}

/// cookie_value
///
/// Finds `name` across every `Cookie` header of the request. The first occurrence wins,
/// matching how browsers order cookies with the most specific path first.
pub fn cookie_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// is_valid_cookie_value
///
/// Cookie values may not contain whitespace, quotes, commas, semicolons or backslashes
/// (RFC 6265 cookie-octet), nor control characters.
pub fn is_valid_cookie_value(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_graphic() && !matches!(b, b'"' | b',' | b';' | b'\\'))
}

/// session_cookie
///
/// Builds a `Set-Cookie` value storing `value` under `name` for the whole site.
/// Returns `None` when the value cannot be carried by a cookie.
pub fn session_cookie(name: &str, value: &str, env: &Env) -> Option<HeaderValue> {
    if !is_valid_cookie_value(value) {
        return None;
    }
    HeaderValue::from_str(&format!("{name}={value}{}", cookie_attributes(env))).ok()
}

/// clearing_cookie
///
/// Builds a `Set-Cookie` value that expires `name` immediately (logout).
/// Returns `None` when `name` cannot be carried by a header.
pub fn clearing_cookie(name: &str, env: &Env) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("{name}=; Max-Age=0{}", cookie_attributes(env))).ok()
}

fn cookie_attributes(env: &Env) -> &'static str {
    match env {
        Env::Local => "; Path=/; SameSite=Lax; HttpOnly",
        Env::Production => "; Path=/; SameSite=Lax; HttpOnly; Secure",
    }
}
