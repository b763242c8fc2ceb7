use attendance_portal::{
    AppState, MockUpstream, RouteTable,
    config::{AppConfig, Env},
    models::SessionContext,
    session::{self, Session},
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, Method, Request, header, request::Parts},
};
use std::sync::Arc;

// --- Helper Functions ---

fn create_app_state(env: Env) -> AppState {
    let mut config = AppConfig::default();
    config.env = env;

    AppState {
        routes: Arc::new(RouteTable::standard().unwrap()),
        upstream: Arc::new(MockUpstream::new()),
        config,
    }
}

fn get_request_parts(cookies: &[&str]) -> Parts {
    let mut builder = Request::builder().method(Method::GET).uri("/attendance");
    for cookie in cookies {
        builder = builder.header(header::COOKIE, *cookie);
    }
    let (parts, _) = builder.body(axum::body::Body::empty()).unwrap().into_parts();
    parts
}

async fn extract(parts: &mut Parts, state: &AppState) -> SessionContext {
    let Session(context) = Session::from_request_parts(parts, state).await.unwrap();
    context
}

// --- Extractor Tests ---

#[tokio::test]
async fn test_session_from_cookies() {
    let state = create_app_state(Env::Production);
    let mut parts = get_request_parts(&["theme=dark; token=abc.def.ghi; userRole=teacher"]);

    let session = extract(&mut parts, &state).await;

    assert_eq!(session.token.as_deref(), Some("abc.def.ghi"));
    assert_eq!(session.role.as_deref(), Some("teacher"));
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_session_across_multiple_cookie_headers() {
    let state = create_app_state(Env::Production);
    let mut parts = get_request_parts(&["token=abc", "userRole=student"]);

    let session = extract(&mut parts, &state).await;

    assert_eq!(session.token.as_deref(), Some("abc"));
    assert_eq!(session.role.as_deref(), Some("student"));
}

#[tokio::test]
async fn test_missing_cookies_is_anonymous() {
    let state = create_app_state(Env::Production);
    let mut parts = get_request_parts(&[]);

    let session = extract(&mut parts, &state).await;

    assert_eq!(session, SessionContext::anonymous());
}

#[tokio::test]
async fn test_empty_token_cookie_is_anonymous() {
    let state = create_app_state(Env::Production);
    let mut parts = get_request_parts(&["token=; userRole="]);

    let session = extract(&mut parts, &state).await;

    assert!(!session.is_authenticated());
    assert!(session.role.is_none());
}

#[tokio::test]
async fn test_cookie_name_must_match_exactly() {
    let state = create_app_state(Env::Production);
    let mut parts = get_request_parts(&["xtoken=abc; userRoles=teacher"]);

    let session = extract(&mut parts, &state).await;

    assert_eq!(session, SessionContext::anonymous());
}

#[tokio::test]
async fn test_local_override_headers() {
    let state = create_app_state(Env::Local);
    let mut parts = get_request_parts(&["token=cookie-token; userRole=student"]);
    parts.headers.insert(
        session::ROLE_OVERRIDE_HEADER,
        HeaderValue::from_static("teacher"),
    );

    let session = extract(&mut parts, &state).await;

    // Token still comes from the cookie, role from the override.
    assert_eq!(session.token.as_deref(), Some("cookie-token"));
    assert_eq!(session.role.as_deref(), Some("teacher"));
}

#[tokio::test]
async fn test_override_headers_ignored_in_production() {
    let state = create_app_state(Env::Production);
    let mut parts = get_request_parts(&[]);
    parts.headers.insert(
        session::TOKEN_OVERRIDE_HEADER,
        HeaderValue::from_static("forged"),
    );
    parts.headers.insert(
        session::ROLE_OVERRIDE_HEADER,
        HeaderValue::from_static("teacher"),
    );

    let session = extract(&mut parts, &state).await;

    assert_eq!(session, SessionContext::anonymous());
}

// --- Cookie Builders ---

#[test]
fn test_session_cookie_attributes() {
    let local = session::session_cookie("token", "abc", &Env::Local).unwrap();
    assert_eq!(local, "token=abc; Path=/; SameSite=Lax; HttpOnly");

    let prod = session::session_cookie("userRole", "student", &Env::Production).unwrap();
    assert_eq!(prod, "userRole=student; Path=/; SameSite=Lax; HttpOnly; Secure");
}

#[test]
fn test_session_cookie_rejects_unsafe_values() {
    assert!(session::session_cookie("token", "", &Env::Local).is_none());
    assert!(session::session_cookie("token", "a b", &Env::Local).is_none());
    assert!(session::session_cookie("token", "a;b", &Env::Local).is_none());
    assert!(session::session_cookie("token", "a\"b", &Env::Local).is_none());
    assert!(session::session_cookie("token", "naïve", &Env::Local).is_none());
}

#[test]
fn test_clearing_cookie_expires_immediately() {
    let cookie = session::clearing_cookie("token", &Env::Local).unwrap();
    assert_eq!(cookie, "token=; Max-Age=0; Path=/; SameSite=Lax; HttpOnly");
}

#[test]
fn test_clearing_cookie_rejects_unrepresentable_name() {
    assert!(session::clearing_cookie("bad\nname", &Env::Local).is_none());
}
