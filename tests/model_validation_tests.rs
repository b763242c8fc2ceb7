use attendance_portal::{
    models::{AccessFlags, LoginSession, NavigationOutcome, Page, Route, SessionContext},
    pages,
};
use serde_json::json;

// --- Route Metadata Schema ---

#[test]
fn test_route_serializes_with_front_end_meta_keys() {
    let route = Route::new(
        "/admin/classes",
        "ClassManagement",
        Page::ClassManagement,
        AccessFlags::role("teacher"),
    );

    let value = serde_json::to_value(&route).unwrap();

    assert_eq!(
        value,
        json!({
            "path": "/admin/classes",
            "name": "ClassManagement",
            "page": "ClassManagement",
            "meta": { "requiresAuth": true, "requiresGuest": false, "role": "teacher" }
        })
    );
}

#[test]
fn test_access_flags_missing_keys_default_to_open() {
    let flags: AccessFlags = serde_json::from_value(json!({})).unwrap();
    assert_eq!(flags, AccessFlags::open());

    let flags: AccessFlags = serde_json::from_value(json!({ "requiresGuest": true })).unwrap();
    assert_eq!(flags, AccessFlags::guest());
}

#[test]
fn test_navigation_outcome_wire_names() {
    assert_eq!(
        serde_json::to_value(NavigationOutcome::RedirectToLogin).unwrap(),
        json!("redirect_to_login")
    );
    assert_eq!(
        serde_json::to_value(NavigationOutcome::Proceed).unwrap(),
        json!("proceed")
    );
}

#[test]
fn test_login_session_accepts_back_end_token_response() {
    // Shape of the back-end's login response.
    let session: LoginSession = serde_json::from_value(json!({
        "access_token": "abc.def.ghi",
        "token_type": "bearer",
        "user_role": "teacher",
        "teacher_id": 4
    }))
    .unwrap();

    assert_eq!(session.access_token, "abc.def.ghi");
    assert_eq!(session.user_role, "teacher");
}

#[test]
fn test_session_context_normalizes_empty_values() {
    let session = SessionContext::new(Some(String::new()), Some(String::new()));

    assert_eq!(session, SessionContext::anonymous());
}

// --- Page Shell ---

#[test]
fn test_route_meta_injected_before_head_close() {
    let route = Route::new("/", "Home", Page::Home, AccessFlags::open());

    let html = pages::inject_route_meta("<html><head></head><body></body></html>", &route);

    assert_eq!(
        html,
        r#"<html><head><meta name="x-route" content="Home"></head><body></body></html>"#
    );
}

#[test]
fn test_route_meta_prepended_without_head() {
    let route = Route::new("/", "Home", Page::Home, AccessFlags::open());

    let html = pages::inject_route_meta("<div id=\"app\"></div>", &route);

    assert!(html.starts_with(r#"<meta name="x-route" content="Home">"#));
}

#[test]
fn test_fallback_shell_escapes_attributes() {
    let route = Route::new("/x", "A\"<b>", Page::Home, AccessFlags::open());

    let html = pages::fallback_shell(&route);

    assert!(html.contains(r#"data-route="A&quot;&lt;b&gt;""#));
    assert!(!html.contains("<b>"));
}
