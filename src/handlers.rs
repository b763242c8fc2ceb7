use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState, guard,
    models::{LoginSession, NavigationOutcome, ResolveRequest, ResolveResponse, Route, SessionContext},
    pages,
    session::{self, ROLE_COOKIE, Session, TOKEN_COOKIE},
};

// --- Page Navigation ---

/// navigate
///
/// [Page Route] Runs the navigation guard for `route` against the request's session.
/// A navigation that proceeds renders the page shell; a refused one answers
/// `303 See Other` towards `/login` or `/`.
pub async fn navigate(route: &Route, Session(session): Session, state: &AppState) -> Response {
    match guard::evaluate(&route.access, &session) {
        NavigationOutcome::Proceed => {
            tracing::debug!(route = %route.name, "Navigation allowed");
            pages::render_page(route, &state.config.asset_dir)
                .await
                .into_response()
        }
        outcome => redirect_for(outcome, &route.name),
    }
}

/// redirect_home
///
/// Fallback for paths that match neither a route nor a built asset.
pub async fn redirect_home() -> Redirect {
    Redirect::to("/")
}

fn redirect_for(outcome: NavigationOutcome, route_name: &str) -> Response {
    let location = outcome.redirect_location().unwrap_or("/");
    tracing::debug!(route = %route_name, outcome = ?outcome, location, "Navigation redirected");
    Redirect::to(location).into_response()
}

// --- Navigation API ---

/// list_routes
///
/// [Public Route] Returns the full route table with its access metadata, in declaration
/// order. Front-end builds use it to check their own table against the host's.
#[utoipa::path(
    get,
    path = "/nav/routes",
    responses((status = 200, description = "Route table", body = [Route]))
)]
pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<Route>> {
    Json(state.routes.routes().to_vec())
}

/// resolve_navigation
///
/// [Public Route] Evaluates the guard for `path` with an explicit session instead of the
/// request cookies. `path` may carry a query or fragment. Unmatched paths report no route
/// and a redirect home.
#[utoipa::path(
    post,
    path = "/nav/resolve",
    request_body = ResolveRequest,
    responses((status = 200, description = "Guard decision", body = ResolveResponse))
)]
pub async fn resolve_navigation(
    State(state): State<AppState>,
    Json(payload): Json<ResolveRequest>,
) -> Json<ResolveResponse> {
    let session = SessionContext::new(payload.token, payload.role);
    let resolution = guard::resolve(&state.routes, &payload.path, &session);

    Json(ResolveResponse {
        route: resolution.route.map(|route| route.name.clone()),
        outcome: resolution.outcome,
        location: resolution
            .outcome
            .redirect_location()
            .map(str::to_string),
    })
}

// --- Session Cookies ---

/// create_session
///
/// [Public Route] Stores the back-end login result as the `token` and `userRole` cookies.
/// The token must be a non-empty cookie-safe string; a role that cannot be stored is
/// rejected rather than silently dropped.
#[utoipa::path(
    post,
    path = "/session",
    request_body = LoginSession,
    responses(
        (status = 204, description = "Session cookies set"),
        (status = 400, description = "Token or role cannot be stored in a cookie")
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<LoginSession>,
) -> Result<(StatusCode, HeaderMap), (StatusCode, &'static str)> {
    let env = &state.config.env;

    let token_cookie = session::session_cookie(TOKEN_COOKIE, &payload.access_token, env)
        .ok_or((StatusCode::BAD_REQUEST, "access_token is not a valid cookie value"))?;
    let role_cookie = session::session_cookie(ROLE_COOKIE, &payload.user_role, env)
        .ok_or((StatusCode::BAD_REQUEST, "user_role is not a valid cookie value"))?;

    let mut headers = HeaderMap::new();
    headers.append(header::SET_COOKIE, token_cookie);
    headers.append(header::SET_COOKIE, role_cookie);

    tracing::info!(role = %payload.user_role, "Session stored");
    Ok((StatusCode::NO_CONTENT, headers))
}

/// clear_session
///
/// [Public Route] Logout: expires both session cookies. Idempotent.
#[utoipa::path(
    delete,
    path = "/session",
    responses((status = 204, description = "Session cookies cleared"))
)]
pub async fn clear_session(State(state): State<AppState>) -> (StatusCode, HeaderMap) {
    let env = &state.config.env;

    let mut headers = HeaderMap::new();
    for cookie in [TOKEN_COOKIE, ROLE_COOKIE]
        .into_iter()
        .filter_map(|name| session::clearing_cookie(name, env))
    {
        headers.append(header::SET_COOKIE, cookie);
    }

    tracing::info!("Session cleared");
    (StatusCode::NO_CONTENT, headers)
}
