use std::{net::IpAddr, sync::Arc};

use axum::{
    Router,
    extract::{FromRef, Request, State},
    handler::HandlerWithoutStateExt,
    http::{HeaderName, HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core host components.
pub mod config;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod proxy;
pub mod session;

// Route table, split by access tier (Public, Authenticated, Admin).
pub mod routes;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use proxy::{HyperUpstream, MockUpstream, UpstreamState};
pub use routes::RouteTable;
use session::Session;

/// ApiDoc
///
/// Auto-generates the OpenAPI document for the host's JSON endpoints. Served at
/// `/docs/openapi.json`, outside the `/api` proxy prefix.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_routes, handlers::resolve_navigation,
        handlers::create_session, handlers::clear_session
    ),
    components(
        schemas(
            models::Route, models::AccessFlags, models::Page, models::NavigationOutcome,
            models::ResolveRequest, models::ResolveResponse, models::LoginSession,
        )
    ),
    tags(
        (name = "attendance-portal", description = "Attendance front-end host")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container shared by every request: the validated route table,
/// the upstream transport for `/api` and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub upstream: UpstreamState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// host_check
///
/// Rejects requests whose `Host` is neither local (`localhost`, `*.localhost`, an IP
/// literal) nor listed in `allowed_hosts`. Blocks DNS-rebinding against a dev host bound
/// to all interfaces. Requests without a Host header pass.
async fn host_check(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match host {
        Some(host) if !is_allowed_host(&host, &state.config.allowed_hosts) => {
            tracing::warn!(host = %host, "Blocked request from a host that is not allowed");
            (
                StatusCode::FORBIDDEN,
                format!("Blocked request. The host \"{host}\" is not allowed."),
            )
                .into_response()
        }
        _ => next.run(request).await,
    }
}

/// is_allowed_host
///
/// `host` is a raw Host header value, with or without a port. An allow-list entry with a
/// leading dot (`.example.com`) admits that domain and every subdomain of it.
pub fn is_allowed_host(host: &str, allowed_hosts: &[String]) -> bool {
    let hostname = strip_port(host).to_ascii_lowercase();

    if hostname == "localhost" || hostname.ends_with(".localhost") {
        return true;
    }
    let bare = hostname.trim_start_matches('[').trim_end_matches(']');
    if bare.parse::<IpAddr>().is_ok() {
        return true;
    }
    allowed_hosts.iter().any(|allowed| {
        let allowed = allowed.to_ascii_lowercase();
        match allowed.strip_prefix('.') {
            Some(domain) => hostname == domain || hostname.ends_with(&allowed),
            None => hostname == allowed,
        }
    })
}

fn strip_port(host: &str) -> &str {
    // Bracketed IPv6 literal, with or without a port.
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

/// page_routes
///
/// Registers one `GET` route per route table entry, plus its trailing-slash form
/// (`/records/` serves the same guarded page as `/records`). Each handler owns its
/// `Route` and runs the guard before rendering.
fn page_routes(table: &RouteTable) -> Router<AppState> {
    table
        .routes()
        .iter()
        .cloned()
        .fold(Router::new(), |router, route| {
            let path = route.path.clone();
            let route = Arc::new(route);
            let page = get(move |session: Session, State(state): State<AppState>| {
                let route = Arc::clone(&route);
                async move { handlers::navigate(&route, session, &state).await }
            });

            let router = router.route(&path, page.clone());
            if path.ends_with('/') {
                router
            } else {
                router.route(&format!("{path}/"), page)
            }
        })
}

/// create_router
///
/// Assembles the host: JSON endpoints, one page route per table entry, static assets
/// with a redirect-home fallback, the `/api` proxy and the observability layers.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration: only the configured origins may call cross-origin.
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(AllowOrigin::list(origins));

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Static assets: built scripts, styles and images. Anything missing goes home.
    let assets = ServeDir::new(&state.config.asset_dir)
        .fallback(handlers::redirect_home.into_service());

    // 3. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(|| async { "ok" }))
        .route("/nav/routes", get(handlers::list_routes))
        .route("/nav/resolve", post(handlers::resolve_navigation))
        .route(
            "/session",
            post(handlers::create_session).delete(handlers::clear_session),
        )
        .merge(page_routes(&state.routes))
        .fallback_service(assets)
        // The proxy wraps every route and the fallback, so nothing can shadow the prefix.
        .layer(middleware::from_fn_with_state(state.clone(), proxy::api_proxy))
        .layer(middleware::from_fn_with_state(state.clone(), host_check))
        .with_state(state);

    // 4. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span, correlating every log line of a request through its
/// `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
