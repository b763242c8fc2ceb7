//! `/api` forwarding to the attendance back-end.
//!
//! # Responsibilities
//! - Intercept every request whose path starts with the configured prefix
//! - Rewrite the URI onto the back-end origin, keeping path and query untouched
//! - Optionally rewrite `Host` to the back-end authority (change-origin)
//! - Stream the upstream response back unchanged
//!
//! The transport sits behind the `Upstream` trait so router tests can swap the
//! hyper client for `MockUpstream`.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, Method, StatusCode, Uri, Version, header,
        uri::{PathAndQuery, Scheme},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::AppState;

/// Headers scoped to a single connection, never forwarded.
const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Errors that can occur while forwarding a request upstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The configured target cannot be combined with the request URI.
    #[error("Invalid upstream target: {0}")]
    InvalidTarget(String),

    /// Connection refused, reset, or a malformed upstream response.
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// No response head within the configured timeout.
    #[error("Upstream timed out after {0} seconds")]
    Timeout(u64),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidTarget(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

// 1. Upstream Contract
/// Upstream
///
/// Sends an already-rewritten request to the back-end and returns its response.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn forward(&self, request: Request<Body>) -> Result<Response, ProxyError>;
}

/// UpstreamState
///
/// The concrete type used to share the upstream transport across the application state.
pub type UpstreamState = Arc<dyn Upstream>;

// 2. The Real Implementation (hyper client)
/// HyperUpstream
///
/// Plain-HTTP/1.1 client with a pooled connector. The timeout bounds the wait for the
/// response head; the body streams back without a deadline.
#[derive(Clone)]
pub struct HyperUpstream {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl HyperUpstream {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, timeout }
    }
}

#[async_trait]
impl Upstream for HyperUpstream {
    async fn forward(&self, request: Request<Body>) -> Result<Response, ProxyError> {
        match tokio::time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let (parts, body) = response.into_parts();
                Ok(Response::from_parts(parts, Body::new(body)))
            }
            Ok(Err(e)) => Err(ProxyError::Upstream(e.to_string())),
            Err(_) => Err(ProxyError::Timeout(self.timeout.as_secs())),
        }
    }
}

// 3. The Mock Implementation (For Router Tests)
/// RecordedRequest
///
/// What `MockUpstream` saw for one forwarded request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// MockUpstream
///
/// Records every forwarded request and answers with a canned status and body, or with
/// a simulated connection failure.
#[derive(Default)]
pub struct MockUpstream {
    /// When true, every forward fails with `ProxyError::Upstream`.
    pub should_fail: bool,
    pub status: Option<StatusCode>,
    pub body: String,
    recorded: Mutex<Vec<RecordedRequest>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self {
            status: Some(StatusCode::OK),
            body: "{\"ok\":true}".to_string(),
            ..Self::default()
        }
    }

    /// Answers every forward with `status` and `body`.
    pub fn responding(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Requests forwarded so far, oldest first.
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.recorded
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn forward(&self, request: Request<Body>) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        if let Ok(mut requests) = self.recorded.lock() {
            requests.push(RecordedRequest {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body,
            });
        }

        if self.should_fail {
            return Err(ProxyError::Upstream(
                "Mock Upstream Error: Simulation requested".to_string(),
            ));
        }

        let status = self.status.unwrap_or(StatusCode::OK);
        Ok((status, self.body.clone()).into_response())
    }
}

/// prepare_upstream_request
///
/// Rewrites `request` onto `target`. The path and query are kept byte-for-byte; a base
/// path on the target (e.g. `http://backend/v2`) is prepended. With `change_origin`, the
/// `Host` header becomes the target authority, otherwise the client's Host is kept.
pub fn prepare_upstream_request(
    request: Request<Body>,
    target: &Uri,
    change_origin: bool,
) -> Result<Request<Body>, ProxyError> {
    let (mut parts, body) = request.into_parts();

    let authority = target
        .authority()
        .cloned()
        .ok_or_else(|| ProxyError::InvalidTarget(target.to_string()))?;
    let scheme = target.scheme().cloned().unwrap_or(Scheme::HTTP);

    let original = parts
        .uri
        .path_and_query()
        .map(PathAndQuery::as_str)
        .unwrap_or("/");
    let base = target.path().trim_end_matches('/');
    let path_and_query: PathAndQuery = format!("{base}{original}")
        .parse()
        .map_err(|e: axum::http::uri::InvalidUri| ProxyError::InvalidTarget(e.to_string()))?;

    parts.uri = Uri::builder()
        .scheme(scheme)
        .authority(authority.clone())
        .path_and_query(path_and_query)
        .build()
        .map_err(|e| ProxyError::InvalidTarget(e.to_string()))?;
    // The connector only speaks HTTP/1.1, whatever the client used.
    parts.version = Version::HTTP_11;

    for name in HOP_BY_HOP {
        parts.headers.remove(name);
    }

    if change_origin {
        let host = HeaderValue::from_str(authority.as_str())
            .map_err(|e| ProxyError::InvalidTarget(e.to_string()))?;
        parts.headers.insert(header::HOST, host);
    }

    Ok(Request::from_parts(parts, body))
}

/// api_proxy
///
/// Middleware forwarding every request under `config.api_prefix` to the back-end. The
/// prefix test is a plain string prefix, so with the default `/api` both `/api/...` and
/// `/api-v2` are forwarded. Other requests continue down the router.
pub async fn api_proxy(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !request.uri().path().starts_with(&state.config.api_prefix) {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let upstream_request = match prepare_upstream_request(
        request,
        &state.config.api_target,
        state.config.change_origin,
    ) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(method = %method, path = %path, error = %e, "Cannot build upstream request");
            return e.into_response();
        }
    };

    tracing::debug!(
        method = %method,
        path = %path,
        upstream = %upstream_request.uri(),
        "Proxying request"
    );

    match state.upstream.forward(upstream_request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(method = %method, path = %path, error = %e, "Upstream error");
            e.into_response()
        }
    }
}
