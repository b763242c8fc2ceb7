use std::{env, path::PathBuf, time::Duration};

use axum::http::Uri;

/// Local development back-end (the attendance API server).
const DEFAULT_API_TARGET: &str = "http://127.0.0.1:8090";

/// AppConfig
///
/// Holds the host's entire configuration state. Immutable once loaded and shared with
/// every request through `AppState`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the session header override and cookie flags.
    pub env: Env,
    // Socket address the page host listens on.
    pub bind_addr: String,
    // Requests whose path starts with this prefix are forwarded to `api_target`.
    pub api_prefix: String,
    // Origin (scheme + authority) of the attendance back-end.
    pub api_target: Uri,
    // Rewrite the Host header to the target authority when forwarding.
    pub change_origin: bool,
    // Upper bound on a single proxied exchange.
    pub proxy_timeout: Duration,
    // Directory holding the built front-end (index.html, scripts, images).
    pub asset_dir: PathBuf,
    // Extra Host header values accepted besides localhost and IP literals.
    pub allowed_hosts: Vec<String>,
    // Origins allowed to make cross-origin requests.
    pub allowed_origins: Vec<String>,
}

/// Env
///
/// Defines the runtime context, switching between developer conveniences (session
/// override headers, plain-HTTP cookies) and production hardening.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking configuration for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:5173".to_string(),
            api_prefix: "/api".to_string(),
            api_target: Uri::from_static(DEFAULT_API_TARGET),
            change_origin: true,
            proxy_timeout: Duration::from_secs(30),
            asset_dir: PathBuf::from("dist"),
            allowed_hosts: Vec::new(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics on malformed values, and in production when `API_PROXY_TARGET` is unset,
    /// so the host never starts forwarding traffic to a guessed back-end.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let target = match env {
            Env::Production => env::var("API_PROXY_TARGET")
                .expect("FATAL: API_PROXY_TARGET must be set in production."),
            Env::Local => {
                env::var("API_PROXY_TARGET").unwrap_or_else(|_| DEFAULT_API_TARGET.to_string())
            }
        };
        let api_target = parse_target(&target);

        let api_prefix = env::var("API_PROXY_PREFIX").unwrap_or_else(|_| "/api".to_string());
        if !api_prefix.starts_with('/') {
            panic!("FATAL: API_PROXY_PREFIX must start with '/', got `{api_prefix}`.");
        }

        let change_origin = match env::var("API_PROXY_CHANGE_ORIGIN") {
            Ok(value) => parse_bool(&value)
                .expect("FATAL: API_PROXY_CHANGE_ORIGIN must be true or false."),
            Err(_) => true,
        };

        let proxy_timeout = match env::var("API_PROXY_TIMEOUT_SECS") {
            Ok(value) => Duration::from_secs(
                value
                    .parse()
                    .expect("FATAL: API_PROXY_TIMEOUT_SECS must be a whole number of seconds."),
            ),
            Err(_) => Duration::from_secs(30),
        };

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|value| split_list(&value))
            .unwrap_or_else(|_| default_allowed_origins());

        Self {
            env,
            bind_addr: env::var("HOST_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5173".to_string()),
            api_prefix,
            api_target,
            change_origin,
            proxy_timeout,
            asset_dir: PathBuf::from(env::var("ASSET_DIR").unwrap_or_else(|_| "dist".to_string())),
            allowed_hosts: env::var("ALLOWED_HOSTS")
                .map(|value| split_list(&value))
                .unwrap_or_default(),
            allowed_origins,
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:8090".to_string(),
        "http://127.0.0.1:8090".to_string(),
    ]
}

/// Parses the proxy target. The forwarding client speaks plain HTTP only.
fn parse_target(raw: &str) -> Uri {
    let uri: Uri = raw
        .parse()
        .unwrap_or_else(|_| panic!("FATAL: API_PROXY_TARGET `{raw}` is not a valid URI."));
    match (uri.scheme_str(), uri.authority()) {
        (Some("http"), Some(_)) => uri,
        _ => panic!("FATAL: API_PROXY_TARGET `{raw}` must be an absolute http:// origin."),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
