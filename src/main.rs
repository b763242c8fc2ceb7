use attendance_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    proxy::{HyperUpstream, UpstreamState},
    routes::RouteTable,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: loads configuration, installs logging, builds the route table and the
/// upstream client, then serves pages and the `/api` proxy.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "attendance_portal=debug,tower_http=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Attendance portal starting in {:?} mode", config.env);

    // 4. Route Table
    let routes = RouteTable::standard().expect("FATAL: The built-in route table is invalid.");
    tracing::info!(routes = routes.len(), "Route table loaded");

    // 5. Upstream Client for the /api proxy
    let upstream = Arc::new(HyperUpstream::new(config.proxy_timeout)) as UpstreamState;
    tracing::info!(
        prefix = %config.api_prefix,
        api_target = %config.api_target,
        change_origin = config.change_origin,
        "API proxy configured"
    );

    // 6. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        routes: Arc::new(routes),
        upstream,
        config,
    };

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: Cannot bind {bind_addr}: {e}"));

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}

/// Resolves on Ctrl+C so in-flight navigations and proxied requests can finish.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
