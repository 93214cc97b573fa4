//! HTTP surface: metrics, health and index pages.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use ecr_exporter_metrics::{PrometheusSink, ScrapeEngine, SinkError};
use ecr_exporter_registry::ScrapeContext;
use serde::Deserialize;
use tracing::{error, info};

use crate::health::HealthStatus;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>ECR Exporter</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; }
        .link { display: block; margin: 10px 0; padding: 10px; background: #f5f5f5; text-decoration: none; border-radius: 5px; }
        .link:hover { background: #e5e5e5; }
    </style>
</head>
<body>
    <h1>ECR Prometheus Exporter</h1>
    <p>Monitor your AWS ECR repositories with Prometheus metrics</p>

    <h2>Available Endpoints:</h2>
    <a href="/metrics" class="link">Prometheus Metrics</a>
    <a href="/health" class="link">Health Status</a>
    <a href="/health?format=json" class="link">Health Status (JSON)</a>

    <h2>Metrics Exported:</h2>
    <ul>
        <li>Total ECR repositories</li>
        <li>Image count per repository</li>
        <li>Image size statistics (min, max, avg)</li>
        <li>Latest push/pull timestamps</li>
        <li>Scrape errors and duration</li>
    </ul>
</body>
</html>
"#;

/// Shared state of the HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    engine: ScrapeEngine,
    scrape_timeout: Duration,
    started: Instant,
}

impl AppState {
    /// Creates handler state; uptime counts from now.
    pub fn new(engine: ScrapeEngine, scrape_timeout: Duration) -> Self {
        Self {
            engine,
            scrape_timeout,
            started: Instant::now(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct HealthQuery {
    format: Option<String>,
}

/// Builds the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/", get(index_handler))
        .with_state(state)
}

/// Serves `router` on `addr` until Ctrl+C.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutting down HTTP server");
        })
        .await?;

    Ok(())
}

async fn scrape(state: &AppState) -> Result<String, SinkError> {
    let mut sink = PrometheusSink::new()?;
    let ctx = ScrapeContext::with_timeout(state.scrape_timeout);
    state.engine.collect(&ctx, &mut sink).await?;
    sink.encode()
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match scrape(&state).await {
        Ok(body) => ([(header::CONTENT_TYPE, PrometheusSink::CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to produce metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("failed to produce metrics: {e}"))
                .into_response()
        }
    }
}

fn wants_json(headers: &HeaderMap, query: &HealthQuery) -> bool {
    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));
    accepts_json || query.format.as_deref() == Some("json")
}

async fn health_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HealthQuery>,
) -> Response {
    let status = HealthStatus::collect(state.started);
    if wants_json(&headers, &query) {
        Json(status).into_response()
    } else {
        Html(status.to_html()).into_response()
    }
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
