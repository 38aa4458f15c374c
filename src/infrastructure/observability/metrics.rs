//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::MetricsConfig;

static DOCUMENT_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"doc-[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap()
});

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("document_gateway_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

pub fn record_document_received(channel: &str) {
    counter!("documents_received_total", "channel" => channel.to_string()).increment(1);
}

pub fn record_document_published(duration: Duration) {
    counter!("documents_published_total").increment(1);
    histogram!("document_publish_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_document_failed() {
    counter!("documents_failed_total").increment(1);
}

pub fn record_document_not_found() {
    counter!("documents_not_found_total").increment(1);
}

/// A document could not be marked failed and may be stuck in `received`
pub fn record_status_update_failure() {
    counter!("document_status_update_failures_total").increment(1);
}

pub fn record_queue_depth(depth: usize) {
    gauge!("upload_queue_depth").set(depth as f64);
}

/// Replace document IDs in a path to keep label cardinality bounded
fn sanitize_path(path: &str) -> String {
    let path = DOCUMENT_ID_PATTERN.replace_all(path, "{id}");

    path.chars().take(50).collect()
}
