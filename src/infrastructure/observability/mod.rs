//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_document_failed, record_document_not_found,
    record_document_published, record_document_received, record_http_request,
    record_queue_depth, record_status_update_failure, PrometheusMetrics,
};
