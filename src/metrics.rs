//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use std::sync::Once;
use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("postmirror_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "postmirror_http_request_duration_seconds",
            "HTTP request duration in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "endpoint"]
    ).expect("metric can be created");

    // Database Metrics
    pub static ref DB_QUERIES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("postmirror_db_queries_total", "Total number of database queries"),
        &["operation", "table"]
    ).expect("metric can be created");
    pub static ref DB_QUERY_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "postmirror_db_query_duration_seconds",
            "Database query duration in seconds"
        ).buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["operation", "table"]
    ).expect("metric can be created");

    // Upstream Metrics
    pub static ref UPSTREAM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("postmirror_upstream_requests_total", "Total number of requests sent to the upstream API"),
        &["resource", "status"]
    ).expect("metric can be created");
    pub static ref UPSTREAM_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "postmirror_upstream_request_duration_seconds",
            "Upstream request duration in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["resource"]
    ).expect("metric can be created");
    pub static ref FALLBACK_FETCHES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("postmirror_fallback_fetches_total", "Posts fetched from the upstream on local miss"),
        &["outcome"]
    ).expect("metric can be created");

    // Application Metrics
    pub static ref POSTS_TOTAL: IntGauge = IntGauge::new(
        "postmirror_posts_total",
        "Total number of posts stored locally"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("postmirror_errors_total", "Total number of error responses"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: Once = Once::new();

/// Initialize metrics registry.
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
            .expect("HTTP_REQUESTS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
            .expect("HTTP_REQUEST_DURATION_SECONDS can be registered");
        REGISTRY
            .register(Box::new(DB_QUERIES_TOTAL.clone()))
            .expect("DB_QUERIES_TOTAL can be registered");
        REGISTRY
            .register(Box::new(DB_QUERY_DURATION_SECONDS.clone()))
            .expect("DB_QUERY_DURATION_SECONDS can be registered");
        REGISTRY
            .register(Box::new(UPSTREAM_REQUESTS_TOTAL.clone()))
            .expect("UPSTREAM_REQUESTS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(UPSTREAM_REQUEST_DURATION_SECONDS.clone()))
            .expect("UPSTREAM_REQUEST_DURATION_SECONDS can be registered");
        REGISTRY
            .register(Box::new(FALLBACK_FETCHES_TOTAL.clone()))
            .expect("FALLBACK_FETCHES_TOTAL can be registered");
        REGISTRY
            .register(Box::new(POSTS_TOTAL.clone()))
            .expect("POSTS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("ERRORS_TOTAL can be registered");

        tracing::info!("Metrics registry initialized");
    });
}

/// Record one database statement.
pub fn observe_db_query(operation: &str, table: &str, elapsed: Duration) {
    DB_QUERIES_TOTAL
        .with_label_values(&[operation, table])
        .inc();
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation, table])
        .observe(elapsed.as_secs_f64());
}

/// Record one upstream request. `status` is the HTTP status code or `"error"`.
pub fn observe_upstream_request(resource: &str, status: &str, elapsed: Duration) {
    UPSTREAM_REQUESTS_TOTAL
        .with_label_values(&[resource, status])
        .inc();
    UPSTREAM_REQUEST_DURATION_SECONDS
        .with_label_values(&[resource])
        .observe(elapsed.as_secs_f64());
}
