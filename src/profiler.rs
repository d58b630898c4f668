//! Runtime profiling hooks
//!
//! Request counts and latencies are recorded through the `metrics` facade and
//! served by a Prometheus scrape endpoint. Recording is a no-op until
//! [`start`] installs the exporter.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

use crate::config::{ProfilingSection, TelemetrySection};
use crate::{Error, Result};

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// Install the Prometheus exporter. Returns the listen address, or `None`
/// when profiling is disabled.
pub fn start(
    profiling: &ProfilingSection,
    telemetry: &TelemetrySection,
) -> Result<Option<SocketAddr>> {
    if !profiling.enabled {
        tracing::info!("Profiling disabled via configuration");
        return Ok(None);
    }

    let addr: SocketAddr = profiling.listen.parse().map_err(|e| {
        Error::config(format!("invalid profiling.listen '{}': {}", profiling.listen, e))
    })?;

    let mut builder = PrometheusBuilder::new()
        .with_http_listener(addr)
        .add_global_label("service", telemetry.service_name())
        .add_global_label("env", telemetry.environment())
        .add_global_label("version", telemetry.service_version())
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
            LATENCY_BUCKETS,
        )
        .map_err(|e| Error::Telemetry(e.to_string()))?;

    if let Some(host) = hostname::get().ok().and_then(|h| h.into_string().ok()) {
        builder = builder.add_global_label("host", host);
    }

    builder
        .install()
        .map_err(|e| Error::Telemetry(format!("failed to install profiler: {}", e)))?;

    metrics::describe_counter!(REQUESTS_TOTAL, "HTTP requests handled");
    metrics::describe_histogram!(
        REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "HTTP request latency"
    );

    tracing::info!(%addr, "Profiler listening");
    Ok(Some(addr))
}

/// Record one finished request
pub fn record_request(method: &str, route: &str, status: u16, elapsed: Duration) {
    let method = method.to_string();
    let route = route.to_string();
    let status = status.to_string();

    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.clone()
    )
    .increment(1);

    metrics::histogram!(
        REQUEST_DURATION_SECONDS,
        "method" => method,
        "route" => route,
        "status" => status
    )
    .record(elapsed.as_secs_f64());
}
