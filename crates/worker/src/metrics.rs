//! Prometheus metrics exporter.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing::info;

/// Histogram buckets for `database_query_duration_seconds`.
const QUERY_DURATION_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0];

/// Installs the global Prometheus recorder and serves it on `addr`.
///
/// Must be called once, from within the Tokio runtime, before any metrics are recorded.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets(QUERY_DURATION_BUCKETS)?
        .install()?;

    info!(%addr, "Prometheus exporter listening");
    Ok(())
}
