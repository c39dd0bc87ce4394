//! Prometheus metrics for the functions service.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Called from `Application::build`;
/// idempotent, so processes spawning several applications are fine.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }
    let builder = PrometheusBuilder::new();
    match builder.install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => {
            tracing::warn!("Failed to install Prometheus recorder: {}", e);
        }
    }
}

/// Render metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record one email attempt by template and outcome.
pub fn record_email(template: &str, status: &str) {
    metrics::counter!(
        "functions_email_total",
        "template" => template.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
}
