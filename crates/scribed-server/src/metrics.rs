//! Prometheus metrics recorder and `/metrics` endpoint handler.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Must be called once at server startup before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// Metric name constants to avoid typos across modules.

/// Invocation requests total (counter, labels: status).
pub const INVOCATIONS_TOTAL: &str = "invocations_total";
/// Invocation request duration seconds (histogram).
pub const INVOCATION_DURATION_SECONDS: &str = "invocation_duration_seconds";
/// Audio chunks processed total (counter).
pub const CHUNKS_PROCESSED_TOTAL: &str = "chunks_processed_total";
/// Health check requests total (counter).
pub const PING_TOTAL: &str = "ping_total";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_render() {
        // Build a recorder + handle (no global install to avoid test conflicts).
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let output = handle.render();
        assert!(output.is_empty() || output.contains('#') || output.contains('\n'));
    }

    #[test]
    fn metric_constants_are_snake_case() {
        for name in [
            INVOCATIONS_TOTAL,
            INVOCATION_DURATION_SECONDS,
            CHUNKS_PROCESSED_TOTAL,
            PING_TOTAL,
        ] {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
