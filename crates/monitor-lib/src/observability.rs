//! Prometheus metrics for the water quality monitor.

use prometheus::{register_histogram, register_int_gauge, Histogram, IntGauge};
use std::sync::OnceLock;

/// Histogram buckets for remote scoring latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<MonitorMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct MonitorMetricsInner {
    scoring_latency_seconds: Histogram,
    predictions: IntGauge,
    alerts: IntGauge,
    prediction_errors: IntGauge,
    auth_failures: IntGauge,
}

impl MonitorMetricsInner {
    fn new() -> Self {
        Self {
            scoring_latency_seconds: register_histogram!(
                "water_monitor_scoring_latency_seconds",
                "Time spent on one scoring round trip",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register scoring_latency_seconds"),

            predictions: register_int_gauge!(
                "water_monitor_predictions_total",
                "Total number of completed potability checks"
            )
            .expect("Failed to register predictions_total"),

            alerts: register_int_gauge!(
                "water_monitor_alerts_total",
                "Total number of non-potable verdicts"
            )
            .expect("Failed to register alerts_total"),

            prediction_errors: register_int_gauge!(
                "water_monitor_prediction_errors_total",
                "Total number of failed potability checks"
            )
            .expect("Failed to register prediction_errors_total"),

            auth_failures: register_int_gauge!(
                "water_monitor_auth_failures_total",
                "Total number of failed token exchanges or rejections"
            )
            .expect("Failed to register auth_failures_total"),
        }
    }
}

/// Monitor metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct MonitorMetrics {
    _private: (),
}

impl Default for MonitorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(MonitorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &MonitorMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record one scoring round trip
    pub fn observe_scoring_latency(&self, duration_secs: f64) {
        self.inner().scoring_latency_seconds.observe(duration_secs);
    }

    /// Increment completed checks counter
    pub fn inc_predictions(&self) {
        self.inner().predictions.inc();
    }

    /// Increment non-potable verdicts counter
    pub fn inc_alerts(&self) {
        self.inner().alerts.inc();
    }

    /// Increment failed checks counter
    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors.inc();
    }

    /// Increment authentication failures counter
    pub fn inc_auth_failures(&self) {
        self.inner().auth_failures.inc();
    }
}
