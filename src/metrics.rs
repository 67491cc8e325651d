use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and describe all metrics
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "estimator_estimates_total",
        "Total number of price estimates requested"
    );
    describe_counter!(
        "estimator_errors_total",
        "Total number of rejected estimates"
    );
    describe_histogram!(
        "estimator_estimate_duration_seconds",
        "Estimate computation time in seconds"
    );
    describe_gauge!(
        "estimator_districts",
        "Number of districts in the loaded price table"
    );
    describe_gauge!(
        "estimator_info",
        "Estimator version information"
    );

    gauge!("estimator_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Label used for districts missing from the price table
pub const UNKNOWN_DISTRICT_LABEL: &str = "unknown";

/// Record an estimate request and its outcome
///
/// `district` must be a name from the loaded table or [`UNKNOWN_DISTRICT_LABEL`].
pub fn record_estimate(district: &str, outcome: &str) {
    counter!(
        "estimator_estimates_total",
        "district" => district.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
}

/// Record a rejected estimate
pub fn record_error(error_type: &str) {
    counter!(
        "estimator_errors_total",
        "error_type" => error_type.to_string(),
    )
    .increment(1);
}

pub fn record_duration(duration: Duration) {
    histogram!("estimator_estimate_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_district_count(count: usize) {
    gauge!("estimator_districts").set(count as f64);
}
