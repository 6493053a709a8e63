//! Check counters and latency histogram, exported through Prometheus when enabled.

use std::{net::SocketAddr, time::Duration};

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

const CHECKS_TOTAL: &str = "authz_checks_total";
const CHECK_DURATION: &str = "authz_check_duration_seconds";

/// Install the Prometheus recorder with its own HTTP scrape listener.
///
/// Must be called from within the tokio runtime.
pub fn install_prometheus(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    describe_counter!(CHECKS_TOTAL, "Check requests by outcome");
    describe_histogram!(
        CHECK_DURATION,
        Unit::Seconds,
        "Time spent answering a check request"
    );
    info!(%addr, "prometheus metrics listener started");
    Ok(())
}

/// Record one answered check. A no-op when no recorder is installed.
pub fn record_check(outcome: &'static str, elapsed: Duration) {
    counter!(CHECKS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(CHECK_DURATION).record(elapsed.as_secs_f64());
}
