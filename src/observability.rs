use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: agendas accepted. Labels: kind.
pub const AGENDA_SUBMITTED_TOTAL: &str = "concierge_agenda_submitted_total";

/// Counter: submissions rejected by the overlap detector.
pub const AGENDA_CONFLICTS_TOTAL: &str = "concierge_agenda_conflicts_total";

/// Counter: approval decisions recorded. Labels: status.
pub const AGENDA_DECIDED_TOTAL: &str = "concierge_agenda_decided_total";

/// Counter: coverage tasks opened for departures.
pub const COVERAGE_OPENED_TOTAL: &str = "concierge_coverage_opened_total";

/// Counter: departures left without a linked coverage (side effect failed).
pub const COVERAGE_OPEN_FAILURES_TOTAL: &str = "concierge_coverage_open_failures_total";

/// Counter: coverage assignment updates.
pub const COVERAGE_ASSIGNED_TOTAL: &str = "concierge_coverage_assigned_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Histogram: WAL group-commit flush duration in seconds.
pub const WAL_FLUSH_DURATION_SECONDS: &str = "concierge_wal_flush_duration_seconds";

/// Histogram: WAL group-commit batch size (events per flush).
pub const WAL_FLUSH_BATCH_SIZE: &str = "concierge_wal_flush_batch_size";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
