use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_page(report: &'static str, rows: usize, records: usize) {
    metrics::counter!("report_rows_fetched_total", "report" => report).increment(rows as u64);
    metrics::counter!("report_records_emitted_total", "report" => report)
        .increment(records as u64);
}

pub(crate) fn record_fetch_failure(report: &'static str) {
    metrics::counter!("report_fetch_failures_total", "report" => report).increment(1);
}

pub(crate) fn record_parse_failure(field: &'static str) {
    metrics::counter!("embedded_field_parse_failures_total", "field" => field).increment(1);
}
