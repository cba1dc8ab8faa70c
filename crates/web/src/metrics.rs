use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Mutex, PoisonError};
use structure::view::{DashboardView, DetailView, View};
use structure::DataError;

static PROM_HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

pub fn describe() {
    describe_gauge!(
        "dashboard_web_build_info",
        "Build info for the structural dashboard (value is always 1)."
    );
    describe_gauge!(
        "dashboard_visible_markets",
        "Markets passing the filter in the last rendered dashboard."
    );
    describe_counter!(
        "dashboard_views_total",
        "Rendered views by kind (dashboard/detail) and tier."
    );
    describe_counter!(
        "lookup_errors_total",
        "Failed view renders and lookups by error kind."
    );
}

/// Install a global Prometheus recorder once and return a handle for rendering `/metrics`.
///
/// Concurrent first calls serialize on the slot, so only one install is attempted.
/// Upkeep runs on each `/metrics` request.
pub fn init_global() -> Result<PrometheusHandle> {
    let mut slot = PROM_HANDLE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    describe();

    let git_sha = std::env::var("GIT_SHA").unwrap_or_else(|_| "unknown".to_string());
    gauge!(
        "dashboard_web_build_info",
        "version" => env!("CARGO_PKG_VERSION"),
        "git_sha" => git_sha,
    )
    .set(1.0);

    *slot = Some(handle.clone());
    Ok(handle)
}

pub fn record_dashboard(view: &DashboardView) {
    gauge!("dashboard_visible_markets").set(view.rows.len() as f64);
    counter!("dashboard_views_total", "view" => "dashboard", "tier" => view.tier.as_str())
        .increment(1);
}

pub fn record_detail(view: &DetailView) {
    counter!("dashboard_views_total", "view" => "detail", "tier" => view.tier.as_str())
        .increment(1);
}

pub fn record_view(view: &View) {
    match view {
        View::Dashboard(d) => record_dashboard(d),
        View::Detail(d) => record_detail(d),
    }
}

pub fn record_error(err: &DataError) {
    counter!("lookup_errors_total", "kind" => err.kind()).increment(1);
}
