use shuttle_axum::axum::{routing::get, Router};
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::warn;

static HANDLE: OnceCell<Option<PrometheusHandle>> = OnceCell::new();

pub struct Metrics {
    pub handle: Option<PrometheusHandle>,
}

impl Metrics {
    /// Install the Prometheus recorder once per process. Later calls reuse the
    /// first outcome; a failed install leaves metrics as no-ops.
    pub fn init() -> Self {
        let handle = HANDLE
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(h) => {
                    describe();
                    Some(h)
                }
                Err(e) => {
                    warn!(error = %e, "prometheus recorder not installed");
                    None
                }
            })
            .clone();
        Self { handle }
    }

    /// Exposes `/metrics` in the Prometheus text format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.map(|h| h.render()).unwrap_or_default() }
            }),
        )
    }
}

fn describe() {
    describe_counter!("fetch_stage_total", "Topic fetches served, by fallback stage");
    describe_counter!("topic_unit_retries_total", "News unit attempts that were retried");
    describe_counter!("topic_unit_failures_total", "News units that failed after all retries");
    describe_counter!("briefing_requests_total", "Briefing requests received");
    describe_counter!("briefing_failures_total", "Briefing requests that failed");
}
