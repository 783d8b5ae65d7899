// src/lib.rs
// Public library surface for the server binary, the probe binary and integration tests.

pub mod api;
pub mod compose;
pub mod config;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod metrics;
pub mod pipeline;
pub mod speech;

use std::sync::Arc;

use shuttle_axum::axum::Router;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub use crate::api::{router, AppState};
pub use crate::config::BriefingConfig;
pub use crate::error::PipelineError;
pub use crate::pipeline::{BriefingPipeline, SourceType};

use crate::ingest::AdmissionController;

/// Load config, wire the pipeline with one shared admission controller and
/// return the ready router.
pub fn build_app(cfg: &BriefingConfig) -> anyhow::Result<Router> {
    let admission = Arc::new(AdmissionController::per_second(cfg.fetch.rate_per_sec));
    let pipeline = BriefingPipeline::from_config(cfg, admission)?;
    Ok(router(AppState::new(pipeline)))
}

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - BRIEFING_DEV_LOG=1
pub fn enable_dev_tracing() {
    let dev_flag = std::env::var("BRIEFING_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_briefing=info,warn"));

    // try_init: a second call (or a host-installed subscriber) is not an error.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
