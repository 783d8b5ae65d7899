//! News Briefing Service — Binary Entrypoint
//! Boots the Axum HTTP server: config, pipeline wiring, routes and middleware.

use shuttle_axum::ShuttleAxum;

use news_briefing::{build_app, enable_dev_tracing, BriefingConfig};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // This makes GROQ_API_KEY / BRIGHTDATA_API_KEY / BRIEFING_CONFIG_PATH visible to config loading.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let cfg = BriefingConfig::load()?;
    let router = build_app(&cfg)?;

    Ok(router.into())
}
