//! Review Radar binary entrypoint.
//! Boots the Axum HTTP server with the judge runtime and the metrics router.

use review_radar::ai_bootstrap::JudgeRuntime;
use review_radar::api::{self, AppState};
use review_radar::cache::ResultCache;
use review_radar::config::{AiConfig, RadarConfig};
use review_radar::metrics::Metrics;
use shuttle_axum::ShuttleAxum;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - RADAR_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("RADAR_DEV_LOG")
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

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("radar=info,warn"));

    // Shuttle may already own the global subscriber; that is fine.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let radar = RadarConfig::load_default()?;
    let judge_rt = JudgeRuntime::from_config(AiConfig::load_or_default());
    if std::env::var("AI_QUICK_PROBE").ok().as_deref() == Some("1") {
        judge_rt.quick_probe().await;
    }

    let cache = ResultCache::from_config(&radar.cache);
    let ttl = cache.ttl_secs();
    let state = AppState::new(judge_rt.judge.clone(), cache);
    let mut router = api::router(state);

    match Metrics::init(ttl) {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => warn!(target: "radar::api", error = %e, "metrics recorder not installed"),
    }

    Ok(router.into())
}
