use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::cache::ResultCache;
use crate::engine;
use crate::fusion::{ExternalJudgment, TrustReport};
use crate::judge::DynJudge;
use crate::metrics;
use crate::review::{ProductSummary, Review};
use crate::stats::{StatsSnapshot, UsageStats};

#[derive(Clone)]
pub struct AppState {
    pub judge: DynJudge,
    pub cache: Arc<ResultCache>,
    pub stats: Arc<UsageStats>,
}

impl AppState {
    pub fn new(judge: DynJudge, cache: ResultCache) -> Self {
        Self {
            judge,
            cache: Arc::new(cache),
            stats: Arc::new(UsageStats::new()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .route("/report/{product_id}", get(cached_report))
        .route("/stats", get(stats))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn default_true() -> bool {
    true
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, alias = "asin")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product: ProductSummary,
    pub reviews: Vec<Review>,
    /// Ask the configured judge when no judgment is supplied.
    #[serde(default = "default_true")]
    pub judge: bool,
    /// Judgment already obtained by the caller; used as-is.
    #[serde(default)]
    pub judgment: Option<ExternalJudgment>,
    /// Ignore a cached report.
    #[serde(default)]
    pub refresh: bool,
}

/// Drop records the engine must never see. Returns the kept reviews and how
/// many were dropped.
pub fn sanitize_reviews(reviews: Vec<Review>) -> (Vec<Review>, usize) {
    let before = reviews.len();
    let kept: Vec<Review> = reviews
        .into_iter()
        .filter(|r| !r.body.trim().is_empty())
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Short, non-reversible id for logs.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Full pipeline for one request: cache → engine → judge → fusion → cache/stats.
/// Returns the report and whether it came from the cache.
pub async fn run_analysis(
    state: &AppState,
    req: AnalyzeRequest,
    now: DateTime<Utc>,
) -> (TrustReport, bool) {
    let pid_hash = req.product_id.as_deref().map(anon_hash).unwrap_or_default();

    if let (Some(pid), false) = (req.product_id.as_deref(), req.refresh) {
        if let Some(hit) = state.cache.get(pid, now) {
            metrics::record_cache(true);
            info!(target: "radar::api", product = %pid_hash, "cache hit");
            return (hit, true);
        }
        metrics::record_cache(false);
    }

    let (reviews, dropped) = sanitize_reviews(req.reviews);
    if dropped > 0 {
        warn!(
            target: "radar::api",
            product = %pid_hash,
            dropped,
            "reviews with blank body dropped"
        );
        metrics::record_dropped_reviews(dropped);
    }

    let analysis = engine::analyze(&reviews, &req.product);

    let judgment = match req.judgment {
        Some(j) => Some(j),
        None if req.judge => {
            let out = state.judge.judge(&reviews).await;
            if let Some(j) = &out {
                metrics::record_judge_call(j.is_usable());
            }
            out
        }
        None => None,
    };

    let report = TrustReport::assemble(req.product_id, analysis, judgment, now);

    // Nothing was scored; the neutral report is neither cached nor counted.
    if report.analysis.review_count == 0 {
        info!(target: "radar::api", product = %pid_hash, "no reviews to analyze");
        return (report, false);
    }

    state.cache.put(&report);
    state.stats.record(report.final_grade);
    metrics::record_analysis(report.final_grade);

    info!(
        target: "radar::api",
        product = %pid_hash,
        reviews = report.analysis.review_count,
        local = report.analysis.score,
        final_score = report.final_score,
        grade = %report.final_grade,
        judge = state.judge.provider_name(),
        judge_applied = report.judge_applied(),
        "analysis complete"
    );

    (report, false)
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    let (report, hit) = run_analysis(&state, req, Utc::now()).await;
    let cache = if hit { "HIT" } else { "MISS" };
    ([("x-radar-cache", cache)], Json(report))
}

async fn cached_report(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<TrustReport>, StatusCode> {
    state
        .cache
        .get(&product_id, Utc::now())
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}
