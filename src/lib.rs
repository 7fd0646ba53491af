// src/lib.rs
// Public library surface for integration tests (and reuse by other callers).

pub mod review;
pub mod signals;

// Scoring core: signals → composite → grade → fusion
pub mod engine;
pub mod fusion;
pub mod scoring;

// Service collaborators
pub mod ai_bootstrap;
pub mod api;
pub mod cache;
pub mod config;
pub mod judge;
pub mod metrics;
pub mod stats;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::engine::{analyze, AnalysisResult};
pub use crate::fusion::{combine_scores, ExternalJudgment, TrustReport};
pub use crate::review::{ProductSummary, RatingDistribution, Review};
pub use crate::scoring::Grade;
pub use crate::signals::{SignalKind, SignalResult};

/// Score a snapshot and fold in an already-resolved judgment.
///
/// This is the whole engine in one call: pure and synchronous, no I/O.
pub fn grade_reviews(
    reviews: &[Review],
    product: &ProductSummary,
    judgment: Option<&ExternalJudgment>,
) -> (AnalysisResult, u8, Grade) {
    let analysis = analyze(reviews, product);
    let fused = combine_scores(analysis.score, judgment);
    (analysis, fused, Grade::from_score(fused))
}
