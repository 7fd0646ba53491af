//! # Scoring Engine
//! Pure, testable logic that maps `(reviews, product)` → `AnalysisResult`.
//! No I/O, no clock, no shared state: the same snapshot always yields the same
//! result, which keeps it suitable for unit tests and offline evaluation.
//!
//! Policy: each signal scores independently, the composite is their weighted
//! average, the grade follows from the composite. An empty snapshot is not
//! suspicious, it is "no data": score 50, grade C.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::review::{ProductSummary, Review};
use crate::scoring::{composite_score, Grade, NEUTRAL_SCORE};
use crate::signals::{self, SignalKind, SignalResult};

/// Local (heuristic-only) verdict over one review snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// 0..=100, higher = more trustworthy.
    pub score: u8,
    pub grade: Grade,
    /// Every signal's flags, concatenated in evaluation order.
    pub flags: Vec<String>,
    pub signals: BTreeMap<SignalKind, SignalResult>,
    pub review_count: usize,
}

impl AnalysisResult {
    /// Neutral result returned for an empty snapshot.
    pub fn no_data() -> Self {
        Self {
            score: NEUTRAL_SCORE,
            grade: Grade::from_score(NEUTRAL_SCORE),
            flags: Vec::new(),
            signals: BTreeMap::new(),
            review_count: 0,
        }
    }

    /// True if any signal crossed its suspicion threshold.
    pub fn any_suspicious(&self) -> bool {
        self.signals.values().any(|s| s.suspicious)
    }

    pub fn signal(&self, kind: SignalKind) -> Option<&SignalResult> {
        self.signals.get(&kind)
    }
}

/// Score a review snapshot.
pub fn analyze(reviews: &[Review], product: &ProductSummary) -> AnalysisResult {
    if reviews.is_empty() {
        return AnalysisResult::no_data();
    }

    let signals = signals::evaluate_all(reviews, product);
    let flags: Vec<String> = signals
        .values()
        .flat_map(|s| s.flags.iter().cloned())
        .collect();
    let score = composite_score(&signals);
    let grade = Grade::from_score(score);

    debug!(
        target: "radar::engine",
        reviews = reviews.len(),
        score,
        %grade,
        flags = flags.len(),
        "snapshot scored"
    );

    AnalysisResult {
        score,
        grade,
        flags,
        signals,
        review_count: reviews.len(),
    }
}
