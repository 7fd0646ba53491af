//! # Signals
//! Four independent fake-review detectors. Each one is a pure function of the
//! review snapshot and returns a [`SignalResult`]: a 0–100 score where 100 means
//! "nothing suspicious", plus human-readable flags.
//!
//! Detectors share no state; [`SignalKind::ALL`] only fixes the order in which
//! their flags are concatenated.

pub mod burst;
pub mod rating;
pub mod similarity;
pub mod verified;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::review::{ProductSummary, RatingDistribution, Review};

/// Identifier of a detector. `Ord` follows evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    RatingDistribution,
    VerifiedPurchase,
    Burst,
    Similarity,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::RatingDistribution,
        SignalKind::VerifiedPurchase,
        SignalKind::Burst,
        SignalKind::Similarity,
    ];

    /// Share of this signal in the composite score.
    pub fn weight(self) -> f64 {
        match self {
            SignalKind::RatingDistribution => 0.30,
            SignalKind::VerifiedPurchase => 0.30,
            SignalKind::Burst => 0.20,
            SignalKind::Similarity => 0.20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::RatingDistribution => "rating_distribution",
            SignalKind::VerifiedPurchase => "verified_purchase",
            SignalKind::Burst => "burst",
            SignalKind::Similarity => "similarity",
        }
    }

    /// Run this detector on a snapshot.
    pub fn evaluate(self, reviews: &[Review], product: &ProductSummary) -> SignalResult {
        match self {
            SignalKind::RatingDistribution => {
                rating::evaluate(&product.rating_distribution, reviews)
            }
            SignalKind::VerifiedPurchase => verified::evaluate(reviews),
            SignalKind::Burst => burst::evaluate(reviews),
            SignalKind::Similarity => similarity::evaluate(reviews),
        }
    }
}

/// Outcome of one detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    /// 0..=100, 100 = no suspicion.
    pub raw_score: i32,
    pub suspicious: bool,
    #[serde(default)]
    pub flags: Vec<String>,

    // Detector-specific details; only the owning detector fills its field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vp_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_week_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<RatingDistribution>,
}

impl Default for SignalResult {
    fn default() -> Self {
        Self::clean()
    }
}

impl SignalResult {
    /// Neutral result: full score, no flags.
    pub fn clean() -> Self {
        Self {
            raw_score: 100,
            suspicious: false,
            flags: Vec::new(),
            vp_ratio: None,
            cluster_size: None,
            peak_week_count: None,
            distribution: None,
        }
    }

    /// Subtract `points` and record why. Does not touch `suspicious`.
    pub(crate) fn penalize(&mut self, points: i32, flag: impl Into<String>) {
        self.raw_score -= points;
        self.flags.push(flag.into());
    }

    /// Same as [`penalize`](Self::penalize) but also marks the result suspicious.
    pub(crate) fn penalize_suspicious(&mut self, points: i32, flag: impl Into<String>) {
        self.suspicious = true;
        self.penalize(points, flag);
    }

    pub(crate) fn finish(mut self) -> Self {
        self.raw_score = self.raw_score.clamp(0, 100);
        self
    }
}

/// Run every detector, keyed by kind.
pub fn evaluate_all(
    reviews: &[Review],
    product: &ProductSummary,
) -> BTreeMap<SignalKind, SignalResult> {
    SignalKind::ALL
        .iter()
        .map(|kind| (*kind, kind.evaluate(reviews, product)))
        .collect()
}
