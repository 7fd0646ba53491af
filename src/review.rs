//! # Review model
//! Normalized review records and the product summary consumed by the signals.
//!
//! Records arrive already parsed (ratings as floats, dates as calendar dates,
//! verified flag as bool). Nothing here touches raw HTML.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder used when the scraper could not find a reviewer name.
pub const ANONYMOUS_REVIEWER: &str = "Anonymous";

fn default_reviewer() -> String {
    ANONYMOUS_REVIEWER.to_string()
}

/// One review as handed over by the acquisition layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    /// Star rating in 1.0..=5.0, absent when the page did not expose it.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub title: String,
    pub body: String,
    #[serde(default, alias = "isVerified", alias = "is_verified")]
    pub is_verified_purchase: bool,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, alias = "helpfulVotes")]
    pub helpful_votes: u32,
    #[serde(default = "default_reviewer", alias = "reviewerName")]
    pub reviewer_name: String,
}

impl Review {
    /// Minimal constructor; optional fields start empty.
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rating: None,
            title: String::new(),
            body: body.into(),
            is_verified_purchase: false,
            date: None,
            helpful_votes: 0,
            reviewer_name: default_reviewer(),
        }
    }

    pub fn rating(mut self, stars: f64) -> Self {
        self.rating = Some(stars);
        self
    }

    pub fn verified(mut self, yes: bool) -> Self {
        self.is_verified_purchase = yes;
        self
    }

    pub fn dated(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Nearest whole star, if the rating is present and lands in 1..=5.
    pub fn star(&self) -> Option<u8> {
        let r = self.rating?.round();
        if (1.0..=5.0).contains(&r) {
            Some(r as u8)
        } else {
            None
        }
    }
}

/// Star value (1..=5) → percentage of all reviews (0..=100).
///
/// Percentages come from the product page and may be approximate; they are
/// not required to sum to 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingDistribution(BTreeMap<u8, f64>);

impl RatingDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I: IntoIterator<Item = (u8, f64)>>(pairs: I) -> Self {
        Self(pairs.into_iter().collect())
    }

    pub fn set(&mut self, star: u8, percent: f64) {
        self.0.insert(star, percent);
    }

    /// Percentage at `star`, 0 when the bucket is missing.
    pub fn percent(&self, star: u8) -> f64 {
        self.0.get(&star).copied().unwrap_or(0.0)
    }

    /// True when there is nothing usable (no buckets, or every bucket is zero).
    pub fn is_blank(&self) -> bool {
        !self.0.values().any(|v| *v > 0.0)
    }

    /// Estimate a distribution from the reviews themselves.
    ///
    /// Each bucket is rounded independently, so the sum may drift from 100.
    /// Reviews without a usable rating still count in the denominator.
    pub fn derive_from(reviews: &[Review]) -> Self {
        let mut counts = [0usize; 5];
        for r in reviews {
            if let Some(star) = r.star() {
                counts[usize::from(star) - 1] += 1;
            }
        }
        let total = reviews.len();
        let mut dist = Self::new();
        for (i, count) in counts.iter().enumerate() {
            let pct = if total > 0 {
                (*count as f64 / total as f64 * 100.0).round()
            } else {
                0.0
            };
            dist.set(i as u8 + 1, pct);
        }
        dist
    }
}

/// What the scraper knows about the product page itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "rating")]
    pub average_rating: Option<f64>,
    #[serde(default, alias = "totalReviews")]
    pub total_reviews: Option<u32>,
    #[serde(default, alias = "ratingDistribution")]
    pub rating_distribution: RatingDistribution,
}

impl ProductSummary {
    pub fn with_distribution(dist: RatingDistribution) -> Self {
        Self {
            rating_distribution: dist,
            ..Default::default()
        }
    }
}
