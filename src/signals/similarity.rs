//! Near-duplicate text detector.
//!
//! Every body becomes a bag-of-words term-frequency vector; every unordered
//! pair is compared by cosine similarity. A review joins the cluster as soon as
//! it has one near-duplicate partner, and severity depends on how much of the
//! batch sits in the cluster, not on how many pairs matched.
//!
//! Pairwise comparison is O(n²); batches are tens to low hundreds of reviews.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

use super::SignalResult;
use crate::review::Review;

const MIN_REVIEWS: usize = 3;
/// Strictly greater than this counts as a near-duplicate.
pub const PAIR_THRESHOLD: f64 = 0.6;
const HEAVY_RATIO: f64 = 0.4;
const LIGHT_RATIO: f64 = 0.2;
/// Tokens must be longer than this many characters.
const MIN_TOKEN_CHARS: usize = 3;

/// Word characters are ASCII only; any other letter splits a token.
static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("non-word regex"));

/// Term-frequency vector with its Euclidean norm cached.
#[derive(Debug, Clone, Default)]
pub struct TermVector {
    counts: HashMap<String, u32>,
    norm: f64,
}

impl TermVector {
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        let mut counts: HashMap<String, u32> = HashMap::new();
        for tok in NON_WORD.split(&lower) {
            if tok.chars().count() > MIN_TOKEN_CHARS {
                *counts.entry(tok.to_string()).or_default() += 1;
            }
        }
        let norm = counts
            .values()
            .map(|c| f64::from(*c) * f64::from(*c))
            .sum::<f64>()
            .sqrt();
        Self { counts, norm }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, term: &str) -> u32 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    /// Cosine similarity in 0..=1; 0 when either side has no terms.
    pub fn cosine(&self, other: &TermVector) -> f64 {
        if self.norm == 0.0 || other.norm == 0.0 {
            return 0.0;
        }
        // terms missing on one side contribute nothing to the dot product
        let (small, large) = if self.counts.len() <= other.counts.len() {
            (self, other)
        } else {
            (other, self)
        };
        let dot: f64 = small
            .counts
            .iter()
            .map(|(term, a)| f64::from(*a) * f64::from(large.count(term)))
            .sum();
        dot / (self.norm * other.norm)
    }
}

/// Indices of reviews that have at least one near-duplicate partner.
pub fn cluster_members(vectors: &[TermVector]) -> BTreeSet<usize> {
    let mut members = BTreeSet::new();
    for i in 0..vectors.len() {
        for j in (i + 1)..vectors.len() {
            if vectors[i].cosine(&vectors[j]) > PAIR_THRESHOLD {
                members.insert(i);
                members.insert(j);
            }
        }
    }
    members
}

pub fn evaluate(reviews: &[Review]) -> SignalResult {
    let mut out = SignalResult::clean();
    if reviews.len() < MIN_REVIEWS {
        return out;
    }

    let vectors: Vec<TermVector> = reviews
        .iter()
        .map(|r| TermVector::from_text(&r.body))
        .collect();
    let cluster = cluster_members(&vectors).len();
    let ratio = cluster as f64 / reviews.len() as f64;
    out.cluster_size = Some(cluster);

    if ratio >= HEAVY_RATIO {
        out.penalize_suspicious(30, format!("{cluster} reviews share suspiciously similar text"));
    } else if ratio >= LIGHT_RATIO {
        out.penalize(15, format!("Some reviews share similar phrasing ({cluster} reviews)"));
    }

    out.finish()
}
