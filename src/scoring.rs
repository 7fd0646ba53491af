//! Composite scoring and grade mapping.
//!
//! composite = Σ(weight_k · raw_score_k) / Σ(weight_k) over the signals that are
//! present, rounded to the nearest integer. No signals at all → neutral 50.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::signals::{SignalKind, SignalResult};

/// Score used when there is nothing to judge.
pub const NEUTRAL_SCORE: u8 = 50;

/// Letter grade over the 0–100 trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// ≥80 A, ≥60 B, ≥40 C, ≥20 D, else F.
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Grade::A,
            60..=79 => Grade::B,
            40..=59 => Grade::C,
            20..=39 => Grade::D,
            _ => Grade::F,
        }
    }

    /// D and F count as "likely fake" in usage stats.
    pub fn is_failing(self) -> bool {
        matches!(self, Grade::D | Grade::F)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round and clamp a 0–100 float into the integer score domain.
pub(crate) fn to_score(x: f64) -> u8 {
    x.round().clamp(0.0, 100.0) as u8
}

/// Weighted average of whichever signals are present.
pub fn composite_score(signals: &BTreeMap<SignalKind, SignalResult>) -> u8 {
    let mut total = 0.0f64;
    let mut weight_sum = 0.0f64;
    for kind in SignalKind::ALL {
        if let Some(res) = signals.get(&kind) {
            total += f64::from(res.raw_score) * kind.weight();
            weight_sum += kind.weight();
        }
    }
    if weight_sum > 0.0 {
        to_score(total / weight_sum)
    } else {
        NEUTRAL_SCORE
    }
}
