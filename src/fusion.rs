//! External-judgment fusion.
//!
//! fused = round(0.4 · composite + 0.6 · judge aggregate)
//!
//! The judgment is advisory: when it is absent or carries an error marker the
//! local composite passes through untouched. The grade is always recomputed
//! from the fused score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::AnalysisResult;
use crate::scoring::{to_score, Grade};

pub const LOCAL_WEIGHT: f64 = 0.4;
pub const JUDGE_WEIGHT: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Per-review verdict as returned by the judge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewJudgment {
    pub review_id: String,
    #[serde(default)]
    pub trust_score: Option<f64>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
}

/// Batch-level judgment. `error` set means "unusable, ignore the numbers".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalJudgment {
    #[serde(default)]
    pub aggregate_score: f64,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub high_risk_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub review_scores: Vec<ReviewJudgment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub tokens_used: u64,
}

impl ExternalJudgment {
    /// Usable judgment with just an aggregate.
    pub fn scored(aggregate_score: f64) -> Self {
        Self {
            aggregate_score,
            ..Default::default()
        }
    }

    /// Error-marked judgment; fusion will ignore it.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            ..Default::default()
        }
    }

    pub fn is_usable(&self) -> bool {
        self.error.is_none()
    }
}

/// Blend the local composite with the judge aggregate.
pub fn combine_scores(composite: u8, judgment: Option<&ExternalJudgment>) -> u8 {
    match judgment {
        Some(j) if j.is_usable() => {
            to_score(f64::from(composite) * LOCAL_WEIGHT + j.aggregate_score * JUDGE_WEIGHT)
        }
        _ => composite,
    }
}

/// What the caller displays: local analysis, the judgment (if any) and the
/// fused verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub analysis: AnalysisResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judgment: Option<ExternalJudgment>,
    pub final_score: u8,
    pub final_grade: Grade,
    pub analyzed_at: DateTime<Utc>,
}

impl TrustReport {
    pub fn assemble(
        product_id: Option<String>,
        analysis: AnalysisResult,
        judgment: Option<ExternalJudgment>,
        analyzed_at: DateTime<Utc>,
    ) -> Self {
        let final_score = combine_scores(analysis.score, judgment.as_ref());
        Self {
            product_id,
            analysis,
            judgment,
            final_score,
            final_grade: Grade::from_score(final_score),
            analyzed_at,
        }
    }

    /// True when the judge actually moved the score.
    pub fn judge_applied(&self) -> bool {
        self.judgment.as_ref().is_some_and(ExternalJudgment::is_usable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_judgment_passes_through() {
        assert_eq!(combine_scores(63, None), 63);
    }

    #[test]
    fn errored_judgment_is_ignored_for_any_aggregate() {
        for x in [0.0, 37.0, 50.0, 90.0, 100.0] {
            let mut j = ExternalJudgment::failed("HTTP 429");
            j.aggregate_score = x;
            assert_eq!(combine_scores(50, Some(&j)), 50);
        }
    }

    #[test]
    fn judge_is_weighted_heavier() {
        let j = ExternalJudgment::scored(90.0);
        assert_eq!(combine_scores(50, Some(&j)), 74);
        let j = ExternalJudgment::scored(0.0);
        assert_eq!(combine_scores(100, Some(&j)), 40);
    }

    #[test]
    fn report_regrades_from_fused_score() {
        let mut analysis = AnalysisResult::no_data();
        analysis.score = 50;
        let report = TrustReport::assemble(
            Some("B0TEST".into()),
            analysis,
            Some(ExternalJudgment::scored(90.0)),
            Utc::now(),
        );
        assert_eq!(report.analysis.grade, Grade::C);
        assert_eq!(report.final_score, 74);
        assert_eq!(report.final_grade, Grade::B);
        assert!(report.judge_applied());
    }

    #[test]
    fn judgment_roundtrips_through_json() {
        let raw = r#"{"aggregate_score": 61, "flags": ["generic"], "error": "timeout"}"#;
        let j: ExternalJudgment = serde_json::from_str(raw).unwrap();
        assert!(!j.is_usable());
        assert_eq!(j.flags, vec!["generic"]);
    }
}
