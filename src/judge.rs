//! AI judge adapter: provider abstraction + daily limit + response parsing.
//!
//! The judge rates every review's authenticity (0–100) and the batch aggregate
//! feeds [`crate::fusion::combine_scores`]. Failures never bubble up: they come
//! back as an error-marked [`ExternalJudgment`] so fusion can fall back.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AiConfig;
use crate::fusion::{ExternalJudgment, ReviewJudgment, RiskLevel};
use crate::review::Review;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Missing per-review trust scores count as this.
pub const DEFAULT_TRUST: f64 = 50.0;

/// Trait object used by the service layer and tests.
pub trait JudgeClient: Send + Sync {
    /// `None` = no judgment (disabled, over limit, nothing to judge).
    /// `Some(j)` with `j.error` set = the judge was asked and failed.
    fn judge<'a>(
        &'a self,
        reviews: &'a [Review],
    ) -> Pin<Box<dyn Future<Output = Option<ExternalJudgment>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynJudge = Arc<dyn JudgeClient>;

/// Factory: build a judge according to config and environment variables.
///
/// * If `AI_TEST_MODE=mock`, returns a deterministic mock judge.
/// * Else if `config.enabled==false`, returns a disabled judge.
/// * Else builds the configured provider wrapped with the daily limit.
pub fn build_judge_from_config(config: &AiConfig) -> DynJudge {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(LimitedJudge::new(MockProvider::new(75.0), config.daily_limit));
    }

    if !config.enabled {
        return Arc::new(DisabledJudge);
    }

    match config.provider.as_str() {
        "openai" => match OpenAiProvider::new(config) {
            Ok(p) => Arc::new(LimitedJudge::new(p, config.daily_limit)),
            Err(e) => {
                warn!(target: "radar::judge", error = %e, "openai judge unavailable; disabled");
                Arc::new(DisabledJudge)
            }
        },
        "mock" => Arc::new(LimitedJudge::new(MockProvider::new(75.0), config.daily_limit)),
        _ => Arc::new(DisabledJudge),
    }
}

// ------------------------------------------------------------
// Prompt + response parsing
// ------------------------------------------------------------

#[derive(Serialize)]
struct PromptReview<'a> {
    review_id: &'a str,
    rating: Option<f64>,
    title: &'a str,
    body: String,
    is_verified: bool,
    date: Option<String>,
}

/// First `max_chars` characters of `s` (char-boundary safe).
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Build the judge prompt. Bodies are cut to `max_body_chars` to save tokens.
pub fn build_prompt(reviews: &[Review], max_body_chars: usize) -> String {
    let data: Vec<PromptReview<'_>> = reviews
        .iter()
        .map(|r| PromptReview {
            review_id: &r.id,
            rating: r.rating,
            title: &r.title,
            body: truncate_chars(&r.body, max_body_chars),
            is_verified: r.is_verified_purchase,
            date: r.date.map(|d| d.format("%Y-%m-%d").to_string()),
        })
        .collect();
    let json = serde_json::to_string_pretty(&data).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Analyze these product reviews and rate each one's authenticity from 0-100.

Evaluation criteria:
1. Does it describe specific, concrete usage experience?
2. Are the emotions and language natural (not templated or generic)?
3. Does it show signs of AI-generation (repetitive phrasing, overly polished)?
4. Is it suspiciously similar to other reviews in the set?

Review data:
{json}

Respond ONLY with a JSON array, no other text:
[{{"review_id":"...","trust_score":85,"flags":["specific usage described"],"risk_level":"low"}}]

risk_level must be one of: "low", "medium", "high""#
    )
}

static JSON_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*\]").expect("array regex"));

#[derive(Deserialize)]
struct RawReviewScore {
    #[serde(default)]
    review_id: serde_json::Value,
    #[serde(default)]
    trust_score: Option<f64>,
    #[serde(default)]
    flags: Option<Vec<String>>,
    #[serde(default)]
    risk_level: Option<String>,
}

fn parse_risk(s: &str) -> Option<RiskLevel> {
    match s.trim().to_ascii_lowercase().as_str() {
        "low" => Some(RiskLevel::Low),
        "medium" => Some(RiskLevel::Medium),
        "high" => Some(RiskLevel::High),
        _ => None,
    }
}

/// Turn the model's reply into a batch judgment.
///
/// The reply may wrap the array in prose or a markdown fence; the span from the
/// first `[` to the last `]` is parsed. Aggregate = rounded mean trust score.
pub fn parse_judgment(
    content: &str,
    model: Option<&str>,
    tokens_used: u64,
) -> anyhow::Result<ExternalJudgment> {
    let span = JSON_ARRAY
        .find(content)
        .ok_or_else(|| anyhow!("judge response did not contain a JSON array"))?;
    let raw: Vec<RawReviewScore> =
        serde_json::from_str(span.as_str()).context("judge response array is not valid JSON")?;
    if raw.is_empty() {
        return Err(anyhow!("judge returned an empty array"));
    }

    let mut seen = HashSet::new();
    let mut flags = Vec::new();
    let mut high_risk_count = 0;
    let mut total = 0.0;
    let mut review_scores = Vec::with_capacity(raw.len());

    for r in raw {
        total += r.trust_score.unwrap_or(DEFAULT_TRUST);
        let risk = r.risk_level.as_deref().and_then(parse_risk);
        if risk == Some(RiskLevel::High) {
            high_risk_count += 1;
        }
        let own_flags = r.flags.unwrap_or_default();
        for f in &own_flags {
            if seen.insert(f.clone()) {
                flags.push(f.clone());
            }
        }
        let review_id = match r.review_id {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        review_scores.push(ReviewJudgment {
            review_id,
            trust_score: r.trust_score,
            flags: own_flags,
            risk_level: risk,
        });
    }

    let aggregate_score = (total / review_scores.len() as f64).round();
    Ok(ExternalJudgment {
        aggregate_score,
        flags,
        error: None,
        high_risk_count,
        review_scores,
        model: model.map(str::to_string),
        tokens_used,
    })
}

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider: does the *real* call. Separated so the same limit
/// wrapper serves production and tests.
pub trait Provider: Send + Sync + 'static {
    fn fetch<'a>(
        &'a self,
        reviews: &'a [Review],
    ) -> Pin<Box<dyn Future<Output = ExternalJudgment> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

/// OpenAI provider (Chat Completions API).
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_body_chars: usize,
}

impl OpenAiProvider {
    pub fn new(config: &AiConfig) -> anyhow::Result<Self> {
        if config.api_key.is_empty() {
            return Err(anyhow!("no OpenAI API key configured"));
        }
        let http = reqwest::Client::builder()
            .user_agent("review-radar/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .context("building reqwest client")?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_body_chars: config.max_body_chars,
        })
    }

    async fn call(&self, reviews: &[Review]) -> anyhow::Result<ExternalJudgment> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            choices: Vec<Choice>,
            #[serde(default)]
            usage: Option<Usage>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            #[serde(default)]
            content: String,
        }
        #[derive(Deserialize)]
        struct Usage {
            #[serde(default)]
            total_tokens: u64,
        }
        #[derive(Deserialize)]
        struct ErrResp {
            error: ErrBody,
        }
        #[derive(Deserialize)]
        struct ErrBody {
            message: String,
        }

        let prompt = build_prompt(reviews, self.max_body_chars);
        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: &prompt,
            }],
            temperature: 0.2,
            max_tokens: 1200,
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("sending judge request")?;

        let status = resp.status();
        if !status.is_success() {
            let msg = resp
                .json::<ErrResp>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            return Err(anyhow!(msg));
        }

        let body: Resp = resp.json().await.context("decoding judge response")?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("");
        let tokens = body.usage.map(|u| u.total_tokens).unwrap_or(0);
        parse_judgment(content, Some(&self.model), tokens)
    }
}

impl Provider for OpenAiProvider {
    fn fetch<'a>(
        &'a self,
        reviews: &'a [Review],
    ) -> Pin<Box<dyn Future<Output = ExternalJudgment> + Send + 'a>> {
        Box::pin(async move {
            match self.call(reviews).await {
                Ok(j) => j,
                Err(e) => {
                    warn!(target: "radar::judge", error = %e, "judge call failed");
                    ExternalJudgment::failed(e.to_string())
                }
            }
        })
    }
    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Returns `None` always; used when the judge is disabled.
pub struct DisabledJudge;

impl JudgeClient for DisabledJudge {
    fn judge<'a>(
        &'a self,
        _reviews: &'a [Review],
    ) -> Pin<Box<dyn Future<Output = Option<ExternalJudgment>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic provider for tests/local runs: every review gets `trust`.
#[derive(Clone)]
pub struct MockProvider {
    pub trust: f64,
}

impl MockProvider {
    pub fn new(trust: f64) -> Self {
        Self { trust }
    }
}

impl Provider for MockProvider {
    fn fetch<'a>(
        &'a self,
        reviews: &'a [Review],
    ) -> Pin<Box<dyn Future<Output = ExternalJudgment> + Send + 'a>> {
        let review_scores = reviews
            .iter()
            .map(|r| ReviewJudgment {
                review_id: r.id.clone(),
                trust_score: Some(self.trust),
                flags: Vec::new(),
                risk_level: Some(RiskLevel::Low),
            })
            .collect();
        let out = ExternalJudgment {
            aggregate_score: self.trust.round(),
            review_scores,
            model: Some("mock".to_string()),
            ..Default::default()
        };
        Box::pin(async move { out })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Daily limit wrapper
// ------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct DailyCounter {
    day: NaiveDate,
    count: u32,
}

impl DailyCounter {
    fn today() -> Self {
        Self {
            day: Utc::now().date_naive(),
            count: 0,
        }
    }
}

/// Caps real provider calls per UTC day; over the cap the judge goes quiet
/// (`None`) instead of failing.
pub struct LimitedJudge<P: Provider> {
    inner: P,
    daily_limit: u32,
    counter: Mutex<DailyCounter>,
}

impl<P: Provider> LimitedJudge<P> {
    pub fn new(inner: P, daily_limit: u32) -> Self {
        Self {
            inner,
            daily_limit,
            counter: Mutex::new(DailyCounter::today()),
        }
    }

    /// Calls used today.
    pub fn used_today(&self) -> u32 {
        self.counter.lock().map(|g| g.count).unwrap_or(0)
    }

    /// Reserve one call; false when today's budget is spent.
    fn try_acquire(&self) -> bool {
        let Ok(mut g) = self.counter.lock() else {
            return false;
        };
        let today = Utc::now().date_naive();
        if g.day != today {
            *g = DailyCounter::today();
        }
        if g.count >= self.daily_limit {
            return false;
        }
        g.count = g.count.saturating_add(1);
        true
    }

    async fn judge_impl(&self, reviews: &[Review]) -> Option<ExternalJudgment> {
        if reviews.is_empty() {
            return None;
        }
        if !self.try_acquire() {
            info!(target: "radar::judge", limit = self.daily_limit, "daily judge limit reached");
            return None;
        }
        let out = self.inner.fetch(reviews).await;
        info!(
            target: "radar::judge",
            provider = self.inner.name(),
            reviews = reviews.len(),
            aggregate = out.aggregate_score,
            ok = out.is_usable(),
            "judge call finished"
        );
        Some(out)
    }
}

impl<P: Provider> JudgeClient for LimitedJudge<P> {
    fn judge<'a>(
        &'a self,
        reviews: &'a [Review],
    ) -> Pin<Box<dyn Future<Output = Option<ExternalJudgment>> + Send + 'a>> {
        Box::pin(self.judge_impl(reviews))
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}
