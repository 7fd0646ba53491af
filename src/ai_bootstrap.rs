// src/ai_bootstrap.rs
use crate::config::ai::AiConfig;
use crate::judge::{build_judge_from_config, DynJudge};
use crate::review::Review;
use tracing::{info, warn};

pub struct JudgeRuntime {
    pub cfg: AiConfig,
    pub judge: DynJudge,
}

impl JudgeRuntime {
    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        let cfg = AiConfig::load_from_file(path)?;
        Ok(Self::from_config(cfg))
    }

    pub fn from_config(cfg: AiConfig) -> Self {
        // Safe diagnostics: only provider + enabled + key length
        info!(
            target: "radar::judge",
            "AI cfg loaded: provider={}, enabled={}, key_len={}",
            cfg.provider,
            cfg.enabled,
            cfg.api_key.len()
        );
        let judge = build_judge_from_config(&cfg);
        Self { cfg, judge }
    }

    /// One tiny judge call to verify credentials/connectivity. Never panics.
    pub async fn quick_probe(&self) {
        if !self.cfg.enabled {
            warn!(target: "radar::judge", "judge quick_probe skipped: AI is disabled in config");
            return;
        }
        let sample = [
            Review::new(
                "probe-1",
                "Used it daily for three weeks on my commute; \
                 the left earbud now crackles at high volume.",
            )
            .rating(3.0)
            .verified(true),
            Review::new(
                "probe-2",
                "Best product ever!!! Highly recommend to everyone, five stars!!!",
            )
            .rating(5.0),
        ];
        let out = self.judge.judge(&sample).await;
        match out {
            Some(j) if j.is_usable() => {
                info!(target: "radar::judge", aggregate = j.aggregate_score, "judge quick_probe ok")
            }
            Some(j) => warn!(target: "radar::judge", error = ?j.error, "judge quick_probe failed"),
            None => warn!(target: "radar::judge", "judge quick_probe returned no judgment"),
        }
    }
}
