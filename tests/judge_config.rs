// tests/judge_config.rs
// Mutates process env, so every test here is serialized.

use std::env;
use std::fs;

use review_radar::ai_bootstrap::JudgeRuntime;
use review_radar::config::AiConfig;
use review_radar::judge::build_judge_from_config;
use review_radar::Review;

/// Small RAII helper to snapshot & restore env vars in each test.
struct EnvSnapshot {
    saved: Vec<(String, Option<String>)>,
}
impl EnvSnapshot {
    /// Provide a list of (KEY, Some(VALUE)) to set, or (KEY, None) to remove.
    fn set(pairs: &[(&str, Option<&str>)]) -> Self {
        let mut saved = Vec::with_capacity(pairs.len());
        for (k, v) in pairs {
            let key = k.to_string();
            saved.push((key.clone(), env::var(k).ok()));
            match v {
                Some(val) => env::set_var(&key, val),
                None => env::remove_var(&key),
            }
        }
        Self { saved }
    }
}
impl Drop for EnvSnapshot {
    fn drop(&mut self) {
        for (k, maybe_v) in self.saved.drain(..) {
            match maybe_v {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
    }
}

fn sample() -> Vec<Review> {
    vec![
        Review::new("a", "Fits well and the fabric held up after many washes"),
        Review::new("b", "Arrived late, box crushed, item fine"),
    ]
}

#[serial_test::serial]
#[tokio::test]
async fn test_mode_mock_overrides_disabled_config() {
    let _env = EnvSnapshot::set(&[("AI_TEST_MODE", Some("mock"))]);
    let judge = build_judge_from_config(&AiConfig::default());
    assert_eq!(judge.provider_name(), "mock");
    let j = judge.judge(&sample()).await.expect("mock judgment");
    assert!(j.is_usable());
    assert_eq!(j.review_scores.len(), 2);
}

#[serial_test::serial]
#[tokio::test]
async fn disabled_config_yields_no_judgment() {
    let _env = EnvSnapshot::set(&[("AI_TEST_MODE", None)]);
    let judge = build_judge_from_config(&AiConfig::default());
    assert_eq!(judge.provider_name(), "disabled");
    assert!(judge.judge(&sample()).await.is_none());
}

#[serial_test::serial]
#[test]
fn enabled_openai_without_key_is_a_config_error() {
    let _env = EnvSnapshot::set(&[("OPENAI_API_KEY", None)]);
    let err = AiConfig::from_json(r#"{"enabled": true, "provider": "openai", "api_key": "ENV"}"#)
        .unwrap_err();
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

#[serial_test::serial]
#[test]
fn env_key_is_resolved() {
    let _env = EnvSnapshot::set(&[("OPENAI_API_KEY", Some("sk-from-env"))]);
    let json = r#"{"enabled": true, "provider": "OpenAI", "api_key": "env"}"#;
    let cfg = AiConfig::from_json(json).unwrap();
    assert_eq!(cfg.provider, "openai");
    assert_eq!(cfg.api_key, "sk-from-env");
}

#[serial_test::serial]
#[test]
fn load_or_default_falls_back_when_file_is_missing_or_broken() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("nope.json");
    let _env = EnvSnapshot::set(&[("AI_CONFIG_PATH", Some(missing.to_str().unwrap()))]);
    assert!(!AiConfig::load_or_default().enabled);

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    env::set_var("AI_CONFIG_PATH", &broken);
    assert!(!AiConfig::load_or_default().enabled);

    let good = dir.path().join("ai.json");
    fs::write(&good, r#"{"enabled": true, "provider": "mock", "daily_limit": 3}"#).unwrap();
    env::set_var("AI_CONFIG_PATH", &good);
    let cfg = AiConfig::load_or_default();
    assert!(cfg.enabled);
    assert_eq!(cfg.daily_limit, 3);
}

#[serial_test::serial]
#[tokio::test]
async fn runtime_from_path_builds_configured_judge() {
    let _env = EnvSnapshot::set(&[("AI_TEST_MODE", None)]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ai.json");
    fs::write(&path, r#"{"enabled": true, "provider": "mock", "daily_limit": 1}"#).unwrap();

    let rt = JudgeRuntime::from_path(path.to_str().unwrap()).unwrap();
    assert_eq!(rt.judge.provider_name(), "mock");
    assert!(rt.judge.judge(&sample()).await.is_some());
    // daily limit of 1 is spent
    assert!(rt.judge.judge(&sample()).await.is_none());
}
