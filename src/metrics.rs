use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::scoring::Grade;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("radar_analyses_total", "Completed analyses by final grade.");
        describe_counter!("radar_cache_hits_total", "Reports served from the result cache.");
        describe_counter!("radar_cache_misses_total", "Reports computed because the cache missed.");
        describe_counter!("radar_judge_calls_total", "Judge calls by outcome.");
        describe_counter!("radar_reviews_dropped_total", "Reviews dropped for a blank body.");
        describe_gauge!("radar_cache_ttl_secs", "Result cache TTL in seconds.");
    });
}

impl Metrics {
    /// Install the Prometheus recorder and publish the cache TTL gauge.
    pub fn init(cache_ttl_secs: i64) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        ensure_metrics_described();
        gauge!("radar_cache_ttl_secs").set(cache_ttl_secs as f64);
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

// Recording helpers; without an installed recorder these are no-ops.

pub fn record_analysis(grade: Grade) {
    counter!("radar_analyses_total", "grade" => grade.as_str()).increment(1);
}

pub fn record_cache(hit: bool) {
    if hit {
        counter!("radar_cache_hits_total").increment(1);
    } else {
        counter!("radar_cache_misses_total").increment(1);
    }
}

pub fn record_judge_call(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("radar_judge_calls_total", "outcome" => outcome).increment(1);
}

pub fn record_dropped_reviews(n: usize) {
    if n > 0 {
        counter!("radar_reviews_dropped_total").increment(n as u64);
    }
}
