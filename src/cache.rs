//! In-memory TTL cache of trust reports, keyed per product.
//!
//! Keys embed the crate version, so a new release never serves reports scored
//! by older heuristics. Time is passed in by the caller.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::config::radar::CacheConfig;
use crate::fusion::TrustReport;

#[derive(Debug)]
pub struct ResultCache {
    inner: Mutex<HashMap<String, TrustReport>>,
    ttl: Duration,
    cap: usize,
}

/// Versioned cache key for a product id.
pub fn cache_key(product_id: &str) -> String {
    format!("rr_{}_{}", env!("CARGO_PKG_VERSION"), product_id)
}

impl ResultCache {
    pub fn new(ttl_secs: u64, cap: usize) -> Self {
        let ttl_secs = ttl_secs.min((i64::MAX / 1_000) as u64) as i64;
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs),
            cap: cap.max(1),
        }
    }

    pub fn from_config(cfg: &CacheConfig) -> Self {
        Self::new(cfg.ttl_secs, cfg.capacity)
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Fresh report for `product_id`, if any. Expired entries are dropped.
    pub fn get(&self, product_id: &str, now: DateTime<Utc>) -> Option<TrustReport> {
        let key = cache_key(product_id);
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let fresh = map
            .get(&key)
            .map(|r| now.signed_duration_since(r.analyzed_at) < self.ttl)?;
        if fresh {
            map.get(&key).cloned()
        } else {
            map.remove(&key);
            None
        }
    }

    /// Store a report under its product id. Reports without one are not cached.
    pub fn put(&self, report: &TrustReport) {
        let Some(pid) = report.product_id.as_deref() else {
            return;
        };
        let key = cache_key(pid);
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(key, report.clone());
        while map.len() > self.cap {
            let oldest = map
                .iter()
                .min_by_key(|(_, r)| r.analyzed_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    map.remove(&k);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AnalysisResult;
    use chrono::TimeZone;

    fn report(pid: &str, at: DateTime<Utc>) -> TrustReport {
        TrustReport::assemble(Some(pid.to_string()), AnalysisResult::no_data(), None, at)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn key_carries_version() {
        assert!(cache_key("B000TEST").starts_with("rr_"));
        assert!(cache_key("B000TEST").ends_with("_B000TEST"));
    }

    #[test]
    fn hit_within_ttl_then_expire() {
        let cache = ResultCache::new(3600, 8);
        cache.put(&report("P1", t0()));
        assert!(cache.get("P1", t0() + Duration::minutes(59)).is_some());
        assert!(cache.get("P1", t0() + Duration::minutes(60)).is_none());
        // expired entry was evicted on read
        assert!(cache.is_empty());
    }

    #[test]
    fn reports_without_product_id_are_skipped() {
        let cache = ResultCache::new(3600, 8);
        let r = TrustReport::assemble(None, AnalysisResult::no_data(), None, t0());
        cache.put(&r);
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let cache = ResultCache::new(3600, 2);
        cache.put(&report("old", t0()));
        cache.put(&report("mid", t0() + Duration::seconds(1)));
        cache.put(&report("new", t0() + Duration::seconds(2)));
        let now = t0() + Duration::seconds(3);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("old", now).is_none());
        assert!(cache.get("mid", now).is_some());
        assert!(cache.get("new", now).is_some());
    }

    #[test]
    fn poisoned_lock_keeps_serving() {
        let cache = ResultCache::new(3600, 8);
        cache.put(&report("P1", t0()));
        let joined = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = cache.inner.lock().unwrap();
                panic!("writer died holding the lock");
            })
            .join()
        });
        assert!(joined.is_err());
        assert!(cache.inner.is_poisoned());

        assert!(cache.get("P1", t0()).is_some());
        cache.put(&report("P2", t0()));
        assert_eq!(cache.len(), 2);
    }
}
