//! Usage statistics: how many products were graded and how many looked fake.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::scoring::Grade;

#[derive(Debug, Default)]
pub struct UsageStats {
    analyzed: AtomicU64,
    fakes_detected: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub analyzed: u64,
    pub fakes_detected: u64,
}

impl UsageStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished analysis with its final grade.
    pub fn record(&self, grade: Grade) {
        self.analyzed.fetch_add(1, Ordering::Relaxed);
        if grade.is_failing() {
            self.fakes_detected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            analyzed: self.analyzed.load(Ordering::Relaxed),
            fakes_detected: self.fakes_detected.load(Ordering::Relaxed),
        }
    }
}
