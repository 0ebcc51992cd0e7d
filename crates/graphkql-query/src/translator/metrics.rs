//! Caller-owned translation counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared across translations
///
/// Translators hold no counters themselves; callers that want statistics
/// pass one of these through [`QueryTranslator::metered`](super::QueryTranslator::metered).
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    translations: AtomicU64,
    failures: AtomicU64,
    optimized: AtomicU64,
}

/// Point-in-time copy of [`TranslationMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub translations: u64,
    pub failures: u64,
    pub optimized: u64,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, optimized: bool) {
        self.translations.fetch_add(1, Ordering::Relaxed);
        if optimized {
            self.optimized.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            translations: self.translations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            optimized: self.optimized.load(Ordering::Relaxed),
        }
    }

    /// Fraction of attempts that failed, 0.0 when nothing ran
    pub fn failure_rate(&self) -> f64 {
        let s = self.snapshot();
        let attempts = s.translations + s.failures;
        if attempts == 0 {
            0.0
        } else {
            s.failures as f64 / attempts as f64
        }
    }
}
