//! Planner counters
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

/// Registry of planner and catalog counters.
///
/// All counters use relaxed atomics; a snapshot is a best-effort copy.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    advisories: AtomicU64,
    candidates_evaluated: AtomicU64,
    sort_risks_flagged: AtomicU64,
    recommendations_issued: AtomicU64,
    catalog_adds: AtomicU64,
    catalog_drops: AtomicU64,
    catalog_rejections: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Advisor

    pub fn increment_advisories(&self) {
        self.advisories.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_candidates_evaluated(&self, count: u64) {
        self.candidates_evaluated.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_sort_risks(&self) {
        self.sort_risks_flagged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_recommendations(&self) {
        self.recommendations_issued.fetch_add(1, Ordering::Relaxed);
    }

    // Catalog

    pub fn increment_catalog_adds(&self) {
        self.catalog_adds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_catalog_drops(&self) {
        self.catalog_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_catalog_rejections(&self) {
        self.catalog_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            advisories: self.advisories.load(Ordering::Relaxed),
            candidates_evaluated: self.candidates_evaluated.load(Ordering::Relaxed),
            sort_risks_flagged: self.sort_risks_flagged.load(Ordering::Relaxed),
            recommendations_issued: self.recommendations_issued.load(Ordering::Relaxed),
            catalog_adds: self.catalog_adds.load(Ordering::Relaxed),
            catalog_drops: self.catalog_drops.load(Ordering::Relaxed),
            catalog_rejections: self.catalog_rejections.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of the counters at one moment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub advisories: u64,
    pub candidates_evaluated: u64,
    pub sort_risks_flagged: u64,
    pub recommendations_issued: u64,
    pub catalog_adds: u64,
    pub catalog_drops: u64,
    pub catalog_rejections: u64,
}
