//! Cost estimation
//!
//! A coarse scan-cost proxy plus the in-memory sort risk flag.
//!
//! - Each equality field in the index prefix narrows the expected scan by
//!   `equality_selectivity_factor`; range and residual fields do not.
//! - An in-memory sort over more than `in_memory_sort_budget_bytes` is
//!   aborted by the engine, so crossing the budget is a hard risk.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::config::PlannerConfig;
use super::matcher::MatchResult;
use crate::shape::QueryShape;

/// Approximate collection statistics. Advisory; staleness is tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_document_count: u64,
    pub average_document_size_bytes: u64,
}

impl CorpusStats {
    pub fn new(total_document_count: u64, average_document_size_bytes: u64) -> Self {
        Self {
            total_document_count,
            average_document_size_bytes,
        }
    }
}

/// Source of collection statistics, owned by the host
pub trait StatisticsProvider {
    /// Statistics for `collection`, or `None` if unknown
    fn corpus_stats(&self, collection: &str) -> Option<CorpusStats>;
}

/// Fixed per-collection statistics
#[derive(Debug, Clone, Default)]
pub struct StaticStatistics {
    collections: HashMap<String, CorpusStats>,
}

impl StaticStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, collection: impl Into<String>, stats: CorpusStats) -> Self {
        self.insert(collection, stats);
        self
    }

    pub fn insert(&mut self, collection: impl Into<String>, stats: CorpusStats) {
        self.collections.insert(collection.into(), stats);
    }
}

impl StatisticsProvider for StaticStatistics {
    fn corpus_stats(&self, collection: &str) -> Option<CorpusStats> {
        self.collections.get(collection).copied()
    }
}

/// Estimated cost of serving a shape with one index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    /// `equality_selectivity_factor ^ equality_prefix_length`
    pub selectivity_factor: f64,
    /// Documents expected to survive the index prefix
    pub scan_cost_proxy: u64,
    /// Bytes an in-memory sort would hold; 0 when no sort step is needed
    pub estimated_sort_bytes: u64,
    /// In-memory sort expected to exceed the budget
    pub in_memory_sort_risk: bool,
    pub sort_budget_bytes: u64,
}

impl CostEstimate {
    /// Fraction of the sort budget the in-memory sort would use
    pub fn sort_budget_utilization(&self) -> f64 {
        self.estimated_sort_bytes as f64 / self.sort_budget_bytes.max(1) as f64
    }
}

/// Estimates cost for one match. Pure and deterministic.
pub fn estimate(
    shape: &QueryShape,
    result: &MatchResult,
    stats: &CorpusStats,
    config: &PlannerConfig,
) -> CostEstimate {
    let equality_fields = result.equality_prefix_length.min(shape.equality().len());
    let exponent = i32::try_from(equality_fields).unwrap_or(i32::MAX);
    let selectivity_factor = config.equality_selectivity_factor.powi(exponent);

    // f64 -> u64 casts saturate
    let scan_cost_proxy =
        (stats.total_document_count as f64 / selectivity_factor.max(1.0)).ceil() as u64;

    let sort_bytes = scan_cost_proxy.saturating_mul(stats.average_document_size_bytes);
    let in_memory_sort_risk =
        result.requires_in_memory_sort && sort_bytes > config.in_memory_sort_budget_bytes;

    CostEstimate {
        selectivity_factor,
        scan_cost_proxy,
        estimated_sort_bytes: if result.requires_in_memory_sort { sort_bytes } else { 0 },
        in_memory_sort_risk,
        sort_budget_bytes: config.in_memory_sort_budget_bytes,
    }
}
