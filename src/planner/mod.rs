//! ESR planner subsystem
//!
//! Matches query shapes against compound indexes, estimates the cost of
//! each match, and recommends Equality, Sort, Range ordered indexes.
//!
//! # Design Principles
//!
//! - Pure: `evaluate`, `estimate` and `recommend` take immutable inputs,
//!   hold no state, and never log
//! - Deterministic: same inputs, same result
//! - Explicit: the sort memory budget is configuration, not a constant
//!
//! # Matching Rule
//!
//! 1. Equality fields, in any order, form the index prefix
//! 2. The sort sequence follows, all-forward or all-reversed
//! 3. The next field, if a range field, bounds the scan
//!
//! Anything else is a residual filter or an in-memory sort.

mod advisor;
mod config;
mod cost;
mod errors;
mod explain;
mod matcher;
mod recommend;

pub use advisor::{Advice, Advisor, CandidateReport};
pub use config::{
    PlannerConfig, DEFAULT_EQUALITY_SELECTIVITY_FACTOR, DEFAULT_IN_MEMORY_SORT_BUDGET_BYTES,
};
pub use cost::{estimate, CorpusStats, CostEstimate, StaticStatistics, StatisticsProvider};
pub use errors::{ConfigError, ConfigResult, RecommendError, RecommendResult};
pub use explain::{ExplainAdvice, ExplainMatch};
pub use matcher::{evaluate, evaluate_snapshot, IndexMatch, MatchResult, ScanDirection};
pub use recommend::recommend;
