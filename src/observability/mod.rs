//! Observability subsystem
//!
//! - Structured logging (JSON lines)
//! - Lock-free counters
//!
//! Pure planner functions never log; only the advisor, the catalog and
//! configuration loading emit events.
//!
//! ```ignore
//! use esrplan::observability::{Logger, MetricsRegistry};
//!
//! Logger::info("CATALOG_INDEX_ADDED", &[("index", "a_1_b_1")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_catalog_adds();
//! ```

mod logger;
mod metrics;

pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
