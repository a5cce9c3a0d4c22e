//! esrplan - Equality, Sort, Range compound index planning
//!
//! Decides how much of a compound index a query can use, whether index
//! order serves the sort, and which index ordering would serve it fully.

pub mod field;
pub mod index;
pub mod observability;
pub mod planner;
pub mod shape;

pub use field::{Direction, FieldRef};
pub use index::{CatalogSnapshot, CatalogVersion, IndexCatalog, IndexDefinition};
pub use planner::{
    estimate, evaluate, recommend, Advice, Advisor, CorpusStats, CostEstimate, MatchResult,
    PlannerConfig,
};
pub use shape::{normalize, QueryShape};
