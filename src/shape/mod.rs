//! Query shape subsystem
//!
//! Normalizes a raw filter + sort into equality, sort and range roles.
//! The roles are pairwise disjoint for every constructed [`QueryShape`].

mod ast;
mod errors;
mod normalize;

pub use ast::{BoundKind, FilterOp, Predicate, RawQuery};
pub use errors::{ShapeError, ShapeResult};
pub use normalize::{normalize, QueryShape, RangeCondition};
