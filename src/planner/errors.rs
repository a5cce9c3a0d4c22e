//! Planner error types
//!
//! Error codes:
//! - ESR_EMPTY_SHAPE
//! - index definition codes, passed through unchanged
//! - ESR_INVALID_SELECTIVITY_FACTOR
//! - ESR_INVALID_SORT_BUDGET
//! - ESR_CONFIG_IO
//! - ESR_CONFIG_PARSE

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::index::DefinitionError;

/// Result type for recommendation
pub type RecommendResult<T> = Result<T, RecommendError>;

/// Result type for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Index recommendation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecommendError {
    /// The shape has no equality, sort or range fields
    #[error("cannot recommend an index for a query with no fields")]
    EmptyShape,

    #[error(transparent)]
    InvalidDefinition(#[from] DefinitionError),
}

impl RecommendError {
    pub fn code(&self) -> &'static str {
        match self {
            RecommendError::EmptyShape => "ESR_EMPTY_SHAPE",
            RecommendError::InvalidDefinition(err) => err.code(),
        }
    }
}

/// Planner configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("equality_selectivity_factor must be a finite number > 1, got {0}")]
    InvalidSelectivityFactor(f64),

    #[error("in_memory_sort_budget_bytes must be > 0")]
    InvalidSortBudget,

    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidSelectivityFactor(_) => "ESR_INVALID_SELECTIVITY_FACTOR",
            ConfigError::InvalidSortBudget => "ESR_INVALID_SORT_BUDGET",
            ConfigError::Io { .. } => "ESR_CONFIG_IO",
            ConfigError::Parse(_) => "ESR_CONFIG_PARSE",
        }
    }
}
