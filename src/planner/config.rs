//! Planner configuration
//!
//! - `equality_selectivity_factor`: expected narrowing per equality field
//!   in the index prefix (default 10)
//! - `in_memory_sort_budget_bytes`: memory an in-memory sort may use
//!   before the engine aborts the query (default 32 MiB)
//!
//! Both are explicit values threaded into estimation, never globals.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{ConfigError, ConfigResult};
use crate::observability::Logger;

/// Default expected selectivity per equality field
pub const DEFAULT_EQUALITY_SELECTIVITY_FACTOR: f64 = 10.0;

/// Default in-memory sort ceiling (32 MiB)
pub const DEFAULT_IN_MEMORY_SORT_BUDGET_BYTES: u64 = 32 * 1024 * 1024;

/// Planner options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    pub equality_selectivity_factor: f64,
    pub in_memory_sort_budget_bytes: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            equality_selectivity_factor: DEFAULT_EQUALITY_SELECTIVITY_FACTOR,
            in_memory_sort_budget_bytes: DEFAULT_IN_MEMORY_SORT_BUDGET_BYTES,
        }
    }
}

impl PlannerConfig {
    /// Builds and validates a config
    pub fn new(
        equality_selectivity_factor: f64,
        in_memory_sort_budget_bytes: u64,
    ) -> ConfigResult<Self> {
        let config = Self {
            equality_selectivity_factor,
            in_memory_sort_budget_bytes,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_selectivity_factor(mut self, factor: f64) -> Self {
        self.equality_selectivity_factor = factor;
        self
    }

    pub fn with_sort_budget(mut self, bytes: u64) -> Self {
        self.in_memory_sort_budget_bytes = bytes;
        self
    }

    /// Checks factor > 1 (and finite) and budget > 0.
    pub fn validate(&self) -> ConfigResult<()> {
        let factor = self.equality_selectivity_factor;
        if !factor.is_finite() || factor <= 1.0 {
            return Err(ConfigError::InvalidSelectivityFactor(factor));
        }
        if self.in_memory_sort_budget_bytes == 0 {
            return Err(ConfigError::InvalidSortBudget);
        }
        Ok(())
    }

    /// Parses and validates a JSON document; missing keys take defaults.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: PlannerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        Logger::info(
            "PLANNER_CONFIG_LOADED",
            &[
                ("equality_selectivity_factor", &config.equality_selectivity_factor.to_string()),
                ("in_memory_sort_budget_bytes", &config.in_memory_sort_budget_bytes.to_string()),
                ("path", &path.display().to_string()),
            ],
        );
        Ok(config)
    }
}
