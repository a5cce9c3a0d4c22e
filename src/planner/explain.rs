//! Explain output
//!
//! Deterministic, line-oriented rendering of candidate reports and advice.

use std::fmt;

use super::advisor::{Advice, CandidateReport};

/// Explain view of one candidate index
#[derive(Debug, Clone)]
pub struct ExplainMatch {
    pub index: String,
    pub key: String,
    pub fully_covered: bool,
    pub equality_prefix: usize,
    pub sort: String,
    pub bounded_range: Option<String>,
    pub residual_filters: Vec<String>,
    pub unused_suffix: Vec<String>,
    pub scan_cost_proxy: u64,
    pub estimated_sort_bytes: u64,
    pub in_memory_sort_risk: bool,
}

impl ExplainMatch {
    pub fn from_report(report: &CandidateReport) -> Self {
        let result = &report.result;

        let sort = if result.requires_in_memory_sort {
            "IN_MEMORY".to_string()
        } else if result.sort_consumed_length == 0 {
            "NONE".to_string()
        } else {
            format!(
                "INDEX ({} keys, {})",
                result.sort_consumed_length,
                result.scan_direction.as_str()
            )
        };

        let residual_filters = result
            .residual_equality_fields
            .iter()
            .map(|f| format!("{} (equality)", f))
            .chain(
                result
                    .residual_range_fields
                    .iter()
                    .map(|f| format!("{} (range)", f)),
            )
            .collect();

        Self {
            index: report.index.name().to_string(),
            key: report.index.key_pattern().to_string(),
            fully_covered: report.is_fully_covered(),
            equality_prefix: result.equality_prefix_length,
            sort,
            bounded_range: result.bounded_range_field().map(String::from),
            residual_filters,
            unused_suffix: result
                .unused_index_suffix
                .iter()
                .map(ToString::to_string)
                .collect(),
            scan_cost_proxy: report.cost.scan_cost_proxy,
            estimated_sort_bytes: report.cost.estimated_sort_bytes,
            in_memory_sort_risk: report.cost.in_memory_sort_risk,
        }
    }
}

impl fmt::Display for ExplainMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Index: {} {}", self.index, self.key)?;
        writeln!(
            f,
            "  Coverage: {}",
            if self.fully_covered { "FULL" } else { "PARTIAL" }
        )?;
        writeln!(f, "  Equality Prefix: {}", self.equality_prefix)?;
        writeln!(f, "  Sort: {}", self.sort)?;
        match &self.bounded_range {
            Some(field) => writeln!(f, "  Bounded Range: {}", field)?,
            None => writeln!(f, "  Bounded Range: none")?,
        }
        if !self.residual_filters.is_empty() {
            writeln!(f, "  Residual Filters:")?;
            for filter in &self.residual_filters {
                writeln!(f, "    - {}", filter)?;
            }
        }
        if !self.unused_suffix.is_empty() {
            writeln!(f, "  Unused Suffix: {}", self.unused_suffix.join(", "))?;
        }
        writeln!(f, "  Scan Cost: {} documents", self.scan_cost_proxy)?;
        if self.estimated_sort_bytes > 0 {
            writeln!(f, "  Sort Memory: {} bytes", self.estimated_sort_bytes)?;
        }
        if self.in_memory_sort_risk {
            writeln!(f, "  WARNING: in-memory sort exceeds budget")?;
        }
        Ok(())
    }
}

/// Explain view of a full advice
#[derive(Debug, Clone)]
pub struct ExplainAdvice {
    pub catalog_version: String,
    pub stats_known: bool,
    pub candidates: Vec<ExplainMatch>,
    pub recommendation: Option<String>,
}

impl ExplainAdvice {
    pub fn from_advice(advice: &Advice) -> Self {
        Self {
            catalog_version: advice.catalog_version.to_string(),
            stats_known: advice.stats_known(),
            candidates: advice
                .candidates
                .iter()
                .map(ExplainMatch::from_report)
                .collect(),
            recommendation: advice.recommendation.as_ref().map(|d| d.to_string()),
        }
    }
}

impl fmt::Display for ExplainAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== INDEX ADVICE ===")?;
        writeln!(f, "Catalog: {}", self.catalog_version)?;
        if !self.stats_known {
            writeln!(f, "Statistics: unknown (sort risk not assessed)")?;
        }

        let covered = self.candidates.first().is_some_and(|c| c.fully_covered);
        writeln!(f, "Status: {}", if covered { "COVERED" } else { "NOT COVERED" })?;

        if self.candidates.is_empty() {
            writeln!(f, "Candidates: none")?;
        }
        for (rank, candidate) in self.candidates.iter().enumerate() {
            write!(f, "#{} ", rank + 1)?;
            write!(f, "{}", candidate)?;
        }

        if let Some(rec) = &self.recommendation {
            writeln!(f, "Recommended Index: {}", rec)?;
        }
        Ok(())
    }
}
