//! Index advisor
//!
//! Runs the whole flow for one query shape: evaluate every index of a
//! catalog snapshot, estimate each, rank, and recommend a new index when
//! nothing covers the query.
//!
//! Ranking (strict order, deterministic):
//! 1. Fully covered
//! 2. No in-memory sort risk
//! 3. No in-memory sort
//! 4. Lower scan cost proxy
//! 5. Longer consumed prefix
//!
//! Ties broken lexicographically by index name.

use std::cmp::{Ordering, Reverse};
use std::sync::Arc;

use super::config::PlannerConfig;
use super::cost::{estimate, CorpusStats, CostEstimate, StatisticsProvider};
use super::errors::ConfigResult;
use super::matcher::{evaluate, MatchResult};
use super::recommend::recommend;
use crate::index::{CatalogSnapshot, CatalogVersion, IndexDefinition};
use crate::observability::{Logger, MetricsRegistry, Severity};
use crate::shape::QueryShape;

/// Match and cost for one index
#[derive(Debug, Clone)]
pub struct CandidateReport {
    pub index: IndexDefinition,
    pub result: MatchResult,
    pub cost: CostEstimate,
}

impl CandidateReport {
    pub fn is_fully_covered(&self) -> bool {
        self.result.is_fully_covered()
    }

    fn rank_cmp(&self, other: &Self) -> Ordering {
        let key = |c: &CandidateReport| {
            (
                !c.is_fully_covered(),
                c.cost.in_memory_sort_risk,
                c.result.requires_in_memory_sort,
                c.cost.scan_cost_proxy,
                Reverse(c.result.consumed_prefix_length()),
            )
        };
        key(self)
            .cmp(&key(other))
            .then_with(|| self.index.name().cmp(other.index.name()))
    }
}

/// Ranked outcome of advising one shape against one snapshot
#[derive(Debug, Clone)]
pub struct Advice {
    pub catalog_version: CatalogVersion,
    /// `None` when the statistics provider had no entry; costs were then
    /// estimated against an empty corpus and no risk is flagged
    pub stats: Option<CorpusStats>,
    /// Best first
    pub candidates: Vec<CandidateReport>,
    /// Present iff no candidate is fully covered and the shape has fields
    pub recommendation: Option<IndexDefinition>,
}

impl Advice {
    pub fn best(&self) -> Option<&CandidateReport> {
        self.candidates.first()
    }

    pub fn stats_known(&self) -> bool {
        self.stats.is_some()
    }

    pub fn has_full_coverage(&self) -> bool {
        self.best().is_some_and(CandidateReport::is_fully_covered)
    }

    /// Candidates whose in-memory sort would exceed the budget
    pub fn risky_candidates(&self) -> impl Iterator<Item = &CandidateReport> {
        self.candidates.iter().filter(|c| c.cost.in_memory_sort_risk)
    }
}

/// Evaluates shapes against catalog snapshots
#[derive(Debug)]
pub struct Advisor {
    config: PlannerConfig,
    metrics: Arc<MetricsRegistry>,
}

impl Advisor {
    /// Creates an advisor after validating `config`
    pub fn new(config: PlannerConfig) -> ConfigResult<Self> {
        Self::with_metrics(config, Arc::new(MetricsRegistry::new()))
    }

    pub fn with_metrics(
        config: PlannerConfig,
        metrics: Arc<MetricsRegistry>,
    ) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { config, metrics })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Evaluates and estimates a single index. No logging, no counters.
    pub fn advise_index(
        &self,
        shape: &QueryShape,
        index: &IndexDefinition,
        stats: &CorpusStats,
    ) -> CandidateReport {
        let result = evaluate(shape, index);
        let cost = estimate(shape, &result, stats, &self.config);
        CandidateReport {
            index: index.clone(),
            result,
            cost,
        }
    }

    /// Advises `shape` against every index in `snapshot`.
    pub fn advise(
        &self,
        shape: &QueryShape,
        snapshot: &CatalogSnapshot,
        stats: &CorpusStats,
    ) -> Advice {
        self.advise_with(shape, snapshot, Some(*stats))
    }

    /// Like [`advise`](Self::advise), looking statistics up from `provider`.
    ///
    /// For an unknown collection the returned [`Advice::stats`] is `None`.
    /// Costs are then estimated against an empty corpus, so
    /// `in_memory_sort_risk` is never set and says nothing about the real
    /// risk; check [`Advice::stats_known`] before trusting it.
    pub fn advise_collection<P: StatisticsProvider + ?Sized>(
        &self,
        shape: &QueryShape,
        snapshot: &CatalogSnapshot,
        provider: &P,
        collection: &str,
    ) -> Advice {
        let stats = provider.corpus_stats(collection);
        if stats.is_none() {
            Logger::warn("CORPUS_STATS_UNAVAILABLE", &[("collection", collection)]);
        }
        self.advise_with(shape, snapshot, stats)
    }

    fn advise_with(
        &self,
        shape: &QueryShape,
        snapshot: &CatalogSnapshot,
        stats: Option<CorpusStats>,
    ) -> Advice {
        let corpus = stats.unwrap_or_default();
        let mut candidates: Vec<CandidateReport> = snapshot
            .indexes()
            .iter()
            .map(|index| self.advise_index(shape, index, &corpus))
            .collect();
        candidates.sort_by(CandidateReport::rank_cmp);

        let covered = candidates.iter().any(CandidateReport::is_fully_covered);
        let recommendation = if covered { None } else { recommend(shape).ok() };

        let advice = Advice {
            catalog_version: snapshot.version(),
            stats,
            candidates,
            recommendation,
        };
        self.record(&advice);
        advice
    }

    fn record(&self, advice: &Advice) {
        self.metrics.increment_advisories();
        self.metrics.add_candidates_evaluated(advice.candidates.len() as u64);

        if Logger::enabled(Severity::Trace) {
            for candidate in &advice.candidates {
                let prefix = candidate.result.consumed_prefix_length().to_string();
                let scan_cost = candidate.cost.scan_cost_proxy.to_string();
                Logger::trace(
                    "CANDIDATE_EVALUATED",
                    &[
                        ("consumed_prefix", prefix.as_str()),
                        ("covered", if candidate.is_fully_covered() { "true" } else { "false" }),
                        ("index", candidate.index.name()),
                        ("scan_cost", scan_cost.as_str()),
                    ],
                );
            }
        }

        for candidate in advice.risky_candidates() {
            self.metrics.increment_sort_risks();
            Logger::warn(
                "IN_MEMORY_SORT_RISK",
                &[
                    ("budget_bytes", &candidate.cost.sort_budget_bytes.to_string()),
                    ("estimated_sort_bytes", &candidate.cost.estimated_sort_bytes.to_string()),
                    ("index", candidate.index.name()),
                ],
            );
        }

        if advice.recommendation.is_some() {
            self.metrics.increment_recommendations();
        }

        Logger::info(
            "ADVICE_COMPLETE",
            &[
                ("best", advice.best().map(|c| c.index.name()).unwrap_or("")),
                ("candidates", &advice.candidates.len().to_string()),
                ("covered", if advice.has_full_coverage() { "true" } else { "false" }),
                (
                    "recommendation",
                    advice.recommendation.as_ref().map(|d| d.name()).unwrap_or(""),
                ),
                ("version", &advice.catalog_version.to_string()),
            ],
        );
    }
}
