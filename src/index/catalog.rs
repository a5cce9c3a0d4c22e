//! Versioned index catalog
//!
//! Readers take an `Arc<CatalogSnapshot>` and keep it as long as they like;
//! a snapshot never changes. Every `add`/`drop` builds the next snapshot
//! and publishes it with a single atomic pointer swap.
//!
//! # Invariants
//!
//! - `snapshot()` never blocks and never observes a partial mutation
//! - Versions increase by one per successful mutation
//! - Writers serialize on one mutex; readers never take it
//! - No two registered indexes share a name or a field sequence

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};

use super::definition::IndexDefinition;
use super::errors::{CatalogError, CatalogResult};
use crate::observability::{Logger, MetricsRegistry};

/// Monotonic catalog version; 0 is the initial catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CatalogVersion(u64);

impl CatalogVersion {
    pub const INITIAL: CatalogVersion = CatalogVersion(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CatalogVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Immutable view of the catalog at one version
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    version: CatalogVersion,
    indexes: Vec<IndexDefinition>,
    published_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    fn new(version: CatalogVersion, indexes: Vec<IndexDefinition>) -> Self {
        Self {
            version,
            indexes,
            published_at: Utc::now(),
        }
    }

    pub fn version(&self) -> CatalogVersion {
        self.version
    }

    /// Definitions in registration order
    pub fn indexes(&self) -> &[IndexDefinition] {
        &self.indexes
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn get(&self, name: &str) -> Option<&IndexDefinition> {
        self.indexes.iter().find(|d| d.name() == name)
    }

    /// Registered definition with the same field sequence, if any
    pub fn find_same_key(&self, def: &IndexDefinition) -> Option<&IndexDefinition> {
        self.indexes.iter().find(|d| d.same_key(def))
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

/// Copy-on-write catalog of index definitions
pub struct IndexCatalog {
    current: ArcSwap<CatalogSnapshot>,
    writer: Mutex<()>,
    metrics: Arc<MetricsRegistry>,
}

impl IndexCatalog {
    /// Creates an empty catalog at version 0
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(MetricsRegistry::new()))
    }

    /// Creates an empty catalog reporting into `metrics`
    pub fn with_metrics(metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            current: ArcSwap::from_pointee(CatalogSnapshot::new(
                CatalogVersion::INITIAL,
                Vec::new(),
            )),
            writer: Mutex::new(()),
            metrics,
        }
    }

    /// Creates a catalog at version 0 holding `defs`, validated as by `add`
    pub fn from_definitions(defs: Vec<IndexDefinition>) -> CatalogResult<Self> {
        validate_all(&defs)?;
        let catalog = Self::new();
        catalog
            .current
            .store(Arc::new(CatalogSnapshot::new(CatalogVersion::INITIAL, defs)));
        Ok(catalog)
    }

    /// Current snapshot. Lock-free.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.load_full()
    }

    pub fn version(&self) -> CatalogVersion {
        self.current.load().version()
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Registers a definition and publishes a new version.
    pub fn add(&self, def: IndexDefinition) -> CatalogResult<CatalogVersion> {
        let _guard = self.lock_writer();
        let current = self.current.load_full();

        if let Err(err) = check_insertable(&current, &def) {
            return Err(self.rejected("add", err));
        }

        let mut indexes = current.indexes().to_vec();
        let name = def.name().to_string();
        let hash = def.hash().to_string();
        indexes.push(def);

        let version = self.publish(current.version().next(), indexes);
        self.metrics.increment_catalog_adds();
        Logger::info(
            "CATALOG_INDEX_ADDED",
            &[
                ("hash", &hash),
                ("index", &name),
                ("version", &version.to_string()),
            ],
        );
        Ok(version)
    }

    /// Removes the definition called `name` and publishes a new version.
    pub fn drop(&self, name: &str) -> CatalogResult<CatalogVersion> {
        let _guard = self.lock_writer();
        let current = self.current.load_full();

        let Some(position) = current.indexes().iter().position(|d| d.name() == name) else {
            return Err(self.rejected("drop", CatalogError::NotFound(name.to_string())));
        };

        let mut indexes = current.indexes().to_vec();
        indexes.remove(position);

        let version = self.publish(current.version().next(), indexes);
        self.metrics.increment_catalog_drops();
        Logger::info(
            "CATALOG_INDEX_DROPPED",
            &[("index", name), ("version", &version.to_string())],
        );
        Ok(version)
    }

    /// Atomically replaces every definition with `defs`.
    pub fn replace_all(&self, defs: Vec<IndexDefinition>) -> CatalogResult<CatalogVersion> {
        let _guard = self.lock_writer();
        let current = self.current.load_full();

        if let Err(err) = validate_all(&defs) {
            return Err(self.rejected("replace_all", err));
        }

        let count = defs.len().to_string();
        let version = self.publish(current.version().next(), defs);
        Logger::info(
            "CATALOG_REPLACED",
            &[("indexes", &count), ("version", &version.to_string())],
        );
        Ok(version)
    }

    fn publish(&self, version: CatalogVersion, indexes: Vec<IndexDefinition>) -> CatalogVersion {
        self.current.store(Arc::new(CatalogSnapshot::new(version, indexes)));
        version
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        // Guards write ordering only; a poisoned lock carries no state
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rejected(&self, operation: &str, err: CatalogError) -> CatalogError {
        self.metrics.increment_catalog_rejections();
        Logger::warn(
            "CATALOG_MUTATION_REJECTED",
            &[
                ("code", err.code()),
                ("index", err.index_name().unwrap_or("")),
                ("operation", operation),
            ],
        );
        err
    }
}

impl Default for IndexCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IndexCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.current.load();
        f.debug_struct("IndexCatalog")
            .field("version", &snapshot.version())
            .field("indexes", &snapshot.len())
            .finish()
    }
}

fn check_insertable(snapshot: &CatalogSnapshot, def: &IndexDefinition) -> CatalogResult<()> {
    if def.is_empty() {
        return Err(CatalogError::EmptyDefinition(def.name().to_string()));
    }
    if let Some(existing) = snapshot.find_same_key(def) {
        return Err(CatalogError::DuplicateIndex {
            name: def.name().to_string(),
            existing: existing.name().to_string(),
        });
    }
    if snapshot.get(def.name()).is_some() {
        return Err(CatalogError::NameInUse(def.name().to_string()));
    }
    Ok(())
}

fn validate_all(defs: &[IndexDefinition]) -> CatalogResult<()> {
    let mut names = HashSet::with_capacity(defs.len());
    for (i, def) in defs.iter().enumerate() {
        if def.is_empty() {
            return Err(CatalogError::EmptyDefinition(def.name().to_string()));
        }
        if let Some(existing) = defs[..i].iter().find(|d| d.same_key(def)) {
            return Err(CatalogError::DuplicateIndex {
                name: def.name().to_string(),
                existing: existing.name().to_string(),
            });
        }
        if !names.insert(def.name()) {
            return Err(CatalogError::NameInUse(def.name().to_string()));
        }
    }
    Ok(())
}
