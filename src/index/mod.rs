//! Index subsystem
//!
//! Compound index definitions and the versioned catalog that holds them.
//!
//! # Invariants
//!
//! - Field names are unique within a definition
//! - Definitions are immutable once built
//! - Catalog snapshots are immutable; mutations publish a new version
//! - Catalog reads never block

mod catalog;
mod definition;
mod errors;
mod persist;

pub use catalog::{CatalogSnapshot, CatalogVersion, IndexCatalog};
pub use definition::{generated_name, DefinitionHash, IndexDefinition};
pub use errors::{CatalogError, CatalogResult, DefinitionError, DefinitionResult};
pub use persist::{load_catalog, save_catalog, CatalogFile, CATALOG_FORMAT_VERSION};
