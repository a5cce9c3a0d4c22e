//! Catalog persistence
//!
//! Optional JSON load/save of the definition sequence for hosts that keep
//! their catalog on disk between runs.
//!
//! Format:
//! ```json
//! {
//!   "format_version": 1,
//!   "saved_at": "2026-10-16T09:30:00Z",
//!   "catalog_version": 4,
//!   "indexes": [
//!     { "name": "esr", "key": { "transaction_type": 1, "transaction_date": 1, "amount": 1 } }
//!   ]
//! }
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{CatalogSnapshot, IndexCatalog};
use super::definition::IndexDefinition;
use super::errors::{CatalogError, CatalogResult};
use crate::observability::Logger;

/// Current on-disk format version
pub const CATALOG_FORMAT_VERSION: u8 = 1;

/// On-disk catalog document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub format_version: u8,
    pub saved_at: DateTime<Utc>,
    /// Version of the snapshot that was saved; informational only
    pub catalog_version: u64,
    pub indexes: Vec<IndexDefinition>,
}

impl CatalogFile {
    pub fn from_snapshot(snapshot: &CatalogSnapshot) -> Self {
        Self {
            format_version: CATALOG_FORMAT_VERSION,
            saved_at: Utc::now(),
            catalog_version: snapshot.version().value(),
            indexes: snapshot.indexes().to_vec(),
        }
    }

    pub fn to_json(&self) -> CatalogResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CatalogError::Corrupt(format!("failed to serialize catalog: {}", e)))
    }

    /// Parses and validates a catalog document.
    ///
    /// Every definition is validated while deserializing.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| CatalogError::Corrupt(format!("failed to parse catalog: {}", e)))?;
        if file.format_version != CATALOG_FORMAT_VERSION {
            return Err(CatalogError::Corrupt(format!(
                "unsupported format_version {}",
                file.format_version
            )));
        }
        Ok(file)
    }
}

/// Writes `snapshot` to `path`.
///
/// The document goes to a sibling temp file which is synced and then
/// renamed over `path`, so readers see either the old or the new file.
pub fn save_catalog(path: &Path, snapshot: &CatalogSnapshot) -> CatalogResult<()> {
    let json = CatalogFile::from_snapshot(snapshot).to_json()?;
    let tmp = path.with_extension("json.tmp");

    if let Err(err) = write_and_commit(&tmp, path, json.as_bytes()) {
        let _ = fs::remove_file(&tmp);
        Logger::error(
            "CATALOG_SAVE_FAILED",
            &[
                ("code", err.code()),
                ("error", err.to_string().as_str()),
                ("path", path.display().to_string().as_str()),
            ],
        );
        return Err(err);
    }

    Logger::info(
        "CATALOG_SAVED",
        &[
            ("indexes", &snapshot.len().to_string()),
            ("path", &path.display().to_string()),
            ("version", &snapshot.version().to_string()),
        ],
    );
    Ok(())
}

fn write_and_commit(tmp: &Path, path: &Path, content: &[u8]) -> CatalogResult<()> {
    let mut file = File::create(tmp).map_err(|e| CatalogError::persistence(tmp, e))?;
    file.write_all(content).map_err(|e| CatalogError::persistence(tmp, e))?;
    file.sync_all().map_err(|e| CatalogError::persistence(tmp, e))?;
    fs::rename(tmp, path).map_err(|e| CatalogError::persistence(path, e))?;

    // Rename is durable only once the directory entry is synced
    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
    Ok(())
}

/// Reads the definition sequence stored at `path`.
pub fn load_catalog(path: &Path) -> CatalogResult<Vec<IndexDefinition>> {
    let content = fs::read_to_string(path).map_err(|e| CatalogError::persistence(path, e))?;
    let file = CatalogFile::from_json(&content)?;
    Ok(file.indexes)
}

impl IndexCatalog {
    /// Builds a catalog at version 0 from the file at `path`
    pub fn from_file(path: &Path) -> CatalogResult<Self> {
        let defs = load_catalog(path)?;
        let count = defs.len().to_string();
        let catalog = Self::from_definitions(defs)?;
        Logger::info(
            "CATALOG_LOADED",
            &[("indexes", &count), ("path", &path.display().to_string())],
        );
        Ok(catalog)
    }

    /// Saves the current snapshot to `path`
    pub fn save(&self, path: &Path) -> CatalogResult<()> {
        save_catalog(path, &self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldRef;
    use tempfile::TempDir;

    fn esr_index() -> IndexDefinition {
        IndexDefinition::new(
            "esr",
            vec![
                FieldRef::asc("transaction_type"),
                FieldRef::desc("transaction_date"),
                FieldRef::asc("amount"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");

        let catalog = IndexCatalog::new();
        catalog.add(esr_index()).unwrap();
        catalog
            .add(IndexDefinition::new("status_1", vec![FieldRef::asc("status")]).unwrap())
            .unwrap();
        catalog.save(&path).unwrap();

        let loaded = IndexCatalog::from_file(&path).unwrap();
        let snap = loaded.snapshot();
        assert_eq!(snap.indexes(), catalog.snapshot().indexes());
        assert_eq!(snap.get("esr").unwrap().fields()[1], FieldRef::desc("transaction_date"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_failed_save_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        // A directory at the target path makes the rename fail
        let path = dir.path().join("catalog.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        let catalog = IndexCatalog::new();
        catalog.add(esr_index()).unwrap();

        let err = catalog.save(&path).unwrap_err();
        assert_eq!(err.code(), "ESR_CATALOG_IO");
        assert!(!path.with_extension("json.tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn test_missing_file_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        let err = load_catalog(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), "ESR_CATALOG_IO");
    }

    #[test]
    fn test_corrupt_file_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_catalog(&path).unwrap_err().code(), "ESR_CATALOG_CORRUPT");
    }

    #[test]
    fn test_invalid_definition_in_file_rejected() {
        let json = r#"{
            "format_version": 1,
            "saved_at": "2026-10-16T09:30:00Z",
            "catalog_version": 1,
            "indexes": [ { "name": "bad", "key": { "a": 1, "b": 5 } } ]
        }"#;
        assert_eq!(CatalogFile::from_json(json).unwrap_err().code(), "ESR_CATALOG_CORRUPT");
    }

    #[test]
    fn test_unknown_format_version_rejected() {
        let json = r#"{
            "format_version": 9,
            "saved_at": "2026-10-16T09:30:00Z",
            "catalog_version": 0,
            "indexes": []
        }"#;
        assert!(CatalogFile::from_json(json).is_err());
    }

    #[test]
    fn test_duplicate_keys_in_file_rejected_on_build() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let json = r#"{
            "format_version": 1,
            "saved_at": "2026-10-16T09:30:00Z",
            "catalog_version": 2,
            "indexes": [
                { "name": "one", "key": { "a": 1 } },
                { "name": "two", "key": { "a": 1 } }
            ]
        }"#;
        fs::write(&path, json).unwrap();

        let err = IndexCatalog::from_file(&path).unwrap_err();
        assert_eq!(err.code(), "ESR_DUPLICATE_INDEX");
    }
}
