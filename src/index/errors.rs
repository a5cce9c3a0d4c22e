//! Index definition and catalog errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for definition construction
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Index definition construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("index name must not be empty")]
    EmptyName,

    #[error("index '{index}' has an empty field name")]
    EmptyFieldName { index: String },

    #[error("index '{index}' lists field '{field}' more than once")]
    DuplicateField { index: String, field: String },

    #[error("invalid key pattern: {0}")]
    InvalidKeyPattern(String),
}

impl DefinitionError {
    pub fn code(&self) -> &'static str {
        match self {
            DefinitionError::EmptyName => "ESR_EMPTY_INDEX_NAME",
            DefinitionError::EmptyFieldName { .. } => "ESR_EMPTY_FIELD_NAME",
            DefinitionError::DuplicateField { .. } => "ESR_DUPLICATE_INDEX_FIELD",
            DefinitionError::InvalidKeyPattern(_) => "ESR_INVALID_KEY_PATTERN",
        }
    }
}

/// Catalog mutation and persistence errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// An index with the same field sequence is already registered
    #[error("index '{name}' duplicates the key of existing index '{existing}'")]
    DuplicateIndex { name: String, existing: String },

    #[error("index name '{0}' is already in use")]
    NameInUse(String),

    #[error("index '{0}' not found")]
    NotFound(String),

    #[error("index '{0}' has no fields")]
    EmptyDefinition(String),

    #[error("catalog file {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("catalog file is corrupt: {0}")]
    Corrupt(String),
}

impl CatalogError {
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::DuplicateIndex { .. } => "ESR_DUPLICATE_INDEX",
            CatalogError::NameInUse(_) => "ESR_INDEX_NAME_IN_USE",
            CatalogError::NotFound(_) => "ESR_INDEX_NOT_FOUND",
            CatalogError::EmptyDefinition(_) => "ESR_EMPTY_INDEX",
            CatalogError::Persistence { .. } => "ESR_CATALOG_IO",
            CatalogError::Corrupt(_) => "ESR_CATALOG_CORRUPT",
        }
    }

    /// Index name the error is about, if any
    pub fn index_name(&self) -> Option<&str> {
        match self {
            CatalogError::DuplicateIndex { name, .. }
            | CatalogError::NameInUse(name)
            | CatalogError::NotFound(name)
            | CatalogError::EmptyDefinition(name) => Some(name),
            CatalogError::Persistence { .. } | CatalogError::Corrupt(_) => None,
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CatalogError::Persistence {
            path: path.into(),
            source,
        }
    }
}
