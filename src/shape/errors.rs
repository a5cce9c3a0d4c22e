//! Query shape errors
//!
//! All shape errors are caller errors: the request is malformed and is
//! rejected synchronously, never retried.

use thiserror::Error;

/// Result type for shape operations
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Query shape normalization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// One field claims two incompatible roles in the same query
    #[error("field '{field}' cannot be both {first} and {second} in one query")]
    FieldRoleConflict {
        field: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("field '{0}' appears more than once in the sort sequence")]
    DuplicateSortField(String),

    #[error("field name must not be empty")]
    EmptyFieldName,

    #[error("unsupported operator '{operator}' on field '{field}'")]
    UnsupportedOperator { field: String, operator: String },

    #[error("sort direction for field '{0}' must be 1 or -1")]
    InvalidSortDirection(String),

    #[error("invalid query document: {0}")]
    InvalidDocument(String),
}

impl ShapeError {
    pub(crate) fn role_conflict(
        field: impl Into<String>,
        first: &'static str,
        second: &'static str,
    ) -> Self {
        ShapeError::FieldRoleConflict {
            field: field.into(),
            first,
            second,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ShapeError::FieldRoleConflict { .. } => "ESR_FIELD_ROLE_CONFLICT",
            ShapeError::DuplicateSortField(_) => "ESR_DUPLICATE_SORT_FIELD",
            ShapeError::EmptyFieldName => "ESR_EMPTY_FIELD_NAME",
            ShapeError::UnsupportedOperator { .. } => "ESR_UNSUPPORTED_OPERATOR",
            ShapeError::InvalidSortDirection(_) => "ESR_INVALID_SORT_DIRECTION",
            ShapeError::InvalidDocument(_) => "ESR_INVALID_DOCUMENT",
        }
    }

    /// Offending field name, if the error is about one field
    pub fn field(&self) -> Option<&str> {
        match self {
            ShapeError::FieldRoleConflict { field, .. }
            | ShapeError::UnsupportedOperator { field, .. } => Some(field),
            ShapeError::DuplicateSortField(field) | ShapeError::InvalidSortDirection(field) => {
                Some(field)
            }
            ShapeError::EmptyFieldName | ShapeError::InvalidDocument(_) => None,
        }
    }
}
