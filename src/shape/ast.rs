//! Raw query structures
//!
//! The unnormalized filter/sort representation handed to `normalize`.

use serde_json::Value;

use crate::field::FieldRef;

/// Filter operation types
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// field = value
    Eq(Value),
    /// field > value
    Gt(Value),
    /// field >= value
    Gte(Value),
    /// field < value
    Lt(Value),
    /// field <= value
    Lte(Value),
    /// field != value
    Ne(Value),
    /// field in [values]
    In(Vec<Value>),
    /// field not in [values]
    Nin(Vec<Value>),
    /// field present / absent
    Exists(bool),
}

impl FilterOp {
    /// Returns true if this pins the field to a single value
    pub fn is_equality(&self) -> bool {
        matches!(self, FilterOp::Eq(_))
    }

    /// Returns true if this is a range-style operation.
    ///
    /// Negations, set membership and existence cannot pin a single index
    /// key, so they are classified as range.
    pub fn is_range(&self) -> bool {
        !self.is_equality()
    }

    /// Lower bound marker contributed by this operation
    pub fn lower_bound(&self) -> BoundKind {
        match self {
            FilterOp::Gt(_) => BoundKind::Open,
            FilterOp::Gte(_) => BoundKind::Closed,
            _ => BoundKind::Unbounded,
        }
    }

    /// Upper bound marker contributed by this operation
    pub fn upper_bound(&self) -> BoundKind {
        match self {
            FilterOp::Lt(_) => BoundKind::Open,
            FilterOp::Lte(_) => BoundKind::Closed,
            _ => BoundKind::Unbounded,
        }
    }
}

/// One side of a range condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundKind {
    /// Strict bound (`>` / `<`)
    Open,
    /// Inclusive bound (`>=` / `<=`)
    Closed,
    /// No bound on this side
    Unbounded,
}

impl BoundKind {
    /// Combines two markers for the same side of one field.
    ///
    /// Without the bound values the tighter of two set markers is unknown;
    /// a strict marker wins.
    pub fn merge(self, other: BoundKind) -> BoundKind {
        match (self, other) {
            (BoundKind::Unbounded, b) | (b, BoundKind::Unbounded) => b,
            (BoundKind::Open, _) | (_, BoundKind::Open) => BoundKind::Open,
            (BoundKind::Closed, BoundKind::Closed) => BoundKind::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoundKind::Open => "open",
            BoundKind::Closed => "closed",
            BoundKind::Unbounded => "unbounded",
        }
    }
}

/// A single predicate (field + operation)
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: FilterOp,
}

impl Predicate {
    pub fn new(field: impl Into<String>, op: FilterOp) -> Self {
        Self {
            field: field.into(),
            op,
        }
    }

    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Eq(value))
    }

    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Gt(value))
    }

    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Gte(value))
    }

    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Lt(value))
    }

    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Lte(value))
    }

    pub fn is_equality(&self) -> bool {
        self.op.is_equality()
    }

    pub fn is_range(&self) -> bool {
        self.op.is_range()
    }
}

/// Unnormalized query: AND-ed predicates plus a sort sequence
#[derive(Debug, Clone, Default)]
pub struct RawQuery {
    pub predicates: Vec<Predicate>,
    pub sort: Vec<FieldRef>,
}

impl RawQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Adds an equality filter
    pub fn filter_eq(self, field: impl Into<String>, value: Value) -> Self {
        self.with_predicate(Predicate::eq(field, value))
    }

    /// Appends a sort key
    pub fn with_sort(mut self, key: FieldRef) -> Self {
        self.sort.push(key);
        self
    }

    pub fn sort_asc(self, field: impl Into<String>) -> Self {
        self.with_sort(FieldRef::asc(field))
    }

    pub fn sort_desc(self, field: impl Into<String>) -> Self {
        self.with_sort(FieldRef::desc(field))
    }
}
