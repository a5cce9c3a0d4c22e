//! Query shape normalization
//!
//! Splits a raw query into three disjoint roles:
//!
//! - equality: fields pinned to one value
//! - sort: ordered key sequence
//! - range: fields bounded or filtered without pinning a value
//!
//! A field may hold only one role. The one tolerated overlap is sort +
//! equality: sorting on a constant field orders nothing, so the field is
//! dropped from the sort sequence.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use super::ast::{BoundKind, FilterOp, Predicate, RawQuery};
use super::errors::{ShapeError, ShapeResult};
use crate::field::{Direction, FieldRef};

/// A range condition on one field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeCondition {
    pub field: String,
    pub lower: BoundKind,
    pub upper: BoundKind,
}

impl RangeCondition {
    pub fn new(field: impl Into<String>, lower: BoundKind, upper: BoundKind) -> Self {
        Self {
            field: field.into(),
            lower,
            upper,
        }
    }

    /// A range on `field` with neither side bounded (`$ne`, `$in`, ...)
    pub fn unbounded(field: impl Into<String>) -> Self {
        Self::new(field, BoundKind::Unbounded, BoundKind::Unbounded)
    }

    /// True if at least one side carries a bound
    pub fn is_bounded(&self) -> bool {
        self.lower != BoundKind::Unbounded || self.upper != BoundKind::Unbounded
    }

    fn absorb(&mut self, op: &FilterOp) {
        self.lower = self.lower.merge(op.lower_bound());
        self.upper = self.upper.merge(op.upper_bound());
    }
}

/// Normalized query shape.
///
/// Only constructed through [`normalize`] (or its wrappers), so the three
/// roles are always pairwise disjoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryShape {
    equality: BTreeSet<String>,
    sort: Vec<FieldRef>,
    range: BTreeMap<String, RangeCondition>,
}

impl QueryShape {
    /// Normalizes a [`RawQuery`]
    pub fn from_raw(query: &RawQuery) -> ShapeResult<Self> {
        normalize(&query.predicates, &query.sort)
    }

    /// Normalizes MongoDB-style filter and sort documents.
    ///
    /// `filter` maps fields to a value (implicit equality) or to an
    /// operator document (`{"$gte": 1, "$lt": 9}`). `sort` maps fields to
    /// `1` or `-1` in key order. Either may be `null` for "none".
    pub fn from_json(filter: &Value, sort: &Value) -> ShapeResult<Self> {
        let predicates = parse_filter(filter)?;
        let sort = parse_sort(sort)?;
        normalize(&predicates, &sort)
    }

    /// Equality field names, sorted
    pub fn equality(&self) -> &BTreeSet<String> {
        &self.equality
    }

    /// Sort sequence with equality fields removed
    pub fn sort(&self) -> &[FieldRef] {
        &self.sort
    }

    /// Range conditions keyed by field name
    pub fn range(&self) -> &BTreeMap<String, RangeCondition> {
        &self.range
    }

    pub fn is_equality_field(&self, field: &str) -> bool {
        self.equality.contains(field)
    }

    pub fn is_range_field(&self, field: &str) -> bool {
        self.range.contains_key(field)
    }

    /// Number of distinct fields across all roles
    pub fn field_count(&self) -> usize {
        self.equality.len() + self.sort.len() + self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }
}

/// Normalizes AND-ed predicates and a sort sequence into a [`QueryShape`].
///
/// Fails with `FieldRoleConflict` if a field is both equality and range,
/// or both sort and range.
pub fn normalize(filter: &[Predicate], sort: &[FieldRef]) -> ShapeResult<QueryShape> {
    let mut equality = BTreeSet::new();
    let mut range: BTreeMap<String, RangeCondition> = BTreeMap::new();

    for pred in filter {
        if pred.field.is_empty() {
            return Err(ShapeError::EmptyFieldName);
        }
        if pred.is_equality() {
            if range.contains_key(&pred.field) {
                return Err(ShapeError::role_conflict(&pred.field, "equality", "range"));
            }
            equality.insert(pred.field.clone());
        } else {
            if equality.contains(&pred.field) {
                return Err(ShapeError::role_conflict(&pred.field, "equality", "range"));
            }
            range
                .entry(pred.field.clone())
                .or_insert_with(|| RangeCondition::unbounded(pred.field.clone()))
                .absorb(&pred.op);
        }
    }

    let mut seen = BTreeSet::new();
    let mut sort_keys = Vec::with_capacity(sort.len());
    for key in sort {
        if key.field.is_empty() {
            return Err(ShapeError::EmptyFieldName);
        }
        if !seen.insert(key.field.as_str()) {
            return Err(ShapeError::DuplicateSortField(key.field.clone()));
        }
        if range.contains_key(&key.field) {
            return Err(ShapeError::role_conflict(&key.field, "sort", "range"));
        }
        // Constant field: contributes no ordering
        if equality.contains(&key.field) {
            continue;
        }
        sort_keys.push(key.clone());
    }

    Ok(QueryShape {
        equality,
        sort: sort_keys,
        range,
    })
}

fn parse_filter(filter: &Value) -> ShapeResult<Vec<Predicate>> {
    let doc = match filter {
        Value::Null => return Ok(Vec::new()),
        Value::Object(doc) => doc,
        other => {
            return Err(ShapeError::InvalidDocument(format!(
                "filter must be an object, got {}",
                json_type(other)
            )))
        }
    };

    let mut predicates = Vec::new();
    for (field, value) in doc {
        if field.starts_with('$') {
            return Err(ShapeError::UnsupportedOperator {
                field: "<root>".into(),
                operator: field.clone(),
            });
        }
        match value {
            Value::Object(ops) if is_operator_doc(ops) => {
                for (operator, operand) in ops {
                    let op = parse_operator(field, operator, operand)?;
                    predicates.push(Predicate::new(field.clone(), op));
                }
            }
            Value::Object(ops) if ops.keys().any(|k| k.starts_with('$')) => {
                return Err(ShapeError::InvalidDocument(format!(
                    "field '{}' mixes operators and plain keys",
                    field
                )));
            }
            // Plain value or embedded document: implicit equality
            _ => predicates.push(Predicate::eq(field.clone(), value.clone())),
        }
    }
    Ok(predicates)
}

fn is_operator_doc(ops: &Map<String, Value>) -> bool {
    !ops.is_empty() && ops.keys().all(|k| k.starts_with('$'))
}

fn parse_operator(field: &str, operator: &str, operand: &Value) -> ShapeResult<FilterOp> {
    let op = match operator {
        "$eq" => FilterOp::Eq(operand.clone()),
        "$gt" => FilterOp::Gt(operand.clone()),
        "$gte" => FilterOp::Gte(operand.clone()),
        "$lt" => FilterOp::Lt(operand.clone()),
        "$lte" => FilterOp::Lte(operand.clone()),
        "$ne" => FilterOp::Ne(operand.clone()),
        "$in" | "$nin" => {
            let values = operand.as_array().ok_or_else(|| {
                ShapeError::InvalidDocument(format!(
                    "{} on field '{}' requires an array",
                    operator, field
                ))
            })?;
            if operator == "$in" {
                FilterOp::In(values.clone())
            } else {
                FilterOp::Nin(values.clone())
            }
        }
        "$exists" => {
            let present = operand.as_bool().ok_or_else(|| {
                ShapeError::InvalidDocument(format!(
                    "$exists on field '{}' requires a boolean",
                    field
                ))
            })?;
            FilterOp::Exists(present)
        }
        _ => {
            return Err(ShapeError::UnsupportedOperator {
                field: field.into(),
                operator: operator.into(),
            })
        }
    };
    Ok(op)
}

fn parse_sort(sort: &Value) -> ShapeResult<Vec<FieldRef>> {
    let doc = match sort {
        Value::Null => return Ok(Vec::new()),
        Value::Object(doc) => doc,
        other => {
            return Err(ShapeError::InvalidDocument(format!(
                "sort must be an object, got {}",
                json_type(other)
            )))
        }
    };

    doc.iter()
        .map(|(field, value)| {
            value
                .as_i64()
                .and_then(Direction::from_key_value)
                .map(|direction| FieldRef::new(field.clone(), direction))
                .ok_or_else(|| ShapeError::InvalidSortDirection(field.clone()))
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
