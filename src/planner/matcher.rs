//! Match evaluation
//!
//! Decides how much of one compound index a query shape can use:
//!
//! 1. Equality prefix: leading index fields that are equality fields, in
//!    any order. Consumed from a working set so no permutation search is
//!    needed.
//! 2. Sort: the next `len(sort)` index fields must equal the sort
//!    sequence, all in the same direction or all reversed. Partial
//!    alignment does not count.
//! 3. Range: if the next index field is a range field it bounds the scan.
//!    Only one range field can bound a single index scan; every other range
//!    field is a residual filter.
//! 4. Whatever is left is the unused suffix.

use std::collections::BTreeSet;

use crate::field::FieldRef;
use crate::index::{CatalogSnapshot, IndexDefinition};
use crate::shape::QueryShape;

/// Direction the index is walked to serve the sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanDirection {
    Forward,
    /// Every key direction flipped
    Backward,
}

impl ScanDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanDirection::Forward => "forward",
            ScanDirection::Backward => "backward",
        }
    }
}

/// How a query shape uses one index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Leading index fields consumed by equality conditions
    pub equality_prefix_length: usize,
    /// True if index order serves the sort (vacuously true with no sort)
    pub sort_satisfied: bool,
    /// Index fields consumed by the sort; 0 if no sort or unsatisfied
    pub sort_consumed_length: usize,
    pub scan_direction: ScanDirection,
    /// The bounded range field, if any (at most one)
    pub range_fields_covered_by_index: Vec<String>,
    /// Range conditions applied after the scan, sorted by name
    pub residual_range_fields: Vec<String>,
    /// Equality conditions not in the prefix, sorted by name
    pub residual_equality_fields: Vec<String>,
    pub requires_in_memory_sort: bool,
    /// Index fields after everything consumed
    pub unused_index_suffix: Vec<FieldRef>,
}

impl MatchResult {
    /// Index fields used by equality, sort and the bounded range
    pub fn consumed_prefix_length(&self) -> usize {
        self.equality_prefix_length
            + self.sort_consumed_length
            + self.range_fields_covered_by_index.len()
    }

    pub fn bounded_range_field(&self) -> Option<&str> {
        self.range_fields_covered_by_index.first().map(String::as_str)
    }

    /// Every equality field in the prefix, no in-memory sort, and a bounded
    /// range field whenever the shape has range conditions.
    pub fn is_fully_covered(&self) -> bool {
        let has_range = !self.range_fields_covered_by_index.is_empty()
            || !self.residual_range_fields.is_empty();
        self.residual_equality_fields.is_empty()
            && !self.requires_in_memory_sort
            && (!has_range || self.bounded_range_field().is_some())
    }

    /// True if nothing in the index helps the query
    pub fn is_unused(&self) -> bool {
        self.consumed_prefix_length() == 0
    }
}

/// One index of a snapshot paired with its match
#[derive(Debug, Clone)]
pub struct IndexMatch<'a> {
    pub index: &'a IndexDefinition,
    pub result: MatchResult,
}

/// Evaluates `shape` against `index`. Pure.
pub fn evaluate(shape: &QueryShape, index: &IndexDefinition) -> MatchResult {
    let fields = index.fields();
    let mut remaining_equality: BTreeSet<&str> =
        shape.equality().iter().map(String::as_str).collect();

    let mut pos = 0;
    while pos < fields.len() && remaining_equality.remove(fields[pos].field.as_str()) {
        pos += 1;
    }
    let equality_prefix_length = pos;

    let sort = shape.sort();
    let sort_direction = match_sort(&fields[pos..], sort);
    let sort_satisfied = sort_direction.is_some();
    let sort_consumed_length = if sort_satisfied { sort.len() } else { 0 };
    pos += sort_consumed_length;

    let mut range_fields_covered_by_index = Vec::new();
    if let Some(next) = fields.get(pos) {
        if shape.is_range_field(&next.field) {
            range_fields_covered_by_index.push(next.field.clone());
            pos += 1;
        }
    }

    let residual_range_fields = shape
        .range()
        .keys()
        .filter(|f| !range_fields_covered_by_index.contains(*f))
        .cloned()
        .collect();

    MatchResult {
        equality_prefix_length,
        sort_satisfied,
        sort_consumed_length,
        scan_direction: sort_direction.unwrap_or(ScanDirection::Forward),
        range_fields_covered_by_index,
        residual_range_fields,
        residual_equality_fields: remaining_equality.into_iter().map(String::from).collect(),
        requires_in_memory_sort: !sort.is_empty() && !sort_satisfied,
        unused_index_suffix: fields[pos..].to_vec(),
    }
}

/// Evaluates `shape` against every index of `snapshot`, in catalog order.
pub fn evaluate_snapshot<'a>(
    shape: &QueryShape,
    snapshot: &'a CatalogSnapshot,
) -> Vec<IndexMatch<'a>> {
    snapshot
        .indexes()
        .iter()
        .map(|index| IndexMatch {
            index,
            result: evaluate(shape, index),
        })
        .collect()
}

/// Scan direction serving `sort` from the head of `keys`, if any.
fn match_sort(keys: &[FieldRef], sort: &[FieldRef]) -> Option<ScanDirection> {
    if sort.is_empty() {
        return Some(ScanDirection::Forward);
    }
    let window = keys.get(..sort.len())?;
    if window.iter().zip(sort).any(|(k, s)| k.field != s.field) {
        return None;
    }
    if window.iter().zip(sort).all(|(k, s)| k.direction == s.direction) {
        Some(ScanDirection::Forward)
    } else if window.iter().zip(sort).all(|(k, s)| k.direction == s.direction.reversed()) {
        Some(ScanDirection::Backward)
    } else {
        None
    }
}
