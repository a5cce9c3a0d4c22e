//! Index recommendation
//!
//! Builds the canonical Equality, Sort, Range key for a shape:
//!
//! 1. Equality fields, lexicographic (any order is equally good)
//! 2. Sort keys verbatim, directions included
//! 3. Range fields, lexicographic (only the first bounds a scan)

use super::errors::{RecommendError, RecommendResult};
use crate::field::FieldRef;
use crate::index::IndexDefinition;
use crate::shape::QueryShape;

/// Recommends the ESR-ordered index for `shape`. Pure and deterministic.
///
/// The result, evaluated against `shape`, consumes every equality field,
/// serves the sort, and bounds the scan on the first range field.
pub fn recommend(shape: &QueryShape) -> RecommendResult<IndexDefinition> {
    if shape.is_empty() {
        return Err(RecommendError::EmptyShape);
    }

    let mut fields = Vec::with_capacity(shape.field_count());
    fields.extend(shape.equality().iter().map(|f| FieldRef::asc(f.clone())));
    fields.extend(shape.sort().iter().cloned());
    fields.extend(shape.range().keys().map(|f| FieldRef::asc(f.clone())));

    Ok(IndexDefinition::with_generated_name(fields)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::matcher::evaluate;
    use crate::shape::{Predicate, RawQuery};
    use serde_json::json;

    #[test]
    fn test_esr_order() {
        let shape = QueryShape::from_raw(
            &RawQuery::new()
                .with_predicate(Predicate::gt("zeta", json!(0)))
                .with_predicate(Predicate::lt("alpha", json!(9)))
                .filter_eq("status", json!("A"))
                .filter_eq("kind", json!("B"))
                .sort_desc("created_at")
                .sort_asc("seq"),
        )
        .unwrap();

        let def = recommend(&shape).unwrap();
        assert_eq!(
            def.fields(),
            &[
                FieldRef::asc("kind"),
                FieldRef::asc("status"),
                FieldRef::desc("created_at"),
                FieldRef::asc("seq"),
                FieldRef::asc("alpha"),
                FieldRef::asc("zeta"),
            ]
        );
        assert_eq!(def.name(), "kind_1_status_1_created_at_-1_seq_1_alpha_1_zeta_1");

        let r = evaluate(&shape, &def);
        assert_eq!(r.equality_prefix_length, 2);
        assert!(r.sort_satisfied);
        assert_eq!(r.bounded_range_field(), Some("alpha"));
        assert_eq!(r.residual_range_fields, vec!["zeta".to_string()]);
        assert!(r.is_fully_covered());
    }

    #[test]
    fn test_empty_shape_rejected() {
        let shape = QueryShape::from_raw(&RawQuery::new()).unwrap();
        assert_eq!(recommend(&shape).unwrap_err(), RecommendError::EmptyShape);
    }

    #[test]
    fn test_sort_only() {
        let shape = QueryShape::from_raw(&RawQuery::new().sort_desc("ts")).unwrap();
        let def = recommend(&shape).unwrap();
        assert_eq!(def.fields(), &[FieldRef::desc("ts")]);
    }

    #[test]
    fn test_deterministic() {
        let shape = QueryShape::from_json(
            &json!({"b": 1, "a": 2, "r": {"$gte": 3}}),
            &json!({"s": -1}),
        )
        .unwrap();
        let first = recommend(&shape).unwrap();
        for _ in 0..10 {
            assert_eq!(recommend(&shape).unwrap().fields(), first.fields());
        }
    }
}
