//! ESR Scenario Tests
//!
//! Tests for matching, costing and recommendation end to end:
//! - Range-first index loses the prefix and the sort
//! - ESR-ordered index serves equality, sort and range
//! - Recommendation reproduces the ESR order
//! - Sort budget threshold

use esrplan::field::FieldRef;
use esrplan::index::{IndexCatalog, IndexDefinition};
use esrplan::planner::{
    estimate, evaluate, recommend, Advisor, CorpusStats, PlannerConfig, ScanDirection,
};
use esrplan::shape::{Predicate, QueryShape, RawQuery};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

/// `{transaction_type: "debit", amount: {$gt: 100}}` sorted by `transaction_date`
fn transactions_shape() -> QueryShape {
    QueryShape::from_raw(
        &RawQuery::new()
            .filter_eq("transaction_type", json!("debit"))
            .with_predicate(Predicate::gt("amount", json!(100)))
            .sort_asc("transaction_date"),
    )
    .unwrap()
}

fn index(name: &str, fields: &[&str]) -> IndexDefinition {
    IndexDefinition::new(name, fields.iter().map(|f| FieldRef::asc(*f)).collect()).unwrap()
}

// =============================================================================
// Matching
// =============================================================================

/// Range field first: no equality prefix, sort falls back to memory.
#[test]
fn test_range_first_index() {
    let shape = transactions_shape();
    let idx = index("range_first", &["amount", "transaction_type", "transaction_date"]);

    let r = evaluate(&shape, &idx);

    assert_eq!(r.equality_prefix_length, 0);
    assert!(!r.sort_satisfied);
    assert!(r.requires_in_memory_sort);
    assert_eq!(r.residual_equality_fields, vec!["transaction_type".to_string()]);
    assert!(!r.is_fully_covered());
}

/// ESR order: equality, then sort, then the bounded range.
#[test]
fn test_esr_ordered_index() {
    let shape = transactions_shape();
    let idx = index("esr", &["transaction_type", "transaction_date", "amount"]);

    let r = evaluate(&shape, &idx);

    assert_eq!(r.equality_prefix_length, 1);
    assert!(r.sort_satisfied);
    assert_eq!(r.sort_consumed_length, 1);
    assert_eq!(r.scan_direction, ScanDirection::Forward);
    assert_eq!(r.range_fields_covered_by_index, vec!["amount".to_string()]);
    assert!(r.residual_range_fields.is_empty());
    assert!(!r.requires_in_memory_sort);
    assert!(r.unused_index_suffix.is_empty());
    assert!(r.is_fully_covered());
}

/// Equality before range but range before sort: range bounded, sort lost.
#[test]
fn test_equality_range_sort_order() {
    let shape = transactions_shape();
    let idx = index("ers", &["transaction_type", "amount", "transaction_date"]);

    let r = evaluate(&shape, &idx);

    assert_eq!(r.equality_prefix_length, 1);
    assert!(!r.sort_satisfied);
    assert!(r.requires_in_memory_sort);
    assert_eq!(r.bounded_range_field(), Some("amount"));
}

/// Descending sort served by walking an ascending index backwards.
#[test]
fn test_descending_sort_backward_scan() {
    let shape = QueryShape::from_json(
        &json!({"transaction_type": "debit"}),
        &json!({"transaction_date": -1}),
    )
    .unwrap();
    let idx = index("type_date", &["transaction_type", "transaction_date"]);

    let r = evaluate(&shape, &idx);

    assert!(r.sort_satisfied);
    assert_eq!(r.scan_direction, ScanDirection::Backward);
    assert!(!r.requires_in_memory_sort);
}

/// Empty index: every condition is residual.
#[test]
fn test_empty_index() {
    let shape = transactions_shape();
    let idx = IndexDefinition::new("empty", Vec::new()).unwrap();

    let r = evaluate(&shape, &idx);

    assert_eq!(r.equality_prefix_length, 0);
    assert_eq!(r.consumed_prefix_length(), 0);
    assert!(r.requires_in_memory_sort);
    assert_eq!(r.residual_range_fields, vec!["amount".to_string()]);
    assert!(r.unused_index_suffix.is_empty());
    assert!(r.is_unused());
}

// =============================================================================
// Recommendation
// =============================================================================

/// Recommendation matches the ESR-ordered index.
#[test]
fn test_recommend_esr_order() {
    let rec = recommend(&transactions_shape()).unwrap();

    assert_eq!(
        rec.fields(),
        &[
            FieldRef::asc("transaction_type"),
            FieldRef::asc("transaction_date"),
            FieldRef::asc("amount"),
        ]
    );
    assert_eq!(rec.name(), "transaction_type_1_transaction_date_1_amount_1");
}

/// Evaluating a recommendation against its own shape is always full coverage.
#[test]
fn test_recommendation_covers_own_shape() {
    let shapes = [
        transactions_shape(),
        QueryShape::from_json(&json!({"a": 1, "b": 2}), &json!({})).unwrap(),
        QueryShape::from_json(&json!({}), &json!({"x": 1, "y": -1})).unwrap(),
        QueryShape::from_json(&json!({"p": {"$gte": 1}, "q": {"$lt": 2}}), &json!({})).unwrap(),
        QueryShape::from_json(
            &json!({"s": "A", "k": {"$in": [1, 2]}, "t": {"$exists": true}}),
            &json!({"created": -1}),
        )
        .unwrap(),
    ];

    for shape in &shapes {
        let rec = recommend(shape).unwrap();
        let r = evaluate(shape, &rec);
        assert_eq!(r.equality_prefix_length, shape.equality().len());
        assert!(!r.requires_in_memory_sort);
        assert!(r.residual_equality_fields.is_empty());
        assert!(r.is_fully_covered(), "recommendation {} must cover", rec);
    }
}

/// Empty shape has nothing to recommend.
#[test]
fn test_recommend_empty_shape() {
    let shape = QueryShape::from_json(&json!({}), &json!({})).unwrap();
    let err = recommend(&shape).unwrap_err();
    assert_eq!(err.code(), "ESR_EMPTY_SHAPE");
}

// =============================================================================
// Cost
// =============================================================================

/// 1M documents of 400 bytes with no prefix exceeds a 32 MiB sort budget.
#[test]
fn test_sort_budget_exceeded() {
    let shape = transactions_shape();
    let idx = index("range_first", &["amount", "transaction_type", "transaction_date"]);
    let r = evaluate(&shape, &idx);

    let cost = estimate(
        &shape,
        &r,
        &CorpusStats::new(1_000_000, 400),
        &PlannerConfig::default(),
    );

    assert_eq!(cost.scan_cost_proxy, 1_000_000);
    assert_eq!(cost.estimated_sort_bytes, 400_000_000);
    assert!(cost.in_memory_sort_risk);
}

/// One equality field over 1M documents: 100k scanned, risky only while
/// the sort stays in memory.
#[test]
fn test_sort_budget_with_prefix() {
    let shape = transactions_shape();
    let idx = index("type_amount", &["transaction_type", "amount"]);
    let stats = CorpusStats::new(1_000_000, 400);
    let config = PlannerConfig::default();

    let mut r = evaluate(&shape, &idx);
    assert!(r.requires_in_memory_sort);

    let cost = estimate(&shape, &r, &stats, &config);
    assert_eq!(cost.scan_cost_proxy, 100_000);
    assert_eq!(cost.estimated_sort_bytes, 40_000_000);
    assert!(cost.in_memory_sort_risk);

    r.requires_in_memory_sort = false;
    assert!(!estimate(&shape, &r, &stats, &config).in_memory_sort_risk);

    let loose = config.with_sort_budget(64 * 1024 * 1024);
    r.requires_in_memory_sort = true;
    assert!(!estimate(&shape, &r, &stats, &loose).in_memory_sort_risk);
}

/// Served sort never risks memory, however large the corpus.
#[test]
fn test_served_sort_never_risky() {
    let shape = transactions_shape();
    let idx = index("esr", &["transaction_type", "transaction_date", "amount"]);
    let r = evaluate(&shape, &idx);

    let cost = estimate(
        &shape,
        &r,
        &CorpusStats::new(u64::MAX, u64::MAX),
        &PlannerConfig::default(),
    );

    assert_eq!(cost.estimated_sort_bytes, 0);
    assert!(!cost.in_memory_sort_risk);
}

// =============================================================================
// Advisor
// =============================================================================

/// Advisor prefers the ESR index over the range-first index.
#[test]
fn test_advisor_ranks_esr_first() {
    let catalog = IndexCatalog::new();
    catalog
        .add(index("range_first", &["amount", "transaction_type", "transaction_date"]))
        .unwrap();
    catalog
        .add(index("esr", &["transaction_type", "transaction_date", "amount"]))
        .unwrap();

    let advisor = Advisor::new(PlannerConfig::default()).unwrap();
    let advice = advisor.advise(
        &transactions_shape(),
        &catalog.snapshot(),
        &CorpusStats::new(1_000_000, 400),
    );

    assert_eq!(advice.best().unwrap().index.name(), "esr");
    assert!(advice.recommendation.is_none());
    assert_eq!(advice.risky_candidates().count(), 1);
}
