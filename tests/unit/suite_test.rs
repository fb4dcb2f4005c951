//! Suite lifecycle tests
//!
//! Construction, add/delete with store synchronization, find/remove, upsert
//! and comparison.

use std::sync::Arc;

use datasuite::core::models::MatchType;
use datasuite::core::ports::EventKind;
use datasuite::core::services::{Expectation, ExpectationQuery, ExpectationSuite, SuiteError};
use serde_json::json;

use crate::common::{FailingSink, RecordingStore, TypeRenderer, between, config, init_logging, not_null, suite_with};

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_empty_name_is_rejected() {
    let store = Arc::new(RecordingStore::new());
    let result = ExpectationSuite::builder("  ", store).build();
    assert!(matches!(result, Err(SuiteError::InvalidName)));
}

#[test]
fn test_build_accepts_all_input_shapes() {
    let store = Arc::new(RecordingStore::new());
    let suite = ExpectationSuite::builder("orders", store)
        .with_expectation(not_null("id"))
        .with_expectation(Expectation::new(not_null("amount")))
        .with_expectation(json!({
            "expectation_type": "expect_table_row_count_to_be_between",
            "kwargs": {"min_value": 1}
        }))
        .build()
        .unwrap();
    assert_eq!(suite.len(), 3);
    assert!(suite.expectations().iter().all(Expectation::is_bound));
}

#[test]
fn test_build_rejects_expectation_with_identity() {
    let store = Arc::new(RecordingStore::new());
    let owned = Expectation::new(not_null("id").with_id("already-saved"));
    let result = ExpectationSuite::builder("orders", store).with_expectation(owned).build();
    assert!(matches!(result, Err(SuiteError::AlreadyBound { .. })));
}

#[test]
fn test_build_rejects_malformed_raw_input() {
    let store = Arc::new(RecordingStore::new());
    let result = ExpectationSuite::builder("orders", store)
        .with_expectation(json!(["not", "a", "mapping"]))
        .build();
    assert!(matches!(result, Err(SuiteError::InvalidConfiguration(_))));
}

#[test]
fn test_build_stamps_version_marker() {
    let (suite, _, _) = suite_with("orders", vec![]);
    assert!(suite.meta().contains_key(datasuite::core::services::VERSION_META_KEY));
}

#[test]
fn test_build_rejects_non_list_citations() {
    let store = Arc::new(RecordingStore::new());
    let meta = json!({"citations": "yesterday"}).as_object().cloned().unwrap();
    let result = ExpectationSuite::builder("orders", store).with_meta(meta).build();
    assert!(matches!(result, Err(SuiteError::InvalidMeta(_))));
}

// =============================================================================
// Add
// =============================================================================

#[test]
fn test_add_to_unsaved_suite_stays_local() {
    init_logging();
    let (mut suite, store, sink) = suite_with("orders", vec![]);
    let added = suite.add_expectation(Expectation::new(not_null("id"))).unwrap();

    assert_eq!(suite.len(), 1);
    assert!(added.id().is_none());
    assert!(!store.calls().contains(&"add_expectation".to_string()));
    assert_eq!(sink.kinds(), vec![EventKind::Created]);
}

#[test]
fn test_add_to_saved_suite_persists_and_takes_id() {
    let (mut suite, store, _) = suite_with("orders", vec![]);
    suite.save().unwrap();

    let added = suite.add_expectation(Expectation::new(not_null("id"))).unwrap();
    assert!(added.id().is_some());
    assert_eq!(suite.expectations()[0].id(), added.id());
    assert_eq!(store.stored_expectations("orders").len(), 1);
}

#[test]
fn test_duplicate_add_is_silent_on_list_but_not_on_events() {
    let (mut suite, _, sink) = suite_with("orders", vec![]);
    suite.add_expectation(Expectation::new(not_null("id"))).unwrap();
    let second = suite.add_expectation(Expectation::new(not_null("id"))).unwrap();

    assert_eq!(suite.len(), 1);
    assert!(second.is_bound());
    assert_eq!(sink.kinds(), vec![EventKind::Created, EventKind::Created]);
}

#[test]
fn test_add_rolls_back_when_store_fails() {
    init_logging();
    let (mut suite, store, sink) = suite_with("orders", vec![not_null("id")]);
    suite.save().unwrap();
    store.fail_next_add();

    let result = suite.add_expectation(Expectation::new(not_null("amount")));
    assert!(matches!(result, Err(SuiteError::Store(_))));
    assert_eq!(suite.len(), 1);
    assert!(sink.kinds().is_empty());
}

#[test]
fn test_add_rejects_already_bound_expectation() {
    let (mut suite, _, _) = suite_with("orders", vec![]);
    let result = suite.add_expectation(Expectation::new(not_null("id").with_id("abc")));
    assert!(matches!(result, Err(SuiteError::AlreadyBound { .. })));
}

#[test]
fn test_telemetry_failure_is_swallowed() {
    init_logging();
    let store = Arc::new(RecordingStore::new());
    let mut suite = ExpectationSuite::builder("orders", store)
        .with_event_sink(Arc::new(FailingSink))
        .build()
        .unwrap();
    assert!(suite.add_expectation(Expectation::new(not_null("id"))).is_ok());
}

// =============================================================================
// Delete
// =============================================================================

#[test]
fn test_delete_requires_a_match() {
    let (mut suite, _, _) = suite_with("orders", vec![not_null("id")]);
    let result = suite.delete_expectation(&Expectation::new(not_null("amount")));
    assert!(matches!(result, Err(SuiteError::NotFound)));
}

#[test]
fn test_delete_persisted_expectation() {
    let (mut suite, store, sink) = suite_with("orders", vec![]);
    suite.save().unwrap();
    suite.add_expectation(Expectation::new(not_null("id"))).unwrap();
    suite.add_expectation(Expectation::new(not_null("amount"))).unwrap();

    let removed = suite.delete_expectation(&Expectation::new(not_null("id"))).unwrap();
    assert_eq!(removed.configuration(), &not_null("id"));
    assert_eq!(suite.len(), 1);
    assert_eq!(store.stored_expectations("orders").len(), 1);
    assert_eq!(sink.kinds().last(), Some(&EventKind::Deleted));
}

#[test]
fn test_delete_rolls_back_to_original_position() {
    init_logging();
    let (mut suite, store, _) = suite_with("orders", vec![]);
    suite.save().unwrap();
    for column in ["a", "b", "c"] {
        suite.add_expectation(Expectation::new(not_null(column))).unwrap();
    }
    store.fail_next_delete();

    let result = suite.delete_expectation(&Expectation::new(not_null("a")));
    assert!(matches!(result, Err(SuiteError::Store(_))));
    let columns: Vec<_> = suite
        .expectation_configurations()
        .iter()
        .map(|c| c.kwarg("column").cloned().unwrap())
        .collect();
    assert_eq!(columns, vec![json!("a"), json!("b"), json!("c")]);
}

#[test]
fn test_delete_keeps_expectation_when_key_lookup_fails() {
    let (mut suite, store, sink) = suite_with("orders", vec![not_null("a"), not_null("b")]);
    suite.save().unwrap();
    store.fail_next_has_key();

    let result = suite.delete_expectation(&Expectation::new(not_null("a")));
    assert!(matches!(result, Err(SuiteError::Store(_))));
    assert_eq!(suite.len(), 2);
    assert_eq!(suite.expectations()[0].configuration(), &not_null("a"));
    assert!(!sink.kinds().contains(&EventKind::Deleted));
}

#[test]
fn test_delete_with_several_matches_is_ambiguous() {
    let (mut suite, _, _) = suite_with("orders", vec![not_null("a"), not_null("a")]);

    let result = suite.delete_expectation(&Expectation::new(not_null("a")));
    assert!(matches!(result, Err(SuiteError::AmbiguousMatch { count: 2 })));
    assert_eq!(suite.len(), 2);
}

// =============================================================================
// Find / remove
// =============================================================================

#[test]
fn test_find_requires_criteria() {
    let (suite, _, _) = suite_with("orders", vec![not_null("id")]);
    let result = suite.find_expectation_indexes(ExpectationQuery::default());
    assert!(matches!(result, Err(SuiteError::MissingCriteria)));
}

#[test]
fn test_find_by_domain_returns_indexes_in_order() {
    let (suite, _, _) = suite_with(
        "orders",
        vec![not_null("a"), between("b", 0, 1), between("a", 0, 10)],
    );
    let probe = config("expect_column_values_to_be_between", json!({"column": "a"}));
    let indexes = suite
        .find_expectation_indexes(ExpectationQuery::by_configuration(&probe, MatchType::Domain))
        .unwrap();
    assert_eq!(indexes, vec![2]);
}

#[test]
fn test_find_by_id_uses_canonical_form() {
    let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
    let store = Arc::new(RecordingStore::new());
    let suite = ExpectationSuite::from_json_value(
        json!({
            "name": "orders",
            "expectations": [{
                "expectation_type": "expect_column_values_to_not_be_null",
                "kwargs": {"column": "id"},
                "id": id
            }]
        }),
        store,
    )
    .unwrap();
    let indexes = suite
        .find_expectation_indexes(ExpectationQuery::by_id("67E55044-10B1-426F-9247-BB680E5FE0C8"))
        .unwrap();
    assert_eq!(indexes, vec![0]);
}

#[test]
fn test_find_multiple_needs_permission() {
    let (suite, _, _) = suite_with("orders", vec![between("a", 0, 1), between("a", 5, 9)]);
    let probe = config("expect_column_values_to_be_between", json!({"column": "a"}));
    let query = ExpectationQuery::by_configuration(&probe, MatchType::Domain);

    assert!(matches!(
        suite.find_expectations(query, false),
        Err(SuiteError::AmbiguousMatch { count: 2 })
    ));
    assert_eq!(suite.find_expectations(query, true).unwrap().len(), 2);
}

#[test]
fn test_find_with_no_match_is_not_found() {
    let (suite, _, _) = suite_with("orders", vec![not_null("a")]);
    let probe = not_null("zzz");
    let result = suite.find_expectations(ExpectationQuery::by_configuration(&probe, MatchType::Domain), true);
    assert!(matches!(result, Err(SuiteError::NotFound)));
}

#[test]
fn test_remove_rebuilds_and_discards_object_state() {
    let (mut suite, store, _) = suite_with("orders", vec![not_null("a"), not_null("b"), not_null("c")]);
    suite.render(&TypeRenderer { fail_for: None });
    assert!(suite.expectations()[2].rendered_content().is_some());

    let probe = not_null("b");
    let removed = suite
        .remove_expectation(ExpectationQuery::by_configuration(&probe, MatchType::Domain), false)
        .unwrap();
    assert_eq!(removed, vec![not_null("b")]);
    assert_eq!(suite.expectation_configurations(), vec![not_null("a"), not_null("c")]);
    assert!(suite.expectations().iter().all(|e| e.rendered_content().is_none()));
    assert!(!store.calls().contains(&"delete_expectation".to_string()));
}

#[test]
fn test_remove_all_of_type() {
    let (mut suite, _, _) = suite_with("orders", vec![not_null("a"), between("a", 0, 1), not_null("b")]);
    let removed = suite.remove_all_expectations_of_type(&["expect_column_values_to_not_be_null"]);
    assert_eq!(removed.len(), 2);
    assert_eq!(suite.expectation_configurations(), vec![between("a", 0, 1)]);
}

// =============================================================================
// Upsert
// =============================================================================

#[test]
fn test_upsert_inserts_when_nothing_matches() {
    let (mut suite, store, _) = suite_with("orders", vec![]);
    suite
        .add_expectation_configuration(between("a", 0, 1), MatchType::Domain, false)
        .unwrap();
    assert_eq!(suite.len(), 1);
    assert!(store.calls().is_empty());
}

#[test]
fn test_upsert_replace_keeps_one_entry_with_latest_kwargs() {
    let (mut suite, _, _) = suite_with("orders", vec![]);
    suite
        .add_expectation_configuration(between("a", 0, 1), MatchType::Domain, true)
        .unwrap();
    suite
        .add_expectation_configuration(between("a", 5, 9), MatchType::Domain, true)
        .unwrap();
    assert_eq!(suite.expectation_configurations(), vec![between("a", 5, 9)]);
}

#[test]
fn test_upsert_without_overwrite_fails_on_match() {
    let (mut suite, _, _) = suite_with("orders", vec![between("a", 0, 1)]);
    let result = suite.add_expectation_configuration(between("a", 5, 9), MatchType::Domain, false);
    assert!(matches!(result, Err(SuiteError::AlreadyExists)));
    assert_eq!(suite.expectation_configurations(), vec![between("a", 0, 1)]);
}

#[test]
fn test_upsert_never_replaces_several() {
    let (mut suite, _, _) = suite_with("orders", vec![between("a", 0, 1), between("a", 5, 9)]);
    let result = suite.add_expectation_configuration(between("a", 2, 3), MatchType::Domain, true);
    assert!(matches!(result, Err(SuiteError::AmbiguousMatch { count: 2 })));
}

#[test]
fn test_upsert_carries_id_forward() {
    let (mut suite, _, _) = suite_with("orders", vec![]);
    suite.save().unwrap();
    let added = suite.add_expectation(Expectation::new(between("a", 0, 1))).unwrap();

    let replaced = suite
        .add_expectation_configuration(between("a", 5, 9), MatchType::Domain, true)
        .unwrap();
    assert_eq!(replaced.id(), added.id());
}

#[test]
fn test_upsert_validates_before_mutating() {
    let (mut suite, _, _) = suite_with("orders", vec![]);
    let mut invalid = not_null("a");
    invalid.remove_kwarg("column");
    let result = suite.add_expectation_configuration(invalid, MatchType::Domain, true);
    assert!(matches!(result, Err(SuiteError::InvalidConfiguration(_))));
    assert!(suite.is_empty());
}

// =============================================================================
// Expectation save
// =============================================================================

#[test]
fn test_in_place_change_is_saved_through_store() {
    let (mut suite, store, sink) = suite_with("orders", vec![]);
    suite.save().unwrap();
    suite.add_expectation(Expectation::new(between("a", 0, 1))).unwrap();

    let expectation = suite.expectation_mut(0).unwrap();
    expectation.configuration_mut().set_kwarg("max_value", json!(100));
    expectation.save().unwrap();

    assert_eq!(store.stored_expectations("orders")[0]["kwargs"]["max_value"], json!(100));
    assert_eq!(sink.kinds().last(), Some(&EventKind::Updated));
}

#[test]
fn test_unbound_expectation_cannot_save() {
    let mut expectation = Expectation::new(not_null("a"));
    assert!(matches!(expectation.save(), Err(SuiteError::NotBound)));
}

// =============================================================================
// Comparison
// =============================================================================

#[test]
fn test_equivalence_ignores_name_and_meta() {
    let (a, _, _) = suite_with("first", vec![between("a", 0, 1), not_null("b")]);
    let (b, _, _) = suite_with("second", vec![between("a", 0, 1), not_null("b")]);
    assert!(a.is_equivalent_to(&b));
    assert_ne!(a, b);
}

#[test]
fn test_equivalence_is_positional() {
    let (a, _, _) = suite_with("orders", vec![between("a", 0, 1), not_null("b")]);
    let (b, _, _) = suite_with("orders", vec![not_null("b"), between("a", 0, 1)]);
    assert!(!a.is_equivalent_to(&b));
}

#[test]
fn test_equivalence_uses_success_kwargs() {
    let (a, _, _) = suite_with("orders", vec![between("a", 0, 1)]);
    let (b, _, _) = suite_with("orders", vec![between("a", 0, 2)]);
    assert!(!a.is_equivalent_to(&b));

    let mut with_format = between("a", 0, 1);
    with_format.set_kwarg("result_format", json!("COMPLETE"));
    let (c, _, _) = suite_with("orders", vec![with_format]);
    assert!(a.is_equivalent_to(&c));
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_failed_render_keeps_existing_content() {
    init_logging();
    let (mut suite, _, _) = suite_with("orders", vec![not_null("a"), between("a", 0, 1)]);
    suite.render(&TypeRenderer { fail_for: None });
    suite.render(&TypeRenderer {
        fail_for: Some("expect_column_values_to_be_between"),
    });
    assert!(suite.expectations().iter().all(|e| e.rendered_content().is_some()));
}

#[test]
fn test_evaluation_parameter_options_are_sorted_and_unique() {
    let first = config(
        "expect_column_values_to_be_between",
        json!({"column": "a", "min_value": {"$PARAMETER": "upstream_min"}, "max_value": {"$PARAMETER": "limit"}}),
    );
    let second = config(
        "expect_table_row_count_to_equal",
        json!({"value": {"$PARAMETER": "limit"}}),
    );
    let (suite, _, _) = suite_with("orders", vec![first, second]);
    assert_eq!(suite.evaluation_parameter_options(), vec!["limit", "upstream_min"]);
}
