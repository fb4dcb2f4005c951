//! Integration tests for the full suite lifecycle
//!
//! Tests the complete flow:
//! 1. Build a suite and persist it
//! 2. Add, upsert, edit in place and delete expectations
//! 3. Reload and compare

use std::sync::Arc;

use datasuite::adapters::{FileExpectationsStore, LogEventSink};
use datasuite::core::models::{ExpectationConfiguration, MatchType};
use datasuite::core::services::{Expectation, ExpectationQuery, ExpectationSuite};
use serde_json::json;
use tempfile::TempDir;

fn configuration(value: serde_json::Value) -> ExpectationConfiguration {
    ExpectationConfiguration::try_from(value).unwrap()
}

#[test]
fn test_full_lifecycle() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileExpectationsStore::new(dir.path().to_path_buf()));

    let mut suite = ExpectationSuite::builder("orders", store.clone())
        .with_event_sink(Arc::new(LogEventSink))
        .build()
        .unwrap();
    suite.save().unwrap();

    // add two expectations, both written through
    let not_null = configuration(json!({
        "expectation_type": "expect_column_values_to_not_be_null",
        "kwargs": {"column": "id"}
    }));
    let between = configuration(json!({
        "expectation_type": "expect_column_values_to_be_between",
        "kwargs": {"column": "amount", "min_value": 0, "max_value": 100}
    }));
    suite.add_expectation(Expectation::new(not_null.clone())).unwrap();
    suite.add_expectation(Expectation::new(between)).unwrap();

    // edit one in place and save it alone
    let index = suite
        .find_expectation_indexes(ExpectationQuery::by_configuration(
            &configuration(json!({
                "expectation_type": "expect_column_values_to_be_between",
                "kwargs": {"column": "amount"}
            })),
            MatchType::Domain,
        ))
        .unwrap()[0];
    let expectation = suite.expectation_mut(index).unwrap();
    expectation.configuration_mut().set_kwarg("max_value", json!(500));
    expectation.save().unwrap();

    let reloaded = ExpectationSuite::load("orders", None, store.clone()).unwrap().unwrap();
    assert_eq!(reloaded.expectations()[1].configuration().kwarg("max_value"), Some(&json!(500)));

    // delete one, then reload
    suite.delete_expectation(&Expectation::new(not_null)).unwrap();
    let reloaded = ExpectationSuite::load("orders", None, store).unwrap().unwrap();
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.is_equivalent_to(&suite));
}
