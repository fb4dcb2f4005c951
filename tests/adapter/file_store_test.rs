//! File expectations store tests

use datasuite::adapters::FileExpectationsStore;
use datasuite::core::models::{ExpectationConfiguration, IdentifierBundle};
use datasuite::core::ports::ExpectationsStore;
use serde_json::json;
use tempfile::TempDir;
use test_case::test_case;

fn unique(column: &str) -> ExpectationConfiguration {
    ExpectationConfiguration::try_from(json!({
        "expectation_type": "expect_column_values_to_be_unique",
        "kwargs": {"column": column}
    }))
    .unwrap()
}

#[test]
fn test_update_writes_pretty_json_file() {
    let dir = TempDir::new().unwrap();
    let store = FileExpectationsStore::new(dir.path().join("suites"));
    let key = store.get_key("orders", None);

    assert!(!store.has_key(&key).unwrap());
    store.update(&key, &json!({"name": "orders", "expectations": []})).unwrap();
    assert!(store.has_key(&key).unwrap());

    let content = std::fs::read_to_string(dir.path().join("suites/orders.json")).unwrap();
    assert!(content.contains("\n  \"name\": \"orders\""));
}

#[test]
fn test_expectation_operations_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let store = FileExpectationsStore::new(dir.path().to_path_buf());
    let suite = IdentifierBundle::unsaved("orders");

    let first = store.add_expectation(&suite, &unique("a")).unwrap();
    let second = store.add_expectation(&suite, &unique("b")).unwrap();
    assert_ne!(first.id(), second.id());

    let mut changed = second.clone();
    changed.set_kwarg("mostly", json!(0.95));
    store.update_expectation(&suite, &changed).unwrap();
    store.delete_expectation(&suite, &first).unwrap();

    let doc = store.get(&store.get_key("orders", None)).unwrap().unwrap();
    let expectations = doc["expectations"].as_array().unwrap();
    assert_eq!(expectations.len(), 1);
    assert_eq!(expectations[0]["kwargs"]["mostly"], json!(0.95));
}

#[test]
fn test_update_of_unknown_suite_fails() {
    let dir = TempDir::new().unwrap();
    let store = FileExpectationsStore::new(dir.path().to_path_buf());
    let suite = IdentifierBundle::unsaved("missing");
    assert!(store.update_expectation(&suite, &unique("a").with_id("x")).is_err());
    assert!(store.delete_expectation(&suite, &unique("a")).is_err());
}

#[test_case("../escaped" ; "parent traversal")]
#[test_case("nested/orders" ; "separator")]
#[test_case("/tmp/orders" ; "absolute")]
#[test_case(".." ; "parent only")]
#[test_case("" ; "empty")]
fn test_suite_name_must_be_a_plain_file_name(name: &str) {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("suites");
    let store = FileExpectationsStore::new(base.clone());
    let key = store.get_key(name, None);

    assert!(store.update(&key, &json!({"name": name})).is_err());
    assert!(store.has_key(&key).is_err());
    assert!(store.add_expectation(&IdentifierBundle::unsaved(name), &unique("a")).is_err());
    assert!(!base.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_dotted_suite_name_is_allowed() {
    let dir = TempDir::new().unwrap();
    let store = FileExpectationsStore::new(dir.path().to_path_buf());
    let key = store.get_key("taxi.yellow", None);
    store.update(&key, &json!({"name": "taxi.yellow"})).unwrap();
    assert!(dir.path().join("taxi.yellow.json").exists());
}
