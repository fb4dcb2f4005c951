//! Integration tests for datasuite
//!
//! These tests wire the engines to the real adapters: suites persisted as JSON
//! files, connectors listing a directory tree and configured from TOML.

mod lifecycle_test;

use std::fs;
use std::sync::Arc;

use datasuite::adapters::{FileExpectationsStore, FilesystemKeyLister};
use datasuite::config::ConnectorConfig;
use datasuite::core::models::BatchRequest;
use tempfile::TempDir;

/// Lay out a small data directory
fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    for path in [
        "taxi/yellow/trips_2019-01.csv",
        "taxi/yellow/trips_2019-02.csv",
        "taxi/yellow/trips_2020-01.csv",
        "taxi/yellow/README.md",
        "taxi/green/trips_2019-01.csv",
    ] {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, "id,fare\n1,2.5\n").unwrap();
    }
    dir
}

const CONNECTOR_TOML: &str = r#"
datasource_name = "taxi"
data_connector_name = "local"
prefix = "taxi"

[default_regex]
pattern = 'trips_(\d{4})-(\d{2})\.csv'
group_names = ["year", "month"]

[[sorters]]
kind = "numeric"
name = "year"
orderby = "desc"

[[sorters]]
kind = "numeric"
name = "month"
orderby = "asc"

[assets.yellow]
prefix = "taxi/yellow"

[assets.green]
prefix = "taxi/green"
"#;

#[test]
fn test_connector_from_toml_over_directory() {
    let data = data_dir();
    let config_dir = TempDir::new().unwrap();
    let config_path = config_dir.path().join("connector.toml");
    fs::write(&config_path, CONNECTOR_TOML).unwrap();

    let lister = Arc::new(FilesystemKeyLister::new(data.path()).unwrap());
    let mut connector = ConnectorConfig::load(&config_path).unwrap().into_connector(lister).unwrap();

    let batches = connector
        .get_batch_definition_list(&BatchRequest::new("taxi", "yellow"))
        .unwrap();
    let months: Vec<String> = batches
        .iter()
        .map(|b| {
            format!(
                "{}-{}",
                b.batch_identifiers.get("year").unwrap(),
                b.batch_identifiers.get("month").unwrap()
            )
        })
        .collect();
    assert_eq!(months, vec!["2020-01", "2019-01", "2019-02"]);

    let report = connector.report().unwrap();
    assert_eq!(report.data_assets["green"].batch_definition_count, 1);
    assert_eq!(report.example_unmatched_data_references, vec!["taxi/yellow/README.md"]);
}

#[test]
fn test_suite_persists_across_stores() {
    use datasuite::core::services::{Expectation, ExpectationSuite};
    use serde_json::json;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileExpectationsStore::new(dir.path().join("expectations")));
    let mut suite = ExpectationSuite::builder("taxi.yellow", store).build().unwrap();
    suite.save().unwrap();

    let configuration = serde_json::from_value(json!({
        "expectation_type": "expect_column_values_to_not_be_null",
        "kwargs": {"column": "fare"}
    }))
    .unwrap();
    let added = suite.add_expectation(Expectation::new(configuration)).unwrap();
    assert!(added.id().is_some());

    // a second store over the same directory sees the expectation
    let reopened = Arc::new(FileExpectationsStore::new(dir.path().join("expectations")));
    let loaded = ExpectationSuite::load("taxi.yellow", None, reopened).unwrap().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.expectations()[0].id(), added.id());
}
