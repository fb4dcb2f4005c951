//! Citation tests

use chrono::{TimeZone, Utc};
use datasuite::core::services::{Citation, CitationFilter, SuiteError};
use serde_json::json;

use crate::common::suite_with;

#[test]
fn test_citation_date_is_stored_in_fixed_format() {
    let (mut suite, _, _) = suite_with("orders", vec![]);
    let at = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
    suite.add_citation(Citation::new("profiled").with_date(at)).unwrap();

    let citations = suite.get_citations(CitationFilter::default());
    assert_eq!(citations[0]["citation_date"], json!("2021-03-04T05:06:07.000000Z"));
    assert_eq!(citations[0]["comment"], json!("profiled"));
}

#[test]
fn test_string_dates_are_parsed() {
    let (mut suite, _, _) = suite_with("orders", vec![]);
    suite
        .add_citation(Citation::new("a").with_date("2020-01-02T03:04:05+00:00"))
        .unwrap();
    suite.add_citation(Citation::new("b").with_date("2019-12-31")).unwrap();

    let dates: Vec<_> = suite
        .get_citations(CitationFilter::default())
        .iter()
        .map(|c| c["citation_date"].clone())
        .collect();
    assert_eq!(
        dates,
        vec![json!("2019-12-31T00:00:00.000000Z"), json!("2020-01-02T03:04:05.000000Z")]
    );
}

#[test]
fn test_unparseable_date_is_rejected() {
    let (mut suite, _, _) = suite_with("orders", vec![]);
    let result = suite.add_citation(Citation::new("a").with_date("last tuesday"));
    assert!(matches!(result, Err(SuiteError::InvalidCitationDate(_))));
    assert!(suite.get_citations(CitationFilter::default()).is_empty());
}

#[test]
fn test_empty_fields_are_dropped() {
    let (mut suite, _, _) = suite_with("orders", vec![]);
    suite
        .add_citation(
            Citation::new("")
                .with_batch_request(json!({}))
                .with_batch_kwargs(json!({"path": "data.csv"})),
        )
        .unwrap();
    let citation = &suite.get_citations(CitationFilter::default())[0];
    assert!(!citation.contains_key("comment"));
    assert!(!citation.contains_key("batch_request"));
    assert_eq!(citation["batch_kwargs"], json!({"path": "data.csv"}));
}

#[test]
fn test_filters_require_non_empty_fields() {
    let (mut suite, _, _) = suite_with("orders", vec![]);
    suite
        .add_citation(Citation::new("with request").with_batch_request(json!({"datasource_name": "ds"})))
        .unwrap();
    suite
        .add_citation(Citation::new("with profiler").with_profiler_config(json!({"name": "p"})))
        .unwrap();

    let filter = CitationFilter {
        require_batch_request: true,
        ..CitationFilter::default()
    };
    let selected = suite.get_citations(filter);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0]["comment"], json!("with request"));

    let filter = CitationFilter {
        require_profiler_config: true,
        require_batch_request: true,
        ..CitationFilter::default()
    };
    assert!(suite.get_citations(filter).is_empty());
}

#[test]
fn test_unsorted_keeps_insertion_order() {
    let (mut suite, _, _) = suite_with("orders", vec![]);
    suite.add_citation(Citation::new("late").with_date("2022-01-01")).unwrap();
    suite.add_citation(Citation::new("early").with_date("2020-01-01")).unwrap();

    let filter = CitationFilter {
        sort: false,
        ..CitationFilter::default()
    };
    let comments: Vec<_> = suite.get_citations(filter).iter().map(|c| c["comment"].clone()).collect();
    assert_eq!(comments, vec![json!("late"), json!("early")]);
}
