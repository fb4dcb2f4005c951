//! Reporting views over a suite's configurations
//!
//! Grouping works on copies: the suite's own configurations are never
//! reordered or filtered in place.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::core::models::catalog::ORDERED_COLUMNS_EXPECTATION;
use crate::core::models::{DomainType, ExpectationConfiguration, Kwargs};

/// Bucket for configurations without a `column` kwarg
pub const NO_COLUMN: &str = "_nocolumn";

/// Configurations grouped by their `column` kwarg, plus the reporting order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnGrouping {
    /// Configurations per column; column-less ones sit under [`NO_COLUMN`]
    pub by_column: BTreeMap<String, Vec<ExpectationConfiguration>>,
    /// Order in which columns are reported (never includes [`NO_COLUMN`])
    pub column_order: Vec<String>,
}

/// Whether a value counts as empty for reporting
///
/// Null, empty strings and empty containers are empty. Numbers and booleans
/// never are, so `0` and `false` survive.
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Drop empty values, recursing into containers
fn clean_falsy(kwargs: &Kwargs) -> Kwargs {
    kwargs
        .iter()
        .filter_map(|(key, value)| {
            let cleaned = clean_value(value);
            (!is_falsy(&cleaned)).then(|| (key.clone(), cleaned))
        })
        .collect()
}

fn clean_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(clean_falsy(map)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(clean_value)
                .filter(|item| !is_falsy(item))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Copy a configuration with empty kwargs dropped and identifying kwargs first
fn normalize(configuration: &ExpectationConfiguration) -> ExpectationConfiguration {
    let cleaned = clean_falsy(configuration.kwargs());
    let identifying = configuration.domain_type().identifying_kwargs();

    let mut kwargs = Kwargs::new();
    for key in identifying {
        if let Some(value) = cleaned.get(*key) {
            kwargs.insert((*key).to_string(), value.clone());
        }
    }
    for (key, value) in cleaned {
        if !identifying.contains(&key.as_str()) {
            kwargs.insert(key, value);
        }
    }

    let mut copy = configuration.clone();
    copy.replace_kwargs(kwargs);
    copy
}

/// Normalized copies of the configurations of one domain type, in suite order
#[must_use]
pub fn expectations_of_domain(
    configurations: &[ExpectationConfiguration],
    domain_type: DomainType,
) -> Vec<ExpectationConfiguration> {
    configurations
        .iter()
        .filter(|c| c.domain_type() == domain_type)
        .map(normalize)
        .collect()
}

/// Normalized copies grouped by domain type; empty buckets are omitted
#[must_use]
pub fn group_by_domain_type(
    configurations: &[ExpectationConfiguration],
) -> BTreeMap<DomainType, Vec<ExpectationConfiguration>> {
    DomainType::ALL
        .into_iter()
        .map(|domain_type| (domain_type, expectations_of_domain(configurations, domain_type)))
        .filter(|(_, bucket)| !bucket.is_empty())
        .collect()
}

/// Normalized copies, table first, then column, column pair and multicolumn
///
/// Within a domain type configurations are ordered by expectation type.
#[must_use]
pub fn order_by_expectation_type(
    configurations: &[ExpectationConfiguration],
) -> Vec<ExpectationConfiguration> {
    let mut ordered = Vec::with_capacity(configurations.len());
    for domain_type in DomainType::ALL {
        let mut bucket = expectations_of_domain(configurations, domain_type);
        bucket.sort_by(|a, b| a.expectation_type().cmp(b.expectation_type()));
        ordered.extend(bucket);
    }
    ordered
}

/// Group configurations by column and work out the column reporting order
///
/// When an ordered-columns expectation lists exactly the set of observed
/// columns, its order wins (the last such expectation counts). Any other
/// case, including a subset or superset, falls back to alphabetic order.
#[must_use]
pub fn group_by_column(
    configurations: &[ExpectationConfiguration],
    expectation_type_filter: Option<&str>,
) -> ColumnGrouping {
    let mut by_column: BTreeMap<String, Vec<ExpectationConfiguration>> = BTreeMap::new();
    let mut ordered_columns: Vec<String> = Vec::new();

    for configuration in configurations {
        let column = configuration
            .kwarg("column")
            .map_or_else(|| NO_COLUMN.to_string(), column_name);
        let bucket = by_column.entry(column).or_default();
        if expectation_type_filter.is_none_or(|t| configuration.expectation_type() == t) {
            bucket.push(configuration.clone());
        }

        let is_ordered_list = configuration.expectation_type() == ORDERED_COLUMNS_EXPECTATION;
        match configuration.kwarg("column_list") {
            Some(Value::Array(list)) if is_ordered_list && !list.is_empty() => {
                ordered_columns = list.iter().map(column_name).collect();
            },
            _ => {},
        }
    }

    let observed: BTreeSet<&str> = by_column
        .keys()
        .map(String::as_str)
        .filter(|c| *c != NO_COLUMN)
        .collect();
    let listed: BTreeSet<&str> = ordered_columns.iter().map(String::as_str).collect();

    let column_order = if !listed.is_empty() && listed == observed {
        ordered_columns
    } else {
        observed.iter().map(|c| (*c).to_string()).collect()
    };

    ColumnGrouping {
        by_column,
        column_order,
    }
}

fn column_name(value: &Value) -> String {
    value.as_str().map_or_else(|| value.to_string(), String::from)
}
