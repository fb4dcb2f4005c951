//! Expectation type catalog
//!
//! Maps known expectation types to the part of the table they evaluate and to
//! the kwargs that decide pass/fail. Types that are not catalogued (custom
//! expectations) have their domain inferred from the identifying kwargs they
//! carry.

use serde::{Deserialize, Serialize};

use super::Kwargs;

/// Kwargs that only affect how a result is reported
pub const RUNTIME_KWARGS: &[&str] = &["result_format", "include_config", "catch_exceptions"];

/// Kwargs that narrow the evaluated data for every domain type
const SHARED_DOMAIN_KWARGS: &[&str] = &["batch_id", "row_condition", "condition_parser"];

/// The part of a table an expectation evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainType {
    /// The table as a whole (row counts, column sets)
    Table,
    /// A single column, named by `column`
    Column,
    /// Two columns, named by `column_A` and `column_B`
    ColumnPair,
    /// Several columns, named by `column_list`
    Multicolumn,
}

impl DomainType {
    /// All domain types, in reporting order
    pub const ALL: [Self; 4] = [Self::Table, Self::Column, Self::ColumnPair, Self::Multicolumn];

    /// The kwargs that name the evaluated columns, in the order they are reported
    #[must_use]
    pub const fn identifying_kwargs(self) -> &'static [&'static str] {
        match self {
            Self::Table => &[],
            Self::Column => &["column"],
            Self::ColumnPair => &["column_A", "column_B"],
            Self::Multicolumn => &["column_list"],
        }
    }

    /// Infer the domain type from the identifying kwargs present
    #[must_use]
    pub fn infer(kwargs: &Kwargs) -> Self {
        if kwargs.contains_key("column") {
            Self::Column
        } else if kwargs.contains_key("column_A") && kwargs.contains_key("column_B") {
            Self::ColumnPair
        } else if kwargs.contains_key("column_list") {
            Self::Multicolumn
        } else {
            Self::Table
        }
    }

    /// Every kwarg that belongs to the domain of this type
    pub fn domain_kwargs(self) -> impl Iterator<Item = &'static str> {
        self.identifying_kwargs().iter().chain(SHARED_DOMAIN_KWARGS).copied()
    }
}

impl std::fmt::Display for DomainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Column => write!(f, "column"),
            Self::ColumnPair => write!(f, "column_pair"),
            Self::Multicolumn => write!(f, "multicolumn"),
        }
    }
}

/// Catalog entry for a known expectation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectationKind {
    /// The expectation type tag
    pub expectation_type: &'static str,
    /// The domain the expectation evaluates
    pub domain_type: DomainType,
    /// Kwargs beyond the domain that decide pass/fail
    pub success_kwargs: &'static [&'static str],
}

const BETWEEN: &[&str] = &["min_value", "max_value", "strict_min", "strict_max"];
const BETWEEN_MOSTLY: &[&str] = &["min_value", "max_value", "strict_min", "strict_max", "mostly"];
const MOSTLY: &[&str] = &["mostly"];
const PAIR: &[&str] = &["ignore_row_if", "mostly"];

const fn kind(
    expectation_type: &'static str,
    domain_type: DomainType,
    success_kwargs: &'static [&'static str],
) -> ExpectationKind {
    ExpectationKind {
        expectation_type,
        domain_type,
        success_kwargs,
    }
}

static CATALOG: &[ExpectationKind] = &[
    kind("expect_table_row_count_to_be_between", DomainType::Table, BETWEEN),
    kind("expect_table_row_count_to_equal", DomainType::Table, &["value"]),
    kind("expect_table_column_count_to_equal", DomainType::Table, &["value"]),
    kind("expect_table_column_count_to_be_between", DomainType::Table, BETWEEN),
    kind("expect_table_columns_to_match_ordered_list", DomainType::Table, &["column_list"]),
    kind("expect_table_columns_to_match_set", DomainType::Table, &["column_set", "exact_match"]),
    kind("expect_column_to_exist", DomainType::Column, &["column_index"]),
    kind("expect_column_values_to_not_be_null", DomainType::Column, MOSTLY),
    kind("expect_column_values_to_be_null", DomainType::Column, MOSTLY),
    kind("expect_column_values_to_be_unique", DomainType::Column, MOSTLY),
    kind(
        "expect_column_values_to_be_in_set",
        DomainType::Column,
        &["value_set", "mostly", "parse_strings_as_datetimes"],
    ),
    kind("expect_column_values_to_not_be_in_set", DomainType::Column, &["value_set", "mostly"]),
    kind("expect_column_values_to_be_between", DomainType::Column, BETWEEN_MOSTLY),
    kind("expect_column_values_to_match_regex", DomainType::Column, &["regex", "mostly"]),
    kind("expect_column_values_to_not_match_regex", DomainType::Column, &["regex", "mostly"]),
    kind("expect_column_values_to_match_like_pattern", DomainType::Column, &["like_pattern", "mostly"]),
    kind("expect_column_value_lengths_to_be_between", DomainType::Column, BETWEEN_MOSTLY),
    kind("expect_column_mean_to_be_between", DomainType::Column, BETWEEN),
    kind("expect_column_median_to_be_between", DomainType::Column, BETWEEN),
    kind("expect_column_min_to_be_between", DomainType::Column, BETWEEN),
    kind("expect_column_max_to_be_between", DomainType::Column, BETWEEN),
    kind("expect_column_sum_to_be_between", DomainType::Column, BETWEEN),
    kind("expect_column_pair_values_to_be_equal", DomainType::ColumnPair, PAIR),
    kind(
        "expect_column_pair_values_a_to_be_greater_than_b",
        DomainType::ColumnPair,
        &["or_equal", "ignore_row_if", "mostly"],
    ),
    kind("expect_column_pair_values_to_be_in_set", DomainType::ColumnPair, &["value_pairs_set", "ignore_row_if", "mostly"]),
    kind("expect_multicolumn_sum_to_equal", DomainType::Multicolumn, &["sum_total", "ignore_row_if", "mostly"]),
    kind("expect_compound_columns_to_be_unique", DomainType::Multicolumn, PAIR),
    kind("expect_select_column_values_to_be_unique_within_record", DomainType::Multicolumn, PAIR),
];

/// Look up a known expectation type
#[must_use]
pub fn lookup(expectation_type: &str) -> Option<&'static ExpectationKind> {
    CATALOG.iter().find(|k| k.expectation_type == expectation_type)
}

/// The special type whose `column_list` fixes the reporting order of columns
pub const ORDERED_COLUMNS_EXPECTATION: &str = "expect_table_columns_to_match_ordered_list";
