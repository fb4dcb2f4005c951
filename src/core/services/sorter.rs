//! Batch sorters - composite, typed ordering of batch definitions
//!
//! Each sorter orders by one identifier. Sorters are applied in declaration
//! order: the first is the primary key, later ones break ties. Ties left after
//! every sorter keep their input order.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::models::{BatchDefinition, BatchIdentifiers};

/// Errors raised while sorting
#[derive(Debug, Error)]
pub enum SortError {
    /// A batch has no value for the sorted identifier
    #[error("batch has no `{name}` identifier to sort by")]
    MissingIdentifier {
        /// The sorter's identifier name
        name: String,
    },

    /// A value could not be parsed for the sorter's type
    #[error("cannot sort `{name}` value `{value}` as {kind}")]
    InvalidValue {
        /// The sorter's identifier name
        name: String,
        /// The offending value
        value: String,
        /// The sorter type
        kind: String,
    },
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(format!("Invalid sort order: {s}. Use: asc, desc")),
        }
    }
}

/// How identifier values are compared
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKind {
    /// Plain string comparison
    Lexicographic,
    /// Compare after parsing as a number
    Numeric,
    /// Compare after parsing with a `strftime`-style format
    DateTime {
        /// Format of the identifier value (e.g. `%Y%m%d`)
        format: String,
    },
}

impl std::fmt::Display for SortKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexicographic => write!(f, "lexicographic"),
            Self::Numeric => write!(f, "numeric"),
            Self::DateTime { format } => write!(f, "datetime ({format})"),
        }
    }
}

/// Parsed value a sorter compares
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Text(String),
    Number(f64),
    Time(NaiveDateTime),
}

impl SortKey {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            // One sorter always produces one variant
            _ => Ordering::Equal,
        }
    }
}

/// Orders batches by one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sorter {
    /// Identifier (capture group) name
    pub name: String,
    /// Comparison type
    pub kind: SortKind,
    /// Direction
    pub order: SortOrder,
}

impl Sorter {
    /// Sort by string comparison
    #[must_use]
    pub fn lexicographic(name: impl Into<String>, order: SortOrder) -> Self {
        Self {
            name: name.into(),
            kind: SortKind::Lexicographic,
            order,
        }
    }

    /// Sort by numeric value
    #[must_use]
    pub fn numeric(name: impl Into<String>, order: SortOrder) -> Self {
        Self {
            name: name.into(),
            kind: SortKind::Numeric,
            order,
        }
    }

    /// Sort by date/time parsed with `format`
    #[must_use]
    pub fn datetime(name: impl Into<String>, format: impl Into<String>, order: SortOrder) -> Self {
        Self {
            name: name.into(),
            kind: SortKind::DateTime {
                format: format.into(),
            },
            order,
        }
    }

    fn key(&self, identifiers: &BatchIdentifiers) -> Result<SortKey, SortError> {
        let value = identifiers.get(&self.name).ok_or_else(|| SortError::MissingIdentifier {
            name: self.name.clone(),
        })?;
        let invalid = || SortError::InvalidValue {
            name: self.name.clone(),
            value: value.to_string(),
            kind: self.kind.to_string(),
        };

        match &self.kind {
            SortKind::Lexicographic => Ok(SortKey::Text(value.to_string())),
            SortKind::Numeric => value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| !n.is_nan())
                .map(SortKey::Number)
                .ok_or_else(invalid),
            SortKind::DateTime { format } => parse_datetime(value, format)
                .map(SortKey::Time)
                .ok_or_else(invalid),
        }
    }

    fn compare(&self, a: &SortKey, b: &SortKey) -> Ordering {
        let ordering = a.compare(b);
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Parse a full date/time, or a bare date at midnight
fn parse_datetime(value: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, format).ok().or_else(|| {
        NaiveDate::parse_from_str(value, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

/// Sort batch definitions by a composite of sorters
///
/// With no sorters the input order is returned unchanged. Every key is parsed
/// up front, so an unparseable value fails the whole sort.
pub fn sort_batch_definitions(
    definitions: Vec<BatchDefinition>,
    sorters: &[Sorter],
) -> Result<Vec<BatchDefinition>, SortError> {
    if sorters.is_empty() {
        return Ok(definitions);
    }

    let mut keyed = definitions
        .into_iter()
        .map(|definition| {
            let keys = sorters
                .iter()
                .map(|sorter| sorter.key(&definition.batch_identifiers))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((keys, definition))
        })
        .collect::<Result<Vec<_>, SortError>>()?;

    keyed.sort_by(|(a, _), (b, _)| {
        sorters
            .iter()
            .zip(a.iter().zip(b))
            .map(|(sorter, (a, b))| sorter.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    Ok(keyed.into_iter().map(|(_, definition)| definition).collect())
}
