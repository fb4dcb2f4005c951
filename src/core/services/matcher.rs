//! Batching regex matcher - extracts batch identifiers from storage keys
//!
//! This module contains pure matching logic with no I/O dependencies.

use regex::Regex;
use thiserror::Error;

use crate::core::models::BatchIdentifiers;

/// Identifier name used when a pattern declares no groups
pub const WHOLE_PATH_IDENTIFIER: &str = "path";

/// Errors building a batching regex
#[derive(Debug, Error)]
pub enum MatchError {
    /// The pattern is not a valid regular expression
    #[error("invalid batching regex `{pattern}`: {source}")]
    InvalidPattern {
        /// The rejected pattern
        pattern: String,
        /// Why it was rejected
        #[source]
        source: regex::Error,
    },

    /// More positional group names than capture groups
    #[error("{given} group names given for a pattern with {groups} capture groups")]
    TooManyGroupNames {
        /// Number of names supplied
        given: usize,
        /// Number of capture groups in the pattern
        groups: usize,
    },

    /// Two groups ended up with the same name
    #[error("group name `{0}` is used more than once")]
    DuplicateGroupName(String),
}

/// A compiled pattern that turns storage keys into batch identifiers
///
/// Matching is always anchored at both ends. Group order is the order the
/// groups are declared in the pattern.
#[derive(Debug, Clone)]
pub struct BatchingRegex {
    pattern: String,
    regex: Regex,
    /// Identifier name per capture group (index 0 is group 1); `None` is ignored
    groups: Vec<Option<String>>,
}

impl BatchingRegex {
    /// Compile a pattern, using its named groups as identifier names
    pub fn new(pattern: &str) -> Result<Self, MatchError> {
        Self::with_group_names(pattern, &[])
    }

    /// Compile a pattern whose capture groups are named positionally
    ///
    /// `group_names[i]` names capture group `i + 1` unless that group already
    /// carries a name in the pattern itself.
    pub fn with_group_names(pattern: &str, group_names: &[String]) -> Result<Self, MatchError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            MatchError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        let declared: Vec<Option<&str>> = regex.capture_names().skip(1).collect();
        if group_names.len() > declared.len() {
            return Err(MatchError::TooManyGroupNames {
                given: group_names.len(),
                groups: declared.len(),
            });
        }

        let mut groups = Vec::with_capacity(declared.len());
        for (index, name) in declared.iter().enumerate() {
            let name = name.map(String::from).or_else(|| group_names.get(index).cloned());
            let duplicate = name
                .as_ref()
                .is_some_and(|name| groups.iter().flatten().any(|existing: &String| existing == name));
            if duplicate {
                return Err(MatchError::DuplicateGroupName(name.unwrap_or_default()));
            }
            groups.push(name);
        }

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            groups,
        })
    }

    /// The pattern as written
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Whether the pattern has no named groups and identifies keys by path
    #[must_use]
    pub fn is_whole_path(&self) -> bool {
        self.groups.iter().all(Option::is_none)
    }

    /// Names of the identifiers this pattern produces, in declaration order
    #[must_use]
    pub fn identifier_names(&self) -> Vec<&str> {
        if self.is_whole_path() {
            return vec![WHOLE_PATH_IDENTIFIER];
        }
        self.groups.iter().flatten().map(String::as_str).collect()
    }

    /// Match a key, returning its identifiers
    ///
    /// Groups that did not take part in the match map to an empty string. A
    /// pattern without named groups yields the key itself under `path`.
    #[must_use]
    pub fn match_key(&self, key: &str) -> Option<BatchIdentifiers> {
        let captures = self.regex.captures(key)?;
        if self.is_whole_path() {
            return Some([(WHOLE_PATH_IDENTIFIER, key)].into_iter().collect());
        }

        let mut identifiers = BatchIdentifiers::new();
        for (index, name) in self.groups.iter().enumerate() {
            if let Some(name) = name {
                let value = captures.get(index + 1).map_or("", |m| m.as_str());
                identifiers.insert(name.as_str(), value);
            }
        }
        Some(identifiers)
    }
}

impl std::fmt::Display for BatchingRegex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pattern)
    }
}
