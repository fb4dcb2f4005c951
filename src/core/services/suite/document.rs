//! Serialized form of a suite
//!
//! The document is a JSON-compatible mapping: `name`, optional `id`,
//! `expectations`, `evaluation_parameters`, `meta` and optional `notes`.
//! Empty `evaluation_parameters`, `meta` and `notes` are left out.

use serde::{Deserialize, Serialize};

use crate::core::models::{ExpectationConfiguration, Kwargs, canonical_id};

/// Free-form suite notes: one string or a list of lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Notes {
    /// A single note
    Text(String),
    /// Several lines
    Lines(Vec<String>),
}

impl Notes {
    /// Whether there is nothing in the notes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Lines(lines) => lines.is_empty(),
        }
    }
}

impl From<&str> for Notes {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<String>> for Notes {
    fn from(lines: Vec<String>) -> Self {
        Self::Lines(lines)
    }
}

fn notes_are_empty(notes: &Option<Notes>) -> bool {
    notes.as_ref().is_none_or(Notes::is_empty)
}

/// A suite as written to and read from a persistence medium
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteDocument {
    /// Suite name
    pub name: String,

    /// Persisted suite id, in canonical form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Expectation configurations, in suite order
    #[serde(default)]
    pub expectations: Vec<ExpectationConfiguration>,

    /// Runtime substitution variables
    #[serde(default, skip_serializing_if = "Kwargs::is_empty")]
    pub evaluation_parameters: Kwargs,

    /// Suite metadata
    #[serde(default, skip_serializing_if = "Kwargs::is_empty")]
    pub meta: Kwargs,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "notes_are_empty")]
    pub notes: Option<Notes>,
}

impl SuiteDocument {
    /// Normalize the id to its canonical form and drop empty notes
    #[must_use]
    pub fn canonicalized(mut self) -> Self {
        self.id = self.id.as_deref().map(canonical_id);
        if notes_are_empty(&self.notes) {
            self.notes = None;
        }
        self
    }
}
