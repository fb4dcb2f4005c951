//! Batch model
//!
//! Batch definitions are transient query results: built fresh by a data
//! connector for every request and never mutated afterwards.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Filter and parameter values for a batch request, keyed by group name
pub type BatchParameters = BTreeMap<String, String>;

/// Named values extracted from a storage key, in pattern declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BatchIdentifiers(Vec<(String, String)>);

impl BatchIdentifiers {
    /// Create an empty mapping
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Set a value, keeping the position of an existing key
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Value for a group name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// Group names, in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    /// Name/value pairs, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of identifiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no identifiers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every filter entry is present here with an equal value
    ///
    /// A filter key missing from these identifiers is not a mismatch.
    #[must_use]
    pub fn satisfies(&self, filter: &BatchParameters) -> bool {
        filter
            .iter()
            .all(|(name, expected)| self.get(name).is_none_or(|value| value == expected))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BatchIdentifiers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut identifiers = Self::new();
        for (name, value) in iter {
            identifiers.insert(name, value);
        }
        identifiers
    }
}

impl Serialize for BatchIdentifiers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BatchIdentifiers {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::deserialize(deserializer)?;
        Ok(map
            .into_iter()
            .map(|(name, value)| match value {
                serde_json::Value::String(s) => (name, s),
                other => (name, other.to_string()),
            })
            .collect())
    }
}

/// One resolved batch: where it lives and what identifies it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchDefinition {
    /// Datasource that owns the connector
    pub datasource_name: String,

    /// Connector that resolved the batch
    pub data_connector_name: String,

    /// Asset the batch belongs to
    pub data_asset_name: String,

    /// Values extracted from the storage key
    pub batch_identifiers: BatchIdentifiers,

    /// The pattern that produced the identifiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batching_regex: Option<String>,
}

impl std::fmt::Display for BatchDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.datasource_name, self.data_connector_name, self.data_asset_name
        )?;
        for (name, value) in self.batch_identifiers.iter() {
            write!(f, " {name}={value}")?;
        }
        Ok(())
    }
}

/// A query for batches of one asset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Datasource the request targets
    pub datasource_name: String,

    /// Connector the request targets (any connector when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_connector_name: Option<String>,

    /// Asset whose batches are requested
    pub data_asset_name: String,

    /// Exact-match filter on batch identifiers
    #[serde(default)]
    pub options: BatchParameters,

    /// Pattern that overrides the asset's own for this request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batching_regex: Option<String>,
}

impl BatchRequest {
    /// Create a request for every batch of an asset
    #[must_use]
    pub fn new(datasource_name: impl Into<String>, data_asset_name: impl Into<String>) -> Self {
        Self {
            datasource_name: datasource_name.into(),
            data_asset_name: data_asset_name.into(),
            ..Self::default()
        }
    }

    /// Target a specific connector
    #[must_use]
    pub fn with_connector(mut self, data_connector_name: impl Into<String>) -> Self {
        self.data_connector_name = Some(data_connector_name.into());
        self
    }

    /// Add a filter entry
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Replace the filter
    #[must_use]
    pub fn with_options(mut self, options: BatchParameters) -> Self {
        self.options = options;
        self
    }

    /// Override the asset's pattern
    #[must_use]
    pub fn with_batching_regex(mut self, batching_regex: impl Into<String>) -> Self {
        self.batching_regex = Some(batching_regex.into());
        self
    }
}
