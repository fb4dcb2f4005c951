//! Connector configuration
//!
//! A data connector can be described in TOML and turned into a
//! [`DataConnector`]:
//!
//! ```toml
//! datasource_name = "taxi"
//! data_connector_name = "files"
//! prefix = "data"
//!
//! [default_regex]
//! pattern = '(.+)_(\d{4})\.csv'
//! group_names = ["name", "year"]
//!
//! [[sorters]]
//! kind = "numeric"
//! name = "year"
//! orderby = "desc"
//!
//! [assets.yellow]
//! prefix = "data/yellow"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::ports::KeyLister;
use crate::core::services::{AssetDefinition, ConnectorError, DataConnector, SortOrder, Sorter};

/// Description of a data connector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Datasource that owns the connector
    pub datasource_name: String,
    /// Connector name
    pub data_connector_name: String,
    /// Listing prefix for assets without their own
    #[serde(default)]
    pub prefix: String,
    /// Batching regex for assets without their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_regex: Option<PatternConfig>,
    /// Assets keyed by name (built in name order)
    #[serde(default)]
    pub assets: BTreeMap<String, AssetConfig>,
    /// Sorters for assets without their own
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sorters: Vec<SorterConfig>,
}

/// A batching regex with positional group names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// The regular expression
    pub pattern: String,
    /// Names for its unnamed groups
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_names: Vec<String>,
}

/// Per-asset overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Listing prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Batching regex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Names for the unnamed groups of `pattern`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_names: Vec<String>,
    /// Sorters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorters: Option<Vec<SorterConfig>>,
}

/// One sorter, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SorterConfig {
    /// String comparison
    Lexicographic {
        /// Group name
        name: String,
        /// Direction
        #[serde(default)]
        orderby: SortOrder,
    },
    /// Numeric comparison
    Numeric {
        /// Group name
        name: String,
        /// Direction
        #[serde(default)]
        orderby: SortOrder,
    },
    /// Date/time comparison
    Datetime {
        /// Group name
        name: String,
        /// Direction
        #[serde(default)]
        orderby: SortOrder,
        /// `strftime`-style format of the values
        datetime_format: String,
    },
}

impl SorterConfig {
    /// Build the sorter
    #[must_use]
    pub fn to_sorter(&self) -> Sorter {
        match self {
            Self::Lexicographic { name, orderby } => Sorter::lexicographic(name, *orderby),
            Self::Numeric { name, orderby } => Sorter::numeric(name, *orderby),
            Self::Datetime {
                name,
                orderby,
                datetime_format,
            } => Sorter::datetime(name, datetime_format, *orderby),
        }
    }
}

fn to_sorters(configs: &[SorterConfig]) -> Vec<Sorter> {
    configs.iter().map(SorterConfig::to_sorter).collect()
}

impl ConnectorConfig {
    /// Parse a TOML description
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML description from disk
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save as TOML
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Build a connector that lists keys through `lister`
    ///
    /// Fails on the same configuration errors as [`DataConnector::builder`].
    pub fn into_connector(self, lister: Arc<dyn KeyLister>) -> Result<DataConnector, ConnectorError> {
        let mut builder = DataConnector::builder(self.datasource_name, self.data_connector_name, lister)
            .with_prefix(self.prefix)
            .with_sorters(to_sorters(&self.sorters));

        if let Some(default_regex) = self.default_regex {
            builder = builder
                .with_default_pattern(default_regex.pattern)
                .with_default_group_names(default_regex.group_names);
        }

        for (name, asset) in self.assets {
            let mut definition = AssetDefinition::new(name).with_group_names(asset.group_names);
            definition.prefix = asset.prefix;
            definition.pattern = asset.pattern;
            definition.sorters = asset.sorters.as_deref().map(to_sorters);
            builder = builder.with_asset(definition);
        }

        builder.build()
    }
}
