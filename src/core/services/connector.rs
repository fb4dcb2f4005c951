//! Data connector - resolves storage listings into batch definitions
//!
//! A connector lists raw keys for each configured asset, matches them against
//! the asset's batching regex and caches the outcome. Queries are answered
//! from the cache, which is rebuilt wholesale on [`DataConnector::refresh`]
//! (or lazily on first use).

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::matcher::{BatchingRegex, MatchError};
use super::sorter::{SortError, Sorter, sort_batch_definitions};
use crate::core::models::{BatchDefinition, BatchIdentifiers, BatchRequest};
use crate::core::ports::KeyLister;

/// How many example references a report carries
const REPORT_EXAMPLES: usize = 3;

/// Errors from building or querying a data connector
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// A batching regex could not be built
    #[error(transparent)]
    InvalidPattern(#[from] MatchError),

    /// An asset has no pattern and the connector has no default
    #[error("asset `{0}` has no batching regex and the connector has no default")]
    MissingPattern(String),

    /// The connector has no assets
    #[error("a data connector needs at least one asset")]
    NoAssets,

    /// Two assets share a name
    #[error("asset `{0}` is declared more than once")]
    DuplicateAsset(String),

    /// A sorter names a group the asset's pattern does not produce
    #[error("sorter `{sorter}` of asset `{asset}` does not match any group in {groups:?}")]
    UnknownSorterGroup {
        /// The sorter name
        sorter: String,
        /// The asset being configured
        asset: String,
        /// Groups the pattern produces
        groups: Vec<String>,
    },

    /// More sorters than groups
    #[error("asset `{asset}` has {sorters} sorters but its pattern has only {groups} groups")]
    TooManySorters {
        /// The asset being configured
        asset: String,
        /// Number of sorters
        sorters: usize,
        /// Number of groups
        groups: usize,
    },

    /// A batch could not be sorted
    #[error(transparent)]
    InvalidSorterValue(#[from] SortError),

    /// A required request field was empty
    #[error("batch request is missing `{0}`")]
    MissingRequestField(&'static str),

    /// The request targets another datasource
    #[error("batch request is for datasource `{actual}`, this connector belongs to `{expected}`")]
    DatasourceMismatch {
        /// This connector's datasource
        expected: String,
        /// The requested datasource
        actual: String,
    },

    /// The request targets another connector
    #[error("batch request is for connector `{actual}`, this connector is `{expected}`")]
    ConnectorMismatch {
        /// This connector's name
        expected: String,
        /// The requested connector
        actual: String,
    },

    /// The request names an asset this connector does not have
    #[error("unknown data asset `{0}`")]
    UnknownAsset(String),

    /// The key lister failed
    #[error(transparent)]
    Lister(#[from] anyhow::Error),
}

/// Normalize a listing prefix
///
/// A prefix whose last segment has no extension is treated as a directory and
/// gets a trailing `/`. Empty prefixes stay empty.
#[must_use]
pub fn sanitize_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        return prefix.to_string();
    }
    let last_segment = prefix.rsplit('/').next().unwrap_or(prefix);
    if last_segment.trim_start_matches('.').contains('.') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}

/// Declaration of one data asset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetDefinition {
    /// Asset name
    pub name: String,
    /// Listing prefix; replaces the connector prefix when set
    pub prefix: Option<String>,
    /// Batching regex; replaces the connector default when set
    pub pattern: Option<String>,
    /// Positional names for the unnamed groups of `pattern`
    pub group_names: Vec<String>,
    /// Sorters; replace the connector sorters when set
    pub sorters: Option<Vec<Sorter>>,
}

impl AssetDefinition {
    /// Declare an asset using the connector defaults
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Use a listing prefix of its own
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Use a batching regex of its own
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Name the unnamed groups of its pattern
    #[must_use]
    pub fn with_group_names<I, S>(mut self, group_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_names = group_names.into_iter().map(Into::into).collect();
        self
    }

    /// Use sorters of its own
    #[must_use]
    pub fn with_sorters(mut self, sorters: Vec<Sorter>) -> Self {
        self.sorters = Some(sorters);
        self
    }
}

/// An asset with its pattern compiled and sorters validated
#[derive(Debug, Clone)]
struct ResolvedAsset {
    name: String,
    prefix: String,
    regex: BatchingRegex,
    sorters: Vec<Sorter>,
}

impl ResolvedAsset {
    /// The part of a key the pattern is matched against
    fn relative_key<'k>(&self, key: &'k str) -> &'k str {
        if self.prefix.ends_with('/') {
            key.strip_prefix(self.prefix.as_str()).unwrap_or(key)
        } else {
            key
        }
    }
}

/// Every sorter must name a group, and there may not be more sorters than groups
fn validate_sorters(asset: &str, regex: &BatchingRegex, sorters: &[Sorter]) -> Result<(), ConnectorError> {
    let groups = regex.identifier_names();
    if sorters.len() > groups.len() {
        return Err(ConnectorError::TooManySorters {
            asset: asset.to_string(),
            sorters: sorters.len(),
            groups: groups.len(),
        });
    }
    for sorter in sorters {
        if !groups.contains(&sorter.name.as_str()) {
            return Err(ConnectorError::UnknownSorterGroup {
                sorter: sorter.name.clone(),
                asset: asset.to_string(),
                groups: groups.iter().map(|g| (*g).to_string()).collect(),
            });
        }
    }
    Ok(())
}

/// Listing of one asset, partitioned by the matcher
#[derive(Debug, Clone, Default)]
struct AssetReferences {
    all: Vec<String>,
    matched: Vec<(String, BatchIdentifiers)>,
    unmatched: Vec<String>,
}

impl AssetReferences {
    /// Matched identifiers with repeats dropped, first occurrence first
    fn unique_identifiers(&self) -> Vec<&BatchIdentifiers> {
        let mut seen = HashSet::new();
        self.matched
            .iter()
            .map(|(_, identifiers)| identifiers)
            .filter(|identifiers| seen.insert(*identifiers))
            .collect()
    }
}

/// Per-asset section of a [`ConnectorReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReport {
    /// Number of distinct batches
    pub batch_definition_count: usize,
    /// A few matched keys
    pub example_data_references: Vec<String>,
}

/// Summary of what a connector currently resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorReport {
    /// Number of assets
    pub data_asset_count: usize,
    /// A few asset names, sorted
    pub example_data_asset_names: Vec<String>,
    /// Per-asset details
    pub data_assets: BTreeMap<String, AssetReport>,
    /// Keys an asset's pattern did not match, counted once per asset
    ///
    /// A key listed under two assets that only one of them matches is
    /// counted here for the other.
    pub unmatched_data_reference_count: usize,
    /// A few keys an asset's pattern did not match
    pub example_unmatched_data_references: Vec<String>,
}

/// Builder for [`DataConnector`]
pub struct DataConnectorBuilder {
    datasource_name: String,
    name: String,
    lister: Arc<dyn KeyLister>,
    prefix: String,
    default_pattern: Option<String>,
    default_group_names: Vec<String>,
    assets: Vec<AssetDefinition>,
    sorters: Vec<Sorter>,
}

impl std::fmt::Debug for DataConnectorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataConnectorBuilder")
            .field("datasource_name", &self.datasource_name)
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .field("default_pattern", &self.default_pattern)
            .field("assets", &self.assets)
            .finish_non_exhaustive()
    }
}

impl DataConnectorBuilder {
    /// Listing prefix shared by assets without their own
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Batching regex for assets without their own
    #[must_use]
    pub fn with_default_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.default_pattern = Some(pattern.into());
        self
    }

    /// Positional names for the unnamed groups of the default pattern
    #[must_use]
    pub fn with_default_group_names<I, S>(mut self, group_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_group_names = group_names.into_iter().map(Into::into).collect();
        self
    }

    /// Declare an asset
    #[must_use]
    pub fn with_asset(mut self, asset: AssetDefinition) -> Self {
        self.assets.push(asset);
        self
    }

    /// Sorters for assets without their own
    #[must_use]
    pub fn with_sorters(mut self, sorters: Vec<Sorter>) -> Self {
        self.sorters = sorters;
        self
    }

    /// Compile every pattern and validate every sorter
    ///
    /// Sorter problems are reported here, never at query time.
    pub fn build(self) -> Result<DataConnector, ConnectorError> {
        if self.assets.is_empty() {
            return Err(ConnectorError::NoAssets);
        }

        let mut assets: Vec<ResolvedAsset> = Vec::with_capacity(self.assets.len());
        for definition in self.assets {
            if assets.iter().any(|a| a.name == definition.name) {
                return Err(ConnectorError::DuplicateAsset(definition.name));
            }

            let regex = match (&definition.pattern, &self.default_pattern) {
                (Some(pattern), _) => BatchingRegex::with_group_names(pattern, &definition.group_names)?,
                (None, Some(pattern)) => BatchingRegex::with_group_names(pattern, &self.default_group_names)?,
                (None, None) => return Err(ConnectorError::MissingPattern(definition.name)),
            };
            let sorters = definition.sorters.unwrap_or_else(|| self.sorters.clone());
            validate_sorters(&definition.name, &regex, &sorters)?;

            let prefix = sanitize_prefix(definition.prefix.as_deref().unwrap_or(&self.prefix));
            assets.push(ResolvedAsset {
                name: definition.name,
                prefix,
                regex,
                sorters,
            });
        }

        Ok(DataConnector {
            datasource_name: self.datasource_name,
            name: self.name,
            lister: self.lister,
            assets,
            cache: None,
        })
    }
}

/// Resolves storage listings into batch definitions for a set of assets
pub struct DataConnector {
    datasource_name: String,
    name: String,
    lister: Arc<dyn KeyLister>,
    assets: Vec<ResolvedAsset>,
    cache: Option<Vec<AssetReferences>>,
}

impl std::fmt::Debug for DataConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataConnector")
            .field("datasource_name", &self.datasource_name)
            .field("name", &self.name)
            .field("assets", &self.assets)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl DataConnector {
    /// Start building a connector that lists keys through `lister`
    #[must_use]
    pub fn builder(
        datasource_name: impl Into<String>,
        name: impl Into<String>,
        lister: Arc<dyn KeyLister>,
    ) -> DataConnectorBuilder {
        DataConnectorBuilder {
            datasource_name: datasource_name.into(),
            name: name.into(),
            lister,
            prefix: String::new(),
            default_pattern: None,
            default_group_names: Vec::new(),
            assets: Vec::new(),
            sorters: Vec::new(),
        }
    }

    /// Owning datasource
    #[must_use]
    pub fn datasource_name(&self) -> &str {
        &self.datasource_name
    }

    /// Connector name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Asset names, in declaration order
    #[must_use]
    pub fn asset_names(&self) -> Vec<&str> {
        self.assets.iter().map(|a| a.name.as_str()).collect()
    }

    // ========================================================================
    // Cache
    // ========================================================================

    /// Re-list every asset and rebuild the reference cache
    pub fn refresh(&mut self) -> Result<(), ConnectorError> {
        let mut cache = Vec::with_capacity(self.assets.len());
        for asset in &self.assets {
            let keys = self.lister.list_keys(&asset.prefix)?;
            let mut references = AssetReferences::default();
            for key in keys {
                match asset.regex.match_key(asset.relative_key(&key)) {
                    Some(identifiers) => references.matched.push((key.clone(), identifiers)),
                    None => {
                        trace!("{} did not match asset {}", key, asset.name);
                        references.unmatched.push(key.clone());
                    },
                }
                references.all.push(key);
            }
            debug!(
                "asset {}: {} keys, {} matched, {} unmatched",
                asset.name,
                references.all.len(),
                references.matched.len(),
                references.unmatched.len()
            );
            cache.push(references);
        }
        self.cache = Some(cache);
        Ok(())
    }

    fn ensure_cache(&mut self) -> Result<(), ConnectorError> {
        if self.cache.is_none() {
            self.refresh()?;
        }
        Ok(())
    }

    fn cached(&self) -> &[AssetReferences] {
        self.cache.as_deref().unwrap_or_default()
    }

    fn asset_index(&self, name: &str) -> Result<usize, ConnectorError> {
        self.assets
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| ConnectorError::UnknownAsset(name.to_string()))
    }

    /// Cached references of one asset, or of all of them
    fn selected(&mut self, asset: Option<&str>) -> Result<Vec<&AssetReferences>, ConnectorError> {
        self.ensure_cache()?;
        match asset {
            Some(name) => {
                let index = self.asset_index(name)?;
                Ok(self.cached().get(index).into_iter().collect())
            },
            None => Ok(self.cached().iter().collect()),
        }
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Every listed key
    pub fn data_references(&mut self, asset: Option<&str>) -> Result<Vec<String>, ConnectorError> {
        Ok(self.selected(asset)?.into_iter().flat_map(|r| r.all.iter().cloned()).collect())
    }

    /// Keys the asset pattern matched
    pub fn matched_data_references(&mut self, asset: Option<&str>) -> Result<Vec<String>, ConnectorError> {
        Ok(self
            .selected(asset)?
            .into_iter()
            .flat_map(|r| r.matched.iter().map(|(key, _)| key.clone()))
            .collect())
    }

    /// Keys the asset pattern did not match
    pub fn unmatched_data_references(&mut self, asset: Option<&str>) -> Result<Vec<String>, ConnectorError> {
        Ok(self.selected(asset)?.into_iter().flat_map(|r| r.unmatched.iter().cloned()).collect())
    }

    /// Number of listed keys, summed per asset
    ///
    /// A key listed under several assets counts once for each.
    pub fn data_reference_count(&mut self) -> Result<usize, ConnectorError> {
        Ok(self.selected(None)?.iter().map(|r| r.all.len()).sum())
    }

    /// Number of keys matched, summed per asset
    pub fn matched_data_reference_count(&mut self) -> Result<usize, ConnectorError> {
        Ok(self.selected(None)?.iter().map(|r| r.matched.len()).sum())
    }

    /// Number of keys not matched, summed per asset
    pub fn unmatched_data_reference_count(&mut self) -> Result<usize, ConnectorError> {
        Ok(self.selected(None)?.iter().map(|r| r.unmatched.len()).sum())
    }

    /// Summarize assets, batch counts and unmatched keys
    pub fn report(&mut self) -> Result<ConnectorReport, ConnectorError> {
        self.ensure_cache()?;
        let references = self.cached();

        let mut data_assets = BTreeMap::new();
        let mut unmatched = Vec::new();
        for (asset, refs) in self.assets.iter().zip(references) {
            data_assets.insert(
                asset.name.clone(),
                AssetReport {
                    batch_definition_count: refs.unique_identifiers().len(),
                    example_data_references: refs
                        .matched
                        .iter()
                        .take(REPORT_EXAMPLES)
                        .map(|(key, _)| key.clone())
                        .collect(),
                },
            );
            unmatched.extend(refs.unmatched.iter().cloned());
        }

        let mut names: Vec<String> = self.assets.iter().map(|a| a.name.clone()).collect();
        names.sort();
        names.truncate(REPORT_EXAMPLES);

        Ok(ConnectorReport {
            data_asset_count: self.assets.len(),
            example_data_asset_names: names,
            data_assets,
            unmatched_data_reference_count: unmatched.len(),
            example_unmatched_data_references: unmatched.into_iter().take(REPORT_EXAMPLES).collect(),
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    fn validate_request(&self, request: &BatchRequest) -> Result<usize, ConnectorError> {
        if request.datasource_name.is_empty() {
            return Err(ConnectorError::MissingRequestField("datasource_name"));
        }
        if request.data_asset_name.is_empty() {
            return Err(ConnectorError::MissingRequestField("data_asset_name"));
        }
        if request.datasource_name != self.datasource_name {
            return Err(ConnectorError::DatasourceMismatch {
                expected: self.datasource_name.clone(),
                actual: request.datasource_name.clone(),
            });
        }
        if let Some(connector) = &request.data_connector_name {
            if *connector != self.name {
                return Err(ConnectorError::ConnectorMismatch {
                    expected: self.name.clone(),
                    actual: connector.clone(),
                });
            }
        }
        self.asset_index(&request.data_asset_name)
    }

    /// Batch definitions of the requested asset that satisfy its options
    ///
    /// Repeated identifier sets yield one definition. Without sorters the
    /// listing order is kept; otherwise the asset's sorters order the result.
    /// A `batching_regex` on the request re-matches the asset's keys with
    /// that pattern instead.
    pub fn get_batch_definition_list(&mut self, request: &BatchRequest) -> Result<Vec<BatchDefinition>, ConnectorError> {
        let index = self.validate_request(request)?;
        self.ensure_cache()?;

        let asset = &self.assets[index];
        let references = self.cached().get(index).cloned().unwrap_or_default();

        let (pattern, candidates): (String, Vec<BatchIdentifiers>) = match &request.batching_regex {
            Some(pattern) => {
                let regex = BatchingRegex::new(pattern)?;
                let identifiers = references
                    .all
                    .iter()
                    .filter_map(|key| regex.match_key(asset.relative_key(key)))
                    .collect();
                (pattern.clone(), identifiers)
            },
            None => (
                asset.regex.as_str().to_string(),
                references.matched.into_iter().map(|(_, identifiers)| identifiers).collect(),
            ),
        };

        let mut seen = HashSet::new();
        let definitions: Vec<BatchDefinition> = candidates
            .into_iter()
            .filter(|identifiers| seen.insert(identifiers.clone()))
            .filter(|identifiers| identifiers.satisfies(&request.options))
            .map(|batch_identifiers| BatchDefinition {
                datasource_name: self.datasource_name.clone(),
                data_connector_name: self.name.clone(),
                data_asset_name: asset.name.clone(),
                batch_identifiers,
                batching_regex: Some(pattern.clone()),
            })
            .collect();

        debug!(
            "resolved {} batch definitions for asset {}",
            definitions.len(),
            asset.name
        );
        Ok(sort_batch_definitions(definitions, &asset.sorters)?)
    }
}
