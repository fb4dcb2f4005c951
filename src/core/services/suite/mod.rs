//! Expectation suite service
//!
//! An [`ExpectationSuite`] is a set-like, ordered collection of expectations
//! that keeps a shared persistence store in sync. Additions and deletions are
//! written through to the store once the suite itself has been persisted; a
//! failed store call rolls the in-memory change back and surfaces the store's
//! error unchanged.
//!
//! Sub-modules:
//!
//! - [`expectation`] - Bound expectations and their save path
//! - [`grouping`] - Domain and column views used for reporting
//! - [`citations`] - The audit log kept in `meta`
//! - [`document`] - The serialized suite form

pub mod citations;
pub mod document;
pub mod expectation;
pub mod grouping;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::core::models::{
    ConfigurationError, DomainType, ExpectationConfiguration, IdentifierBundle, Kwargs, MatchType,
    StoreKey, canonical_id,
};
use crate::core::ports::{EventKind, EventSink, ExpectationEvent, ExpectationsStore, Renderer};

pub use citations::{Citation, CitationDate, CitationFilter};
pub use document::{Notes, SuiteDocument};
pub use expectation::{Expectation, SuiteBinding};
pub use grouping::{ColumnGrouping, NO_COLUMN};

/// Meta key holding the version that created the suite
pub const VERSION_META_KEY: &str = "datasuite_version";

/// Errors from suite operations
#[derive(Debug, Error)]
pub enum SuiteError {
    /// The suite name was empty
    #[error("name must be provided as a non-empty string")]
    InvalidName,

    /// The expectation already has a persisted identity
    #[error(
        "cannot add expectation {id}: it already belongs to a suite. Call save() to update it, \
         or copy it and clear its id to add it elsewhere"
    )]
    AlreadyBound {
        /// The existing id
        id: String,
    },

    /// No expectation matched
    #[error("no matching expectation was found")]
    NotFound,

    /// More than one expectation matched and bulk handling was not requested
    #[error("{count} matching expectations were found; use more precise matching criteria")]
    AmbiguousMatch {
        /// Number of matches
        count: usize,
    },

    /// Upsert found a match but overwriting was not allowed
    #[error("a matching expectation already exists; allow overwriting to replace it")]
    AlreadyExists,

    /// A lookup had neither a configuration nor an id
    #[error("must provide either an expectation configuration or an id")]
    MissingCriteria,

    /// The configuration cannot be turned into an expectation
    #[error("provided configuration is not valid: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),

    /// Suite metadata has the wrong shape
    #[error("invalid suite meta: {0}")]
    InvalidMeta(String),

    /// The expectation is not bound to a suite
    #[error("expectation is not bound to a suite")]
    NotBound,

    /// A citation date could not be parsed
    #[error("invalid citation date: {0}")]
    InvalidCitationDate(String),

    /// The suite document could not be (de)serialized
    #[error("suite serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The persistence store failed
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Submit a telemetry event, logging and swallowing any failure
pub(crate) fn submit_event(
    events: Option<&Arc<dyn EventSink>>,
    kind: EventKind,
    configuration: &ExpectationConfiguration,
    suite_id: Option<&str>,
) {
    let Some(events) = events else {
        return;
    };
    let event = ExpectationEvent {
        kind,
        expectation_id: configuration.id().map(String::from),
        expectation_suite_id: suite_id.map(String::from),
        expectation_type: configuration.expectation_type().to_string(),
    };
    if let Err(e) = events.submit(&event) {
        warn!("failed to submit {kind} event: {e:#}");
    }
}

/// One input accepted when building a suite
#[derive(Debug, Clone)]
pub enum ExpectationInput {
    /// An expectation object; it must not have a persisted id
    Expectation(Expectation),
    /// A bare configuration
    Configuration(ExpectationConfiguration),
    /// A raw mapping, parsed into a configuration
    Raw(Value),
}

impl From<Expectation> for ExpectationInput {
    fn from(expectation: Expectation) -> Self {
        Self::Expectation(expectation)
    }
}

impl From<ExpectationConfiguration> for ExpectationInput {
    fn from(configuration: ExpectationConfiguration) -> Self {
        Self::Configuration(configuration)
    }
}

impl From<Value> for ExpectationInput {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

/// Criteria for locating expectations in a suite
///
/// An `id` takes precedence: when set, `configuration` and `match_type` are
/// ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectationQuery<'a> {
    /// A possibly partial configuration to compare against
    pub configuration: Option<&'a ExpectationConfiguration>,
    /// How the configuration is compared
    pub match_type: MatchType,
    /// A persisted expectation id
    pub id: Option<&'a str>,
}

impl<'a> ExpectationQuery<'a> {
    /// Match by configuration under a match type
    #[must_use]
    pub const fn by_configuration(
        configuration: &'a ExpectationConfiguration,
        match_type: MatchType,
    ) -> Self {
        Self {
            configuration: Some(configuration),
            match_type,
            id: None,
        }
    }

    /// Match by persisted id
    #[must_use]
    pub const fn by_id(id: &'a str) -> Self {
        Self {
            configuration: None,
            match_type: MatchType::Domain,
            id: Some(id),
        }
    }
}

/// Builder for [`ExpectationSuite`]
pub struct SuiteBuilder {
    name: String,
    id: Option<String>,
    expectations: Vec<ExpectationInput>,
    evaluation_parameters: Kwargs,
    meta: Option<Kwargs>,
    notes: Option<Notes>,
    store: Arc<dyn ExpectationsStore>,
    events: Option<Arc<dyn EventSink>>,
}

impl std::fmt::Debug for SuiteBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteBuilder")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("expectations", &self.expectations.len())
            .finish_non_exhaustive()
    }
}

impl SuiteBuilder {
    /// Set the persisted id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add one initial expectation
    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<ExpectationInput>) -> Self {
        self.expectations.push(expectation.into());
        self
    }

    /// Add initial expectations
    #[must_use]
    pub fn with_expectations<I>(mut self, expectations: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ExpectationInput>,
    {
        self.expectations.extend(expectations.into_iter().map(Into::into));
        self
    }

    /// Set the evaluation parameters
    #[must_use]
    pub fn with_evaluation_parameters(mut self, evaluation_parameters: Kwargs) -> Self {
        self.evaluation_parameters = evaluation_parameters;
        self
    }

    /// Set the metadata
    #[must_use]
    pub fn with_meta(mut self, meta: Kwargs) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Set the notes
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<Notes>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Set the telemetry sink
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Validate the inputs and build the suite
    pub fn build(self) -> Result<ExpectationSuite, SuiteError> {
        if self.name.trim().is_empty() {
            return Err(SuiteError::InvalidName);
        }

        let mut meta = self.meta.unwrap_or_default();
        if !meta.contains_key(VERSION_META_KEY) {
            meta.insert(VERSION_META_KEY.to_string(), Value::from(crate::VERSION));
        }
        validate_meta(&meta)?;

        let mut suite = ExpectationSuite {
            name: self.name,
            id: self.id.as_deref().map(canonical_id),
            expectations: Vec::with_capacity(self.expectations.len()),
            evaluation_parameters: self.evaluation_parameters,
            meta,
            notes: self.notes.filter(|n| !n.is_empty()),
            store: self.store,
            events: self.events,
        };

        for input in self.expectations {
            let expectation = suite.process_input(input)?;
            suite.expectations.push(expectation);
        }
        Ok(suite)
    }
}

/// Citations must be a list of mappings when present
fn validate_meta(meta: &Kwargs) -> Result<(), SuiteError> {
    match meta.get("citations") {
        None => Ok(()),
        Some(Value::Array(items)) if items.iter().all(Value::is_object) => Ok(()),
        Some(other) => Err(SuiteError::InvalidMeta(format!(
            "citations must be a list of mappings, got {other}"
        ))),
    }
}

/// A named, set-like collection of expectations synced with a store
#[derive(Clone)]
pub struct ExpectationSuite {
    name: String,
    id: Option<String>,
    expectations: Vec<Expectation>,
    evaluation_parameters: Kwargs,
    meta: Kwargs,
    notes: Option<Notes>,
    store: Arc<dyn ExpectationsStore>,
    events: Option<Arc<dyn EventSink>>,
}

impl std::fmt::Debug for ExpectationSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpectationSuite")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("expectations", &self.expectations)
            .field("evaluation_parameters", &self.evaluation_parameters)
            .field("meta", &self.meta)
            .field("notes", &self.notes)
            .finish_non_exhaustive()
    }
}

impl ExpectationSuite {
    /// Start building a suite that persists through `store`
    #[must_use]
    pub fn builder(name: impl Into<String>, store: Arc<dyn ExpectationsStore>) -> SuiteBuilder {
        SuiteBuilder {
            name: name.into(),
            id: None,
            expectations: Vec::new(),
            evaluation_parameters: Kwargs::new(),
            meta: None,
            notes: None,
            store,
            events: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Suite name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Persisted suite id, if any
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The bound expectations, in order
    #[must_use]
    pub fn expectations(&self) -> &[Expectation] {
        &self.expectations
    }

    /// One expectation, for in-place changes followed by [`Expectation::save`]
    pub fn expectation_mut(&mut self, index: usize) -> Option<&mut Expectation> {
        self.expectations.get_mut(index)
    }

    /// Number of expectations
    #[must_use]
    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    /// Whether the suite has no expectations
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    /// Copies of every configuration, in order
    #[must_use]
    pub fn expectation_configurations(&self) -> Vec<ExpectationConfiguration> {
        self.expectations.iter().map(|e| e.configuration().clone()).collect()
    }

    /// Runtime substitution variables
    #[must_use]
    pub const fn evaluation_parameters(&self) -> &Kwargs {
        &self.evaluation_parameters
    }

    /// Mutable runtime substitution variables
    pub const fn evaluation_parameters_mut(&mut self) -> &mut Kwargs {
        &mut self.evaluation_parameters
    }

    /// Suite metadata
    #[must_use]
    pub const fn meta(&self) -> &Kwargs {
        &self.meta
    }

    /// Suite notes
    #[must_use]
    pub const fn notes(&self) -> Option<&Notes> {
        self.notes.as_ref()
    }

    /// Replace the notes
    pub fn set_notes(&mut self, notes: Option<Notes>) {
        self.notes = notes.filter(|n| !n.is_empty());
    }

    /// Names of every evaluation parameter referenced, sorted and deduplicated
    #[must_use]
    pub fn evaluation_parameter_options(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .expectations
            .iter()
            .flat_map(|e| e.configuration().evaluation_parameter_options())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    fn store_key(&self) -> StoreKey {
        self.store.get_key(&self.name, self.id.as_deref())
    }

    fn bundle(&self) -> IdentifierBundle {
        IdentifierBundle::new(self.name.clone(), self.id.clone())
    }

    fn binding(&self) -> SuiteBinding {
        SuiteBinding {
            suite: self.bundle(),
            store: Arc::clone(&self.store),
            events: self.events.clone(),
        }
    }

    fn has_been_saved(&self) -> Result<bool, SuiteError> {
        Ok(self.store.has_key(&self.store_key())?)
    }

    fn emit(&self, kind: EventKind, configuration: &ExpectationConfiguration) {
        submit_event(self.events.as_ref(), kind, configuration, self.id.as_deref());
    }

    /// Persist the whole suite
    pub fn save(&self) -> Result<(), SuiteError> {
        let key = self.store_key();
        debug!("saving suite to {key}");
        self.store.update(&key, &self.to_json_dict()?)?;
        Ok(())
    }

    /// Identity of the suite, saving it first if it has never been persisted
    pub fn identifier_bundle(&self) -> Result<IdentifierBundle, SuiteError> {
        if self.id.is_none() && !self.has_been_saved()? {
            self.save()?;
        }
        Ok(self.bundle())
    }

    // ========================================================================
    // Add / delete (store-synchronized)
    // ========================================================================

    fn process_input(&self, input: ExpectationInput) -> Result<Expectation, SuiteError> {
        let mut expectation = match input {
            ExpectationInput::Expectation(expectation) => {
                if let Some(id) = expectation.id() {
                    return Err(SuiteError::AlreadyBound { id: id.to_string() });
                }
                expectation
            },
            ExpectationInput::Configuration(configuration) => Expectation::new(configuration),
            ExpectationInput::Raw(value) => {
                Expectation::new(ExpectationConfiguration::try_from(value)?)
            },
        };
        expectation.bind(self.binding());
        Ok(expectation)
    }

    /// Add an expectation
    ///
    /// A duplicate of an existing configuration is not inserted, but it is
    /// still bound to this suite, still reported as created and still
    /// returned. When the suite has been persisted, the new expectation is
    /// persisted immediately and carries the store's id.
    pub fn add_expectation(&mut self, mut expectation: Expectation) -> Result<Expectation, SuiteError> {
        if let Some(id) = expectation.id() {
            return Err(SuiteError::AlreadyBound { id: id.to_string() });
        }
        let should_save = self.has_been_saved()?;
        let is_unique = self
            .expectations
            .iter()
            .all(|existing| existing.configuration() != expectation.configuration());

        expectation.bind(self.binding());
        if is_unique {
            self.expectations.push(expectation.clone());
            if should_save {
                let suite = self.bundle();
                match self.store.add_expectation(&suite, expectation.configuration()) {
                    Ok(persisted) => {
                        let id = persisted.id().map(String::from);
                        expectation.configuration_mut().set_id(id.clone());
                        if let Some(last) = self.expectations.last_mut() {
                            last.configuration_mut().set_id(id);
                        }
                    },
                    Err(e) => {
                        debug!("rolling back add of {}", expectation.expectation_type());
                        self.expectations.pop();
                        return Err(SuiteError::Store(e));
                    },
                }
            }
        }

        self.emit(EventKind::Created, expectation.configuration());
        Ok(expectation)
    }

    /// Delete the one expectation whose configuration equals this one's
    ///
    /// When the suite has been persisted the deletion is written through; on
    /// failure the expectation is put back where it was.
    pub fn delete_expectation(&mut self, expectation: &Expectation) -> Result<Expectation, SuiteError> {
        let indexes: Vec<usize> = self
            .expectations
            .iter()
            .enumerate()
            .filter(|(_, existing)| existing.configuration() == expectation.configuration())
            .map(|(index, _)| index)
            .collect();
        let index = match indexes.as_slice() {
            [] => return Err(SuiteError::NotFound),
            [index] => *index,
            _ => return Err(SuiteError::AmbiguousMatch { count: indexes.len() }),
        };

        let should_save = self.has_been_saved()?;
        let removed = self.expectations.remove(index);
        if should_save {
            let suite = self.bundle();
            if let Err(e) = self.store.delete_expectation(&suite, removed.configuration()) {
                debug!("rolling back delete of {}", removed.expectation_type());
                self.expectations.insert(index, removed);
                return Err(SuiteError::Store(e));
            }
        }

        self.emit(EventKind::Deleted, removed.configuration());
        Ok(removed)
    }

    // ========================================================================
    // Find / remove (local)
    // ========================================================================

    /// Indexes of the expectations matching a query, in suite order
    pub fn find_expectation_indexes(&self, query: ExpectationQuery<'_>) -> Result<Vec<usize>, SuiteError> {
        if query.id.is_none() && query.configuration.is_none() {
            return Err(SuiteError::MissingCriteria);
        }
        let id = query.id.map(canonical_id);

        Ok(self
            .expectations
            .iter()
            .enumerate()
            .filter(|(_, e)| match (&id, query.configuration) {
                (Some(id), _) => e.id().is_some_and(|own| canonical_id(own) == *id),
                (None, Some(configuration)) => {
                    e.configuration().is_equivalent_to(configuration, query.match_type)
                },
                (None, None) => false,
            })
            .map(|(index, _)| index)
            .collect())
    }

    fn checked_indexes(&self, query: ExpectationQuery<'_>, allow_multiple: bool) -> Result<Vec<usize>, SuiteError> {
        let indexes = self.find_expectation_indexes(query)?;
        match indexes.len() {
            0 => Err(SuiteError::NotFound),
            1 => Ok(indexes),
            count if !allow_multiple => Err(SuiteError::AmbiguousMatch { count }),
            _ => Ok(indexes),
        }
    }

    /// Configurations of the expectations matching a query
    pub fn find_expectations(
        &self,
        query: ExpectationQuery<'_>,
        allow_multiple: bool,
    ) -> Result<Vec<ExpectationConfiguration>, SuiteError> {
        Ok(self
            .checked_indexes(query, allow_multiple)?
            .into_iter()
            .map(|index| self.expectations[index].configuration().clone())
            .collect())
    }

    /// Remove the expectations matching a query, returning their configurations
    ///
    /// The remaining expectations are rebuilt from their configurations, so
    /// rendered content and other state held only on the expectation objects
    /// is discarded. This is local only; call [`Self::save`] to persist.
    pub fn remove_expectation(
        &mut self,
        query: ExpectationQuery<'_>,
        remove_multiple_matches: bool,
    ) -> Result<Vec<ExpectationConfiguration>, SuiteError> {
        let indexes = self.checked_indexes(query, remove_multiple_matches)?;
        let mut configurations = self.expectation_configurations();

        let mut removed: Vec<ExpectationConfiguration> = indexes
            .iter()
            .rev()
            .map(|&index| configurations.remove(index))
            .collect();
        removed.reverse();

        self.expectations = configurations
            .into_iter()
            .map(|configuration| self.build_expectation(configuration))
            .collect::<Result<_, _>>()?;
        Ok(removed)
    }

    /// Remove every expectation of the given types, returning their configurations
    pub fn remove_all_expectations_of_type(&mut self, expectation_types: &[&str]) -> Vec<ExpectationConfiguration> {
        let (removed, kept): (Vec<Expectation>, Vec<Expectation>) = self
            .expectations
            .drain(..)
            .partition(|e| expectation_types.contains(&e.expectation_type()));
        self.expectations = kept;
        removed.into_iter().map(|e| e.configuration().clone()).collect()
    }

    // ========================================================================
    // Upsert (local)
    // ========================================================================

    fn build_expectation(&self, configuration: ExpectationConfiguration) -> Result<Expectation, SuiteError> {
        configuration.validate()?;
        let mut expectation = Expectation::new(configuration);
        expectation.bind(self.binding());
        Ok(expectation)
    }

    /// Insert a configuration, or replace the single one it matches
    ///
    /// A replacement keeps the persisted id of the entry it replaces. More
    /// than one match is always an error. This is local only; call
    /// [`Self::save`] to persist.
    pub fn add_expectation_configuration(
        &mut self,
        configuration: ExpectationConfiguration,
        match_type: MatchType,
        overwrite_existing: bool,
    ) -> Result<ExpectationConfiguration, SuiteError> {
        configuration.validate()?;
        let mut configuration = configuration;

        let indexes = self.find_expectation_indexes(ExpectationQuery::by_configuration(&configuration, match_type))?;
        match indexes.as_slice() {
            [] => {
                let expectation = self.build_expectation(configuration.clone())?;
                self.expectations.push(expectation);
            },
            [index] => {
                if !overwrite_existing {
                    return Err(SuiteError::AlreadyExists);
                }
                if let Some(id) = self.expectations[*index].id() {
                    configuration.set_id(Some(id.to_string()));
                }
                self.expectations[*index] = self.build_expectation(configuration.clone())?;
            },
            _ => return Err(SuiteError::AmbiguousMatch { count: indexes.len() }),
        }
        Ok(configuration)
    }

    /// Upsert several configurations, stopping at the first error
    pub fn add_expectation_configurations(
        &mut self,
        configurations: Vec<ExpectationConfiguration>,
        match_type: MatchType,
        overwrite_existing: bool,
    ) -> Result<Vec<ExpectationConfiguration>, SuiteError> {
        configurations
            .into_iter()
            .map(|configuration| self.add_expectation_configuration(configuration, match_type, overwrite_existing))
            .collect()
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Whether two suites hold equivalent expectations
    ///
    /// Name and metadata are ignored. Configurations are compared pairwise by
    /// position under [`MatchType::Success`], so the same expectations in a
    /// different order are not equivalent.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        self.expectations.len() == other.expectations.len()
            && self
                .expectations
                .iter()
                .zip(&other.expectations)
                .all(|(mine, theirs)| {
                    mine.configuration().is_equivalent_to(theirs.configuration(), MatchType::Success)
                })
    }

    // ========================================================================
    // Reporting views
    // ========================================================================

    /// Table-level configurations, cleaned for reporting
    #[must_use]
    pub fn table_expectations(&self) -> Vec<ExpectationConfiguration> {
        grouping::expectations_of_domain(&self.expectation_configurations(), DomainType::Table)
    }

    /// Single-column configurations, cleaned for reporting
    #[must_use]
    pub fn column_expectations(&self) -> Vec<ExpectationConfiguration> {
        grouping::expectations_of_domain(&self.expectation_configurations(), DomainType::Column)
    }

    /// Column-pair configurations, cleaned for reporting
    #[must_use]
    pub fn column_pair_expectations(&self) -> Vec<ExpectationConfiguration> {
        grouping::expectations_of_domain(&self.expectation_configurations(), DomainType::ColumnPair)
    }

    /// Multicolumn configurations, cleaned for reporting
    #[must_use]
    pub fn multicolumn_expectations(&self) -> Vec<ExpectationConfiguration> {
        grouping::expectations_of_domain(&self.expectation_configurations(), DomainType::Multicolumn)
    }

    /// Cleaned configurations grouped by domain type
    #[must_use]
    pub fn expectations_by_domain_type(&self) -> BTreeMap<DomainType, Vec<ExpectationConfiguration>> {
        grouping::group_by_domain_type(&self.expectation_configurations())
    }

    /// Cleaned configurations ordered by domain type, then expectation type
    #[must_use]
    pub fn expectations_ordered_by_type(&self) -> Vec<ExpectationConfiguration> {
        grouping::order_by_expectation_type(&self.expectation_configurations())
    }

    /// Configurations grouped by column, with the column reporting order
    #[must_use]
    pub fn expectations_by_column(&self, expectation_type_filter: Option<&str>) -> ColumnGrouping {
        grouping::group_by_column(&self.expectation_configurations(), expectation_type_filter)
    }

    /// Ask a renderer for content for every expectation
    ///
    /// An expectation whose render fails keeps its previous content.
    pub fn render(&mut self, renderer: &dyn Renderer) {
        for expectation in &mut self.expectations {
            match renderer.render(expectation.configuration()) {
                Ok(content) => expectation.set_rendered_content(content),
                Err(e) => warn!(
                    "rendering {} failed, keeping existing content: {e:#}",
                    expectation.expectation_type()
                ),
            }
        }
    }

    // ========================================================================
    // Citations
    // ========================================================================

    /// Append a citation to `meta["citations"]`
    pub fn add_citation(&mut self, citation: Citation) -> Result<(), SuiteError> {
        let entry = citation.into_entry(Utc::now())?;
        let citations = self
            .meta
            .entry("citations")
            .or_insert_with(|| Value::Array(Vec::new()));
        match citations {
            Value::Array(items) => {
                items.push(Value::Object(entry));
                Ok(())
            },
            other => Err(SuiteError::InvalidMeta(format!(
                "citations must be a list of mappings, got {other}"
            ))),
        }
    }

    /// Citations matching a filter
    #[must_use]
    pub fn get_citations(&self, filter: CitationFilter) -> Vec<Kwargs> {
        match self.meta.get("citations") {
            Some(Value::Array(items)) => filter.apply(items),
            _ => Vec::new(),
        }
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// The serialized document, derived from the live configurations
    #[must_use]
    pub fn to_document(&self) -> SuiteDocument {
        SuiteDocument {
            name: self.name.clone(),
            id: self.id.clone(),
            expectations: self.expectation_configurations(),
            evaluation_parameters: self.evaluation_parameters.clone(),
            meta: self.meta.clone(),
            notes: self.notes.clone(),
        }
        .canonicalized()
    }

    /// The serialized document as a JSON value
    pub fn to_json_dict(&self) -> Result<Value, SuiteError> {
        Ok(serde_json::to_value(self.to_document())?)
    }

    /// Build a suite from a serialized document
    pub fn from_document(
        document: SuiteDocument,
        store: Arc<dyn ExpectationsStore>,
    ) -> SuiteBuilder {
        let document = document.canonicalized();
        let mut builder = Self::builder(document.name, store)
            .with_expectations(document.expectations)
            .with_evaluation_parameters(document.evaluation_parameters)
            .with_meta(document.meta);
        builder.id = document.id;
        builder.notes = document.notes;
        builder
    }

    /// Build a suite from a JSON value
    pub fn from_json_value(value: Value, store: Arc<dyn ExpectationsStore>) -> Result<Self, SuiteError> {
        let document: SuiteDocument = serde_json::from_value(value)?;
        Self::from_document(document, store).build()
    }

    /// Load a persisted suite from a store
    pub fn load(name: &str, id: Option<&str>, store: Arc<dyn ExpectationsStore>) -> Result<Option<Self>, SuiteError> {
        let key = store.get_key(name, id);
        match store.get(&key)? {
            Some(value) => Self::from_json_value(value, store).map(Some),
            None => Ok(None),
        }
    }
}

impl PartialEq for ExpectationSuite {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.expectations == other.expectations
            && self.evaluation_parameters == other.evaluation_parameters
            && self.meta == other.meta
    }
}

impl Serialize for ExpectationSuite {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl std::fmt::Display for ExpectationSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string_pretty(&self.to_document()).map_err(|_| std::fmt::Error)?;
        write!(f, "{json}")
    }
}
