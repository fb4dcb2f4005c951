//! Expectation configuration model
//!
//! An expectation configuration declares one assertion about a batch of data:
//! a type tag plus the kwargs that parameterize it. Configurations are value
//! objects; identity (`id`) is only attached once a store has persisted them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::catalog::{self, DomainType, RUNTIME_KWARGS};
use super::identifiers::canonical_id;

/// Parameter mapping of an expectation (declaration order is preserved)
pub type Kwargs = serde_json::Map<String, Value>;

/// Errors raised while building or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The type tag was empty
    #[error("expectation_type must be a non-empty string")]
    MissingType,

    /// A catalogued type is missing a kwarg that names its domain
    #[error("{expectation_type} requires the `{kwarg}` kwarg")]
    MissingDomainKwarg {
        /// The expectation type being built
        expectation_type: String,
        /// The missing kwarg
        kwarg: &'static str,
    },

    /// The raw input did not have the configuration shape
    #[error("malformed expectation configuration: {0}")]
    Malformed(String),
}

/// Which kwargs take part in an equivalence comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Only the kwargs that identify the evaluated data
    #[default]
    Domain,
    /// Domain kwargs plus those that decide pass/fail
    Success,
    /// Every kwarg
    Runtime,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Domain => write!(f, "domain"),
            Self::Success => write!(f, "success"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

impl std::str::FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "domain" => Ok(Self::Domain),
            "success" => Ok(Self::Success),
            "runtime" => Ok(Self::Runtime),
            _ => Err(format!("Invalid match type: {s}. Use: domain, success, runtime")),
        }
    }
}

/// Serialized shape of a configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawConfiguration {
    expectation_type: String,
    #[serde(default)]
    kwargs: Kwargs,
    #[serde(default)]
    meta: Kwargs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

/// A single expectation: a type tag and its kwargs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawConfiguration", into = "RawConfiguration")]
pub struct ExpectationConfiguration {
    expectation_type: String,
    kwargs: Kwargs,
    meta: Kwargs,
    id: Option<String>,

    /// Resolved from the catalog (or the kwargs) whenever the kwargs change
    domain_type: DomainType,
}

impl ExpectationConfiguration {
    /// Create a validated configuration
    pub fn new(
        expectation_type: impl Into<String>,
        kwargs: Kwargs,
    ) -> Result<Self, ConfigurationError> {
        let expectation_type = expectation_type.into();
        let domain_type = resolve_domain_type(&expectation_type, &kwargs);
        let configuration = Self {
            expectation_type,
            kwargs,
            meta: Kwargs::new(),
            id: None,
            domain_type,
        };
        configuration.validate()?;
        Ok(configuration)
    }

    /// Attach metadata (not part of equality or equivalence)
    #[must_use]
    pub fn with_meta(mut self, meta: Kwargs) -> Self {
        self.meta = meta;
        self
    }

    /// Attach a persisted id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Check the configuration can be turned into an expectation
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.expectation_type.trim().is_empty() {
            return Err(ConfigurationError::MissingType);
        }
        if let Some(kind) = catalog::lookup(&self.expectation_type) {
            for kwarg in kind.domain_type.identifying_kwargs() {
                if !self.kwargs.contains_key(*kwarg) {
                    return Err(ConfigurationError::MissingDomainKwarg {
                        expectation_type: self.expectation_type.clone(),
                        kwarg,
                    });
                }
            }
        }
        Ok(())
    }

    /// The expectation type tag
    #[must_use]
    pub fn expectation_type(&self) -> &str {
        &self.expectation_type
    }

    /// All kwargs, in declaration order
    #[must_use]
    pub const fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    /// A single kwarg
    #[must_use]
    pub fn kwarg(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }

    /// Set a kwarg, returning the previous value
    pub fn set_kwarg(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let previous = self.kwargs.insert(name.into(), value);
        self.refresh_domain_type();
        previous
    }

    /// Remove a kwarg, returning its value
    pub fn remove_kwarg(&mut self, name: &str) -> Option<Value> {
        let removed = self.kwargs.shift_remove(name);
        self.refresh_domain_type();
        removed
    }

    /// Replace every kwarg
    pub fn replace_kwargs(&mut self, kwargs: Kwargs) {
        self.kwargs = kwargs;
        self.refresh_domain_type();
    }

    /// Free-form metadata
    #[must_use]
    pub const fn meta(&self) -> &Kwargs {
        &self.meta
    }

    /// Mutable metadata
    pub const fn meta_mut(&mut self) -> &mut Kwargs {
        &mut self.meta
    }

    /// Persisted id, if any
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub(crate) fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    /// The domain this expectation evaluates
    #[must_use]
    pub const fn domain_type(&self) -> DomainType {
        self.domain_type
    }

    /// The kwargs that identify what data is evaluated
    #[must_use]
    pub fn domain_kwargs(&self) -> Kwargs {
        self.domain_type
            .domain_kwargs()
            .filter_map(|key| self.kwargs.get(key).map(|v| (key.to_string(), v.clone())))
            .collect()
    }

    /// Domain kwargs plus the kwargs that decide pass/fail
    #[must_use]
    pub fn success_kwargs(&self) -> Kwargs {
        match catalog::lookup(&self.expectation_type) {
            Some(kind) => {
                let mut kwargs = self.domain_kwargs();
                for key in kind.success_kwargs {
                    if let Some(value) = self.kwargs.get(*key) {
                        kwargs.insert((*key).to_string(), value.clone());
                    }
                }
                kwargs
            },
            None => self
                .kwargs
                .iter()
                .filter(|(key, _)| !RUNTIME_KWARGS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }

    /// The kwargs compared under a match type
    #[must_use]
    pub fn kwargs_for(&self, match_type: MatchType) -> Kwargs {
        match match_type {
            MatchType::Domain => self.domain_kwargs(),
            MatchType::Success => self.success_kwargs(),
            MatchType::Runtime => self.kwargs.clone(),
        }
    }

    /// Whether two configurations target the same thing under a match type
    ///
    /// `other` may be partial: kwargs absent on both sides compare equal.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self, match_type: MatchType) -> bool {
        self.expectation_type == other.expectation_type
            && self.kwargs_for(match_type) == other.kwargs_for(match_type)
    }

    /// Names of evaluation parameters referenced through `{"$PARAMETER": name}`
    #[must_use]
    pub fn evaluation_parameter_options(&self) -> Vec<String> {
        let mut names = Vec::new();
        for value in self.kwargs.values() {
            collect_parameter_names(value, &mut names);
        }
        names.sort();
        names.dedup();
        names
    }

    /// JSON form of the configuration
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        serde_json::to_value(RawConfiguration::from(self.clone())).unwrap_or(Value::Null)
    }

    fn refresh_domain_type(&mut self) {
        self.domain_type = resolve_domain_type(&self.expectation_type, &self.kwargs);
    }
}

impl PartialEq for ExpectationConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.expectation_type == other.expectation_type && self.kwargs == other.kwargs
    }
}

impl TryFrom<RawConfiguration> for ExpectationConfiguration {
    type Error = ConfigurationError;

    fn try_from(raw: RawConfiguration) -> Result<Self, Self::Error> {
        let mut configuration = Self::new(raw.expectation_type, raw.kwargs)?.with_meta(raw.meta);
        configuration.id = raw.id.as_deref().map(canonical_id);
        Ok(configuration)
    }
}

impl From<ExpectationConfiguration> for RawConfiguration {
    fn from(configuration: ExpectationConfiguration) -> Self {
        Self {
            expectation_type: configuration.expectation_type,
            kwargs: configuration.kwargs,
            meta: configuration.meta,
            id: configuration.id.as_deref().map(canonical_id),
        }
    }
}

impl TryFrom<Value> for ExpectationConfiguration {
    type Error = ConfigurationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if !value.is_object() {
            return Err(ConfigurationError::Malformed(format!("expected a mapping, got {value}")));
        }
        let raw: RawConfiguration = serde_json::from_value(value)
            .map_err(|e| ConfigurationError::Malformed(e.to_string()))?;
        Self::try_from(raw)
    }
}

fn resolve_domain_type(expectation_type: &str, kwargs: &Kwargs) -> DomainType {
    catalog::lookup(expectation_type).map_or_else(|| DomainType::infer(kwargs), |k| k.domain_type)
}

fn collect_parameter_names(value: &Value, names: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(name)) = map.get("$PARAMETER") {
                names.push(name.clone());
            }
            for nested in map.values() {
                collect_parameter_names(nested, names);
            }
        },
        Value::Array(items) => {
            for item in items {
                collect_parameter_names(item, names);
            }
        },
        _ => {},
    }
}
