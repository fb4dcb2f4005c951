//! Citations - the append-only audit log kept under `meta["citations"]`

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use super::SuiteError;
use super::grouping::is_falsy;
use crate::core::models::Kwargs;

/// Storage format of `citation_date`
pub const CITATION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// When a citation was made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationDate {
    /// An exact instant
    At(DateTime<Utc>),
    /// A date string, parsed when the citation is added
    Text(String),
}

impl From<DateTime<Utc>> for CitationDate {
    fn from(at: DateTime<Utc>) -> Self {
        Self::At(at)
    }
}

impl From<&str> for CitationDate {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl CitationDate {
    fn resolve(&self) -> Result<DateTime<Utc>, SuiteError> {
        match self {
            Self::At(at) => Ok(*at),
            Self::Text(text) => parse_citation_date(text)
                .ok_or_else(|| SuiteError::InvalidCitationDate(text.clone())),
        }
    }
}

fn parse_citation_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A citation to append to a suite
///
/// Empty context fields are dropped before the citation is stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Citation {
    /// Free-form comment
    pub comment: String,
    /// When the citation was made (defaults to now)
    pub citation_date: Option<CitationDate>,
    /// The batch request the suite was built from
    pub batch_request: Option<Value>,
    /// The batch definition the suite was built from
    pub batch_definition: Option<Value>,
    /// Execution-engine batch spec
    pub batch_spec: Option<Value>,
    /// Legacy batch kwargs
    pub batch_kwargs: Option<Value>,
    /// Batch markers
    pub batch_markers: Option<Value>,
    /// Batch parameters
    pub batch_parameters: Option<Value>,
    /// Profiler configuration that produced the suite
    pub profiler_config: Option<Value>,
}

impl Citation {
    /// Create a citation with a comment
    #[must_use]
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            ..Self::default()
        }
    }

    /// Set the citation date
    #[must_use]
    pub fn with_date(mut self, date: impl Into<CitationDate>) -> Self {
        self.citation_date = Some(date.into());
        self
    }

    /// Attach the batch request
    #[must_use]
    pub fn with_batch_request(mut self, batch_request: Value) -> Self {
        self.batch_request = Some(batch_request);
        self
    }

    /// Attach the batch definition
    #[must_use]
    pub fn with_batch_definition(mut self, batch_definition: Value) -> Self {
        self.batch_definition = Some(batch_definition);
        self
    }

    /// Attach legacy batch kwargs
    #[must_use]
    pub fn with_batch_kwargs(mut self, batch_kwargs: Value) -> Self {
        self.batch_kwargs = Some(batch_kwargs);
        self
    }

    /// Attach the profiler configuration
    #[must_use]
    pub fn with_profiler_config(mut self, profiler_config: Value) -> Self {
        self.profiler_config = Some(profiler_config);
        self
    }

    /// Build the stored form, stamping `now` when no date was given
    pub(crate) fn into_entry(self, now: DateTime<Utc>) -> Result<Kwargs, SuiteError> {
        let date = match &self.citation_date {
            Some(date) => date.resolve()?,
            None => now,
        };

        let fields = [
            ("citation_date", Some(Value::String(date.format(CITATION_DATE_FORMAT).to_string()))),
            ("batch_request", self.batch_request),
            ("batch_definition", self.batch_definition),
            ("batch_spec", self.batch_spec),
            ("batch_kwargs", self.batch_kwargs),
            ("batch_markers", self.batch_markers),
            ("batch_parameters", self.batch_parameters),
            ("profiler_config", self.profiler_config),
            ("comment", Some(Value::String(self.comment))),
        ];

        Ok(fields
            .into_iter()
            .filter_map(|(key, value)| value.filter(|v| !is_falsy(v)).map(|v| (key.to_string(), v)))
            .collect())
    }
}

/// Which citations to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationFilter {
    /// Sort by `citation_date`, oldest first
    pub sort: bool,
    /// Only citations with non-empty `batch_kwargs`
    pub require_batch_kwargs: bool,
    /// Only citations with a non-empty `batch_request`
    pub require_batch_request: bool,
    /// Only citations with a non-empty `profiler_config`
    pub require_profiler_config: bool,
}

impl Default for CitationFilter {
    fn default() -> Self {
        Self {
            sort: true,
            require_batch_kwargs: false,
            require_batch_request: false,
            require_profiler_config: false,
        }
    }
}

impl CitationFilter {
    pub(crate) fn apply(self, citations: &[Value]) -> Vec<Kwargs> {
        let required: Vec<&str> = [
            (self.require_batch_kwargs, "batch_kwargs"),
            (self.require_batch_request, "batch_request"),
            (self.require_profiler_config, "profiler_config"),
        ]
        .into_iter()
        .filter_map(|(on, key)| on.then_some(key))
        .collect();

        let mut selected: Vec<Kwargs> = citations
            .iter()
            .filter_map(Value::as_object)
            .filter(|c| required.iter().all(|key| c.get(*key).is_some_and(|v| !is_falsy(v))))
            .cloned()
            .collect();

        if self.sort {
            selected.sort_by(|a, b| citation_date(a).cmp(citation_date(b)));
        }
        selected
    }
}

fn citation_date(citation: &Kwargs) -> &str {
    citation.get("citation_date").and_then(Value::as_str).unwrap_or_default()
}
