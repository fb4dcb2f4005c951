//! Telemetry sink port

use serde::Serialize;

/// What happened to an expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Added to a suite
    Created,
    /// Modified in place and saved
    Updated,
    /// Removed from a suite
    Deleted,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "expectation.created"),
            Self::Updated => write!(f, "expectation.updated"),
            Self::Deleted => write!(f, "expectation.deleted"),
        }
    }
}

/// A lifecycle event for one expectation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectationEvent {
    /// What happened
    pub kind: EventKind,
    /// Persisted id of the expectation, if any
    pub expectation_id: Option<String>,
    /// Persisted id of the owning suite, if any
    pub expectation_suite_id: Option<String>,
    /// The expectation type tag
    pub expectation_type: String,
}

/// Fire-and-forget receiver of expectation events
///
/// Errors returned here are logged by the engines and never surface.
pub trait EventSink: Send + Sync {
    /// Submit one event
    fn submit(&self, event: &ExpectationEvent) -> anyhow::Result<()>;
}
