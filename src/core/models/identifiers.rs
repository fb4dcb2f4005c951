//! Identifier model
//!
//! Resources are referenced by name, and once a persistence backend has seen
//! them, by an opaque id as well. A batch-resolution target is addressed by
//! three such identities: datasource, asset and batch definition.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named resource with an optional backend-assigned id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifierBundle {
    /// Resource name
    pub name: String,

    /// Id assigned by the persistence backend, if the resource was persisted
    #[serde(default)]
    pub id: Option<String>,
}

impl IdentifierBundle {
    /// Create a new bundle
    #[must_use]
    pub fn new(name: impl Into<String>, id: Option<String>) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    /// Create a bundle for a resource that has not been persisted
    #[must_use]
    pub fn unsaved(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }
}

impl std::fmt::Display for IdentifierBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} ({id})", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Composite key identifying a batch-resolution target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodedValidationData {
    /// The datasource that owns the asset
    pub datasource: IdentifierBundle,

    /// The data asset the batch definition reads from
    pub asset: IdentifierBundle,

    /// The named batch definition
    pub batch_definition: IdentifierBundle,
}

/// Key under which an expectations store files a suite
///
/// Produced by the store itself (`ExpectationsStore::get_key`), so callers
/// never build one from raw parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey(IdentifierBundle);

impl StoreKey {
    /// Create a key for a suite name and optional id
    #[must_use]
    pub fn new(name: impl Into<String>, id: Option<&str>) -> Self {
        Self(IdentifierBundle::new(name, id.map(String::from)))
    }

    /// The suite name this key refers to
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The suite id this key refers to, if any
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.id.as_deref()
    }

    /// The key as an identifier bundle
    #[must_use]
    pub const fn bundle(&self) -> &IdentifierBundle {
        &self.0
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "expectations/{}", self.0)
    }
}

/// Normalize an id to its canonical string form
///
/// Ids that parse as UUIDs (braced, simple, urn or uppercase forms) come back
/// lowercase and hyphenated. Anything else is returned unchanged.
#[must_use]
pub fn canonical_id(raw: &str) -> String {
    Uuid::parse_str(raw.trim()).map_or_else(|_| raw.to_string(), |uuid| uuid.to_string())
}
