//! Expectations store port
//!
//! Defines the interface for persisting suites and their expectations.

use serde_json::Value;

use crate::core::models::{ExpectationConfiguration, IdentifierBundle, StoreKey};

/// Persistence backend for expectation suites
///
/// The store is shared: other actors may write to it between two calls, so
/// the engines never assume exclusive access. Errors are implementation
/// defined and are propagated unchanged.
pub trait ExpectationsStore: Send + Sync {
    /// Build the key under which a suite is filed
    fn get_key(&self, name: &str, id: Option<&str>) -> StoreKey {
        StoreKey::new(name, id)
    }

    /// Whether a suite has been persisted under this key
    fn has_key(&self, key: &StoreKey) -> anyhow::Result<bool>;

    /// Load a persisted suite document
    fn get(&self, key: &StoreKey) -> anyhow::Result<Option<Value>>;

    /// Persist a whole suite document
    fn update(&self, key: &StoreKey, value: &Value) -> anyhow::Result<()>;

    /// Persist a new expectation of a suite
    ///
    /// Returns the configuration as persisted, carrying its assigned id.
    fn add_expectation(
        &self,
        suite: &IdentifierBundle,
        expectation: &ExpectationConfiguration,
    ) -> anyhow::Result<ExpectationConfiguration>;

    /// Persist an in-place change to an expectation of a suite
    fn update_expectation(
        &self,
        suite: &IdentifierBundle,
        expectation: &ExpectationConfiguration,
    ) -> anyhow::Result<ExpectationConfiguration>;

    /// Remove an expectation from a persisted suite
    fn delete_expectation(
        &self,
        suite: &IdentifierBundle,
        expectation: &ExpectationConfiguration,
    ) -> anyhow::Result<()>;
}
