//! In-process adapters
//!
//! Useful for embedding and for tests: nothing touches the filesystem.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use serde_json::Value;

use super::document;
use crate::core::models::{ExpectationConfiguration, IdentifierBundle, StoreKey};
use crate::core::ports::{ExpectationsStore, KeyLister};

/// Expectations store that keeps suite documents in memory, keyed by suite name
#[derive(Debug, Default)]
pub struct InMemoryExpectationsStore {
    documents: Mutex<HashMap<String, Value>>,
    fail_next_add: AtomicBool,
    fail_next_delete: AtomicBool,
}

impl InMemoryExpectationsStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `add_expectation` call fail
    pub fn fail_next_add(&self) {
        self.fail_next_add.store(true, Ordering::SeqCst);
    }

    /// Make the next `delete_expectation` call fail
    pub fn fail_next_delete(&self) {
        self.fail_next_delete.store(true, Ordering::SeqCst);
    }

    /// Names of the stored suites, sorted
    pub fn suite_names(&self) -> anyhow::Result<Vec<String>> {
        let documents = self.lock()?;
        let mut names: Vec<String> = documents.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, HashMap<String, Value>>> {
        self.documents
            .lock()
            .map_err(|_| anyhow::anyhow!("expectations store lock poisoned"))
    }
}

impl ExpectationsStore for InMemoryExpectationsStore {
    fn has_key(&self, key: &StoreKey) -> anyhow::Result<bool> {
        Ok(self.lock()?.contains_key(key.name()))
    }

    fn get(&self, key: &StoreKey) -> anyhow::Result<Option<Value>> {
        Ok(self.lock()?.get(key.name()).cloned())
    }

    fn update(&self, key: &StoreKey, value: &Value) -> anyhow::Result<()> {
        debug!("storing {key} in memory");
        self.lock()?.insert(key.name().to_string(), value.clone());
        Ok(())
    }

    fn add_expectation(
        &self,
        suite: &IdentifierBundle,
        expectation: &ExpectationConfiguration,
    ) -> anyhow::Result<ExpectationConfiguration> {
        if self.fail_next_add.swap(false, Ordering::SeqCst) {
            anyhow::bail!("simulated failure adding to suite {suite}");
        }
        let mut documents = self.lock()?;
        let doc = documents
            .entry(suite.name.clone())
            .or_insert_with(|| document::empty(&suite.name));
        document::append(doc, expectation)
    }

    fn update_expectation(
        &self,
        suite: &IdentifierBundle,
        expectation: &ExpectationConfiguration,
    ) -> anyhow::Result<ExpectationConfiguration> {
        let mut documents = self.lock()?;
        let Some(doc) = documents.get_mut(&suite.name) else {
            anyhow::bail!("suite {suite} is not stored");
        };
        document::replace(doc, expectation)
    }

    fn delete_expectation(
        &self,
        suite: &IdentifierBundle,
        expectation: &ExpectationConfiguration,
    ) -> anyhow::Result<()> {
        if self.fail_next_delete.swap(false, Ordering::SeqCst) {
            anyhow::bail!("simulated failure deleting from suite {suite}");
        }
        let mut documents = self.lock()?;
        let Some(doc) = documents.get_mut(&suite.name) else {
            anyhow::bail!("suite {suite} is not stored");
        };
        document::remove(doc, expectation)
    }
}

/// Key lister over a fixed set of keys
#[derive(Debug, Clone, Default)]
pub struct StaticKeyLister {
    keys: Vec<String>,
}

impl StaticKeyLister {
    /// Serve these keys, in this order
    #[must_use]
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl KeyLister for StaticKeyLister {
    fn list_keys(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        Ok(self.keys.iter().filter(|k| k.starts_with(prefix)).cloned().collect())
    }
}
