//! File-based expectations store
//!
//! One pretty-printed JSON document per suite, named `<suite>.json`, in a
//! single directory.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::debug;
use serde_json::Value;

use super::document;
use crate::core::models::{ExpectationConfiguration, IdentifierBundle, StoreKey};
use crate::core::ports::ExpectationsStore;

/// Expectations store backed by a directory of JSON files
#[derive(Debug, Clone)]
pub struct FileExpectationsStore {
    /// Directory holding the suite documents
    base_dir: PathBuf,
}

impl FileExpectationsStore {
    /// Create a store in the given directory
    #[must_use]
    pub const fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Directory holding the suite documents
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File for a suite; the name must be a single plain path segment
    fn path_for(&self, name: &str) -> anyhow::Result<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => {
                Ok(self.base_dir.join(format!("{name}.json")))
            },
            _ => anyhow::bail!("suite name {name:?} cannot be used as a file name"),
        }
    }

    fn read(&self, name: &str) -> anyhow::Result<Option<Value>> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write(&self, name: &str, value: &Value) -> anyhow::Result<()> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.base_dir)?;
        debug!("writing suite {name} to {}", path.display());
        fs::write(path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }

    fn read_existing(&self, suite: &IdentifierBundle) -> anyhow::Result<Value> {
        self.read(&suite.name)?
            .ok_or_else(|| anyhow::anyhow!("suite {suite} is not stored"))
    }
}

impl ExpectationsStore for FileExpectationsStore {
    fn has_key(&self, key: &StoreKey) -> anyhow::Result<bool> {
        Ok(self.path_for(key.name())?.exists())
    }

    fn get(&self, key: &StoreKey) -> anyhow::Result<Option<Value>> {
        self.read(key.name())
    }

    fn update(&self, key: &StoreKey, value: &Value) -> anyhow::Result<()> {
        self.write(key.name(), value)
    }

    fn add_expectation(
        &self,
        suite: &IdentifierBundle,
        expectation: &ExpectationConfiguration,
    ) -> anyhow::Result<ExpectationConfiguration> {
        let mut doc = self.read(&suite.name)?.unwrap_or_else(|| document::empty(&suite.name));
        let persisted = document::append(&mut doc, expectation)?;
        self.write(&suite.name, &doc)?;
        Ok(persisted)
    }

    fn update_expectation(
        &self,
        suite: &IdentifierBundle,
        expectation: &ExpectationConfiguration,
    ) -> anyhow::Result<ExpectationConfiguration> {
        let mut doc = self.read_existing(suite)?;
        let persisted = document::replace(&mut doc, expectation)?;
        self.write(&suite.name, &doc)?;
        Ok(persisted)
    }

    fn delete_expectation(
        &self,
        suite: &IdentifierBundle,
        expectation: &ExpectationConfiguration,
    ) -> anyhow::Result<()> {
        let mut doc = self.read_existing(suite)?;
        document::remove(&mut doc, expectation)?;
        self.write(&suite.name, &doc)
    }
}
