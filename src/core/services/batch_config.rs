//! Batch configurations - named, saved batch definitions on a data asset

use std::sync::Arc;

use thiserror::Error;

use crate::core::models::{BatchParameters, BatchRequest, EncodedValidationData, IdentifierBundle};
use crate::core::ports::DataAsset;

/// Errors from batch configuration operations
#[derive(Debug, Error)]
pub enum BatchConfigError {
    /// The configuration is not attached to a data asset
    #[error("batch config `{0}` is not attached to a data asset")]
    Detached(String),

    /// The data asset failed
    #[error(transparent)]
    Asset(#[from] anyhow::Error),
}

/// A named way of requesting batches from one data asset
#[derive(Clone)]
pub struct BatchConfig {
    name: String,
    id: Option<String>,
    batching_regex: Option<String>,
    data_asset: Option<Arc<dyn DataAsset>>,
}

impl std::fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchConfig")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("batching_regex", &self.batching_regex)
            .field("data_asset", &self.data_asset.as_ref().map(|a| a.name().to_string()))
            .finish()
    }
}

impl BatchConfig {
    /// Create a detached configuration
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            batching_regex: None,
            data_asset: None,
        }
    }

    /// Set the persisted id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the pattern requests are built with
    #[must_use]
    pub fn with_batching_regex(mut self, batching_regex: impl Into<String>) -> Self {
        self.batching_regex = Some(batching_regex.into());
        self
    }

    /// Attach to a data asset
    pub fn set_data_asset(&mut self, data_asset: Arc<dyn DataAsset>) {
        self.data_asset = Some(data_asset);
    }

    /// Configuration name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Persisted id, if any
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The pattern requests are built with
    #[must_use]
    pub fn batching_regex(&self) -> Option<&str> {
        self.batching_regex.as_deref()
    }

    fn asset(&self) -> Result<&Arc<dyn DataAsset>, BatchConfigError> {
        self.data_asset
            .as_ref()
            .ok_or_else(|| BatchConfigError::Detached(self.name.clone()))
    }

    /// Build a batch request through the attached asset
    pub fn build_batch_request(
        &self,
        batch_parameters: Option<&BatchParameters>,
    ) -> Result<BatchRequest, BatchConfigError> {
        let asset = self.asset()?;
        Ok(asset.build_batch_request(batch_parameters, self.batching_regex.as_deref())?)
    }

    /// Persist through the attached asset
    pub fn save(&self) -> Result<(), BatchConfigError> {
        self.asset()?.save_batch_config(self)?;
        Ok(())
    }

    /// Identities of the datasource, asset and this configuration
    pub fn identifier_bundle(&self) -> Result<EncodedValidationData, BatchConfigError> {
        let asset = self.asset()?;
        Ok(EncodedValidationData {
            datasource: asset.datasource_bundle(),
            asset: asset.identifier_bundle(),
            batch_definition: IdentifierBundle::new(self.name.clone(), self.id.clone()),
        })
    }
}
