//! Data asset port

use crate::core::models::{BatchParameters, BatchRequest, IdentifierBundle};
use crate::core::services::BatchConfig;

/// A data asset that batch configurations are attached to
pub trait DataAsset: Send + Sync {
    /// Asset name
    fn name(&self) -> &str;

    /// Identity of the asset
    fn identifier_bundle(&self) -> IdentifierBundle;

    /// Identity of the datasource that owns the asset
    fn datasource_bundle(&self) -> IdentifierBundle;

    /// Build a request for batches of this asset
    fn build_batch_request(
        &self,
        options: Option<&BatchParameters>,
        batching_regex: Option<&str>,
    ) -> anyhow::Result<BatchRequest>;

    /// Persist a batch configuration attached to this asset
    fn save_batch_config(&self, config: &BatchConfig) -> anyhow::Result<()>;
}
