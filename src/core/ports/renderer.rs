//! Renderer port

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::models::ExpectationConfiguration;

/// One block of rendered content for an expectation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedContent {
    /// Renderer-defined content type (e.g. `string_template`)
    pub content_type: String,
    /// The rendered payload
    pub value: Value,
}

/// Turns a configuration into displayable content
pub trait Renderer: Send + Sync {
    /// Render one configuration
    fn render(&self, configuration: &ExpectationConfiguration)
    -> anyhow::Result<Vec<RenderedContent>>;
}
