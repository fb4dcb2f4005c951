//! Bound expectations
//!
//! An [`Expectation`] wraps a configuration. Once a suite takes it in, the
//! suite registers itself as the expectation's update target through a
//! [`SuiteBinding`], so an in-place change can be saved on its own.

use std::sync::Arc;

use log::debug;

use super::{SuiteError, submit_event};
use crate::core::models::{ExpectationConfiguration, IdentifierBundle};
use crate::core::ports::{EventKind, EventSink, ExpectationsStore, RenderedContent};

/// The notify-on-change target of a bound expectation
#[derive(Clone)]
pub struct SuiteBinding {
    pub(crate) suite: IdentifierBundle,
    pub(crate) store: Arc<dyn ExpectationsStore>,
    pub(crate) events: Option<Arc<dyn EventSink>>,
}

impl SuiteBinding {
    /// The suite this binding saves through
    #[must_use]
    pub const fn suite(&self) -> &IdentifierBundle {
        &self.suite
    }
}

impl std::fmt::Debug for SuiteBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteBinding")
            .field("suite", &self.suite)
            .field("events", &self.events.is_some())
            .finish_non_exhaustive()
    }
}

/// An expectation configuration, optionally bound to a suite
#[derive(Debug, Clone)]
pub struct Expectation {
    configuration: ExpectationConfiguration,
    rendered_content: Option<Vec<RenderedContent>>,
    binding: Option<SuiteBinding>,
}

impl Expectation {
    /// Create a detached expectation
    #[must_use]
    pub const fn new(configuration: ExpectationConfiguration) -> Self {
        Self {
            configuration,
            rendered_content: None,
            binding: None,
        }
    }

    /// The configuration
    #[must_use]
    pub const fn configuration(&self) -> &ExpectationConfiguration {
        &self.configuration
    }

    /// Mutable configuration, for in-place changes followed by [`Self::save`]
    pub const fn configuration_mut(&mut self) -> &mut ExpectationConfiguration {
        &mut self.configuration
    }

    /// The expectation type tag
    #[must_use]
    pub fn expectation_type(&self) -> &str {
        self.configuration.expectation_type()
    }

    /// Persisted id, if any
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.configuration.id()
    }

    /// Clear the persisted id, so the expectation can be added to another suite
    pub fn clear_id(&mut self) {
        self.configuration.set_id(None);
    }

    /// Content produced by the last render
    #[must_use]
    pub fn rendered_content(&self) -> Option<&[RenderedContent]> {
        self.rendered_content.as_deref()
    }

    pub(crate) fn set_rendered_content(&mut self, content: Vec<RenderedContent>) {
        self.rendered_content = Some(content);
    }

    /// The suite binding, if bound
    #[must_use]
    pub const fn binding(&self) -> Option<&SuiteBinding> {
        self.binding.as_ref()
    }

    /// Whether a suite has taken this expectation in
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub(crate) fn bind(&mut self, binding: SuiteBinding) {
        self.binding = Some(binding);
    }

    /// Persist an in-place change through the owning suite's store
    ///
    /// The store's answer replaces the local id. An `Updated` event is
    /// submitted on success.
    pub fn save(&mut self) -> Result<(), SuiteError> {
        let binding = self.binding.as_ref().ok_or(SuiteError::NotBound)?;
        debug!(
            "saving {} in suite {}",
            self.configuration.expectation_type(),
            binding.suite
        );
        let persisted = binding.store.update_expectation(&binding.suite, &self.configuration)?;
        self.configuration.set_id(persisted.id().map(String::from));
        submit_event(
            binding.events.as_ref(),
            EventKind::Updated,
            &self.configuration,
            binding.suite.id.as_deref(),
        );
        Ok(())
    }
}

impl PartialEq for Expectation {
    fn eq(&self, other: &Self) -> bool {
        self.configuration == other.configuration
    }
}

impl From<ExpectationConfiguration> for Expectation {
    fn from(configuration: ExpectationConfiguration) -> Self {
        Self::new(configuration)
    }
}
