//! Event sinks

use log::info;

use crate::core::ports::{EventSink, ExpectationEvent};

/// Writes every expectation event to the log at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn submit(&self, event: &ExpectationEvent) -> anyhow::Result<()> {
        info!(
            "{} {} (expectation: {}, suite: {})",
            event.kind,
            event.expectation_type,
            event.expectation_id.as_deref().unwrap_or("-"),
            event.expectation_suite_id.as_deref().unwrap_or("-"),
        );
        Ok(())
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn submit(&self, _event: &ExpectationEvent) -> anyhow::Result<()> {
        Ok(())
    }
}
