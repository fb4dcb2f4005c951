//! Adapter implementations for port traits
//!
//! This module contains concrete implementations that handle I/O:
//!
//! - `memory` - In-process expectations store and key lister
//! - `file` - JSON-file expectations store, one file per suite
//! - `filesystem` - Key lister over a local directory tree
//! - `telemetry` - Event sinks that log or discard expectation events

mod document;
pub mod file;
pub mod filesystem;
pub mod memory;
pub mod telemetry;

pub use file::FileExpectationsStore;
pub use filesystem::FilesystemKeyLister;
pub use memory::{InMemoryExpectationsStore, StaticKeyLister};
pub use telemetry::{LogEventSink, NullEventSink};
