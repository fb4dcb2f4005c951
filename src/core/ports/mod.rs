//! Port traits (interfaces) for external collaborators
//!
//! These traits define the boundaries between the suite and connector engines
//! and the systems they depend on (persistence stores, telemetry, storage
//! listings, renderers, data assets).
//!
//! Implementations live in the `adapters` module.
//!
//! ## Design Principle
//!
//! The engines depend only on these traits, never on concrete
//! implementations. Collaborators are injected at construction time, so tests
//! swap in mocks and embedders swap in their own backends.

mod data_asset;
mod event_sink;
mod expectations_store;
mod key_lister;
mod renderer;

pub use data_asset::DataAsset;
pub use event_sink::{EventKind, EventSink, ExpectationEvent};
pub use expectations_store::ExpectationsStore;
pub use key_lister::KeyLister;
pub use renderer::{RenderedContent, Renderer};
