//! Domain models for datasuite
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`ExpectationConfiguration`] - "Assert this about the data"
//! - [`IdentifierBundle`] - A name plus an optional persisted id
//! - [`BatchDefinition`] - One resolved batch of data
//! - [`BatchRequest`] - A query for batch definitions
//! - [`DomainType`] - Which part of a table an expectation looks at

mod batch;
pub mod catalog;
mod configuration;
mod identifiers;

pub use batch::{BatchDefinition, BatchIdentifiers, BatchParameters, BatchRequest};
pub use catalog::DomainType;
pub use configuration::{ConfigurationError, ExpectationConfiguration, Kwargs, MatchType};
pub use identifiers::{EncodedValidationData, IdentifierBundle, StoreKey, canonical_id};
