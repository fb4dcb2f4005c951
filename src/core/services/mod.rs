//! Business logic services
//!
//! Orchestration logic over the domain models. Storage, listing and
//! telemetry are reached only through the traits in [`crate::core::ports`].
//!
//! - [`suite`] - Manage expectation suites
//! - [`matcher`] - Extract batch identifiers from storage keys
//! - [`sorter`] - Order batch definitions
//! - [`connector`] - Resolve listings into batch definitions
//! - [`batch_config`] - Named batch configurations of a data asset

pub mod batch_config;
pub mod connector;
pub mod matcher;
pub mod sorter;
pub mod suite;

pub use batch_config::{BatchConfig, BatchConfigError};
pub use connector::{
    AssetDefinition, AssetReport, ConnectorError, ConnectorReport, DataConnector, DataConnectorBuilder,
    sanitize_prefix,
};
pub use matcher::{BatchingRegex, MatchError, WHOLE_PATH_IDENTIFIER};
pub use sorter::{SortError, SortKind, SortOrder, Sorter, sort_batch_definitions};
pub use suite::{
    Citation, CitationDate, CitationFilter, ColumnGrouping, Expectation, ExpectationInput, ExpectationQuery,
    ExpectationSuite, Notes, SuiteBinding, SuiteBuilder, SuiteDocument, SuiteError, VERSION_META_KEY,
};
