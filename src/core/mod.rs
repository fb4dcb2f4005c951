//! Core domain logic for datasuite
//!
//! This module contains the suite and connector engines. All external
//! interactions (persistence, telemetry, storage listings, rendering) are
//! abstracted through port traits.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (configurations, identifiers, batches)
//! - `services/` - The suite and connector engines
//! - `ports/` - Trait definitions for external collaborators

pub mod models;
pub mod ports;
pub mod services;
