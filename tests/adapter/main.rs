//! Adapter tests
//!
//! Tests for I/O adapter implementations:
//! - File-backed expectations store
//! - Filesystem key lister

mod file_store_test;
mod filesystem_test;
