//! bytecode-diff-core
//!
//! Core library for checking that a library compiled once per target-platform version produces
//! consistent bytecode across every version.
//!
//! This crate defines the record model, the symbol extractor and record builder, the rolling
//! diff engine and sanity checker, plus the configuration, on-disk layout, and external tool
//! adapters that the orchestrating [`services::runner::VerificationRunner`] drives.
//!
//! All substantive logic lives here so it is fully testable and reusable from multiple frontends.

pub mod analysis;
pub mod config;
pub mod layout;
pub mod model;
pub mod services;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
