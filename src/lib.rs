//! freshen - dependency update automation
//!
//! This crate provides the core library functionality for freshen:
//! migrating legacy configuration documents to the current schema and
//! looking up dependency releases across one or more registries.

// The configuration fixtures are large `json!` literals.
#![recursion_limit = "256"]

pub mod core;
pub mod datasource;
pub mod migration;
pub mod ops;
pub mod util;

/// Test utilities and mocks for freshen unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted datasource, log capture and
/// configuration fixtures.
#[cfg(test)]
pub mod test_support;

pub use crate::core::document::Document;
pub use crate::core::release::{Release, ReleaseResult};
pub use datasource::{Datasource, DatasourceRegistry, GetPkgReleasesConfig, RegistryStrategy};
pub use migration::{migrate_config, MigrationResult, Migrator};
pub use util::context::GlobalContext;
