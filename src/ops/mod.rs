//! High-level operations.
//!
//! This module contains the implementation of freshen commands.

pub mod migrate;
pub mod releases;

pub use migrate::{
    changed_options, migrate, ConfigFile, ConfigFormat, MigrateOptions, MigrateOutcome,
};
pub use releases::{format_releases, lookup_releases, ReleasesOptions};
