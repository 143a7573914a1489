//! Core data structures for freshen.
//!
//! This module contains the foundational types used throughout freshen:
//! - Configuration documents and the helpers rules use to edit them
//! - The option schema (types, renames, removals)
//! - Release lists returned by datasources

pub mod document;
pub mod options;
pub mod release;

pub use document::Document;
pub use options::{OptionSchemaEntry, OptionStatus, OptionType};
pub use release::{Release, ReleaseResult};
