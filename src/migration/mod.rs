//! Configuration migration.
//!
//! Rewrites configuration documents written against any historical schema
//! into the current one. Migration is a total function: unknown keys and
//! wrongly typed values pass through untouched.
//!
//! # Pipeline
//!
//! Each pass over a document runs the ordered rule list from
//! [`rules::PIPELINE`], then migrates every nested document (objects and
//! documents inside arrays), then flattens nested `packageRules`. Passes
//! repeat until the document stops changing. Whether anything changed is
//! decided by comparing the final document with the input, never by
//! bookkeeping inside the rules.

mod package_rules;
mod presets;
mod rules;
mod schedule;

use serde_json::Value;

use crate::core::document::Document;
use crate::core::options;

pub use package_rules::merge_child_config;
pub use presets::PresetRenames;
pub use schedule::migrate_schedule;

/// Upper bound on full passes before giving up on reaching a fixpoint.
const MAX_PASSES: usize = 8;

/// Documents nested deeper than this are returned unchanged.
const MAX_DEPTH: usize = 32;

/// Result of migrating a document.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationResult {
    pub migrated_config: Document,
    pub is_migrated: bool,
}

/// Where a document sits relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Top-level document or a named sub-config (`major`, `lockFileMaintenance`, ...).
    Config,
    /// An entry of a `packageRules` array.
    PackageRule,
    /// An entry of a `hostRules` array.
    HostRule,
}

impl Scope {
    fn for_array(key: &str) -> Self {
        match key {
            "packageRules" => Scope::PackageRule,
            "hostRules" => Scope::HostRule,
            _ => Scope::Config,
        }
    }
}

/// Migrates configuration documents.
///
/// Holds the injected preset-rename table; everything else the engine needs
/// is static.
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    preset_renames: PresetRenames,
}

impl Migrator {
    /// Create a migrator with no preset renames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given preset-rename table for `extends` entries.
    pub fn with_preset_renames(mut self, renames: PresetRenames) -> Self {
        self.preset_renames = renames;
        self
    }

    /// The injected preset-rename table.
    pub fn preset_renames(&self) -> &PresetRenames {
        &self.preset_renames
    }

    /// Migrate `config`, resolving contextual rewrites against `parent`.
    pub fn migrate(&self, config: &Document, parent: Option<&Document>) -> MigrationResult {
        let empty = Document::new();
        let ctx = MigrationContext {
            migrator: self,
            parent: parent.unwrap_or(&empty),
            scope: Scope::Config,
            depth: 0,
        };

        let migrated_config = ctx.migrate_fully(config);
        let is_migrated = migrated_config != *config;
        if is_migrated {
            tracing::debug!("configuration migrated");
        }

        MigrationResult {
            migrated_config,
            is_migrated,
        }
    }
}

/// Migrate a document with no preset renames.
pub fn migrate_config(config: &Document, parent: Option<&Document>) -> MigrationResult {
    Migrator::new().migrate(config, parent)
}

/// State shared by the rules while one document is being migrated.
pub struct MigrationContext<'a> {
    migrator: &'a Migrator,
    parent: &'a Document,
    scope: Scope,
    depth: usize,
}

impl<'a> MigrationContext<'a> {
    /// The inherited defaults document.
    pub fn parent(&self) -> &Document {
        self.parent
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn preset_renames(&self) -> &PresetRenames {
        &self.migrator.preset_renames
    }

    fn child(&self, scope: Scope) -> MigrationContext<'a> {
        MigrationContext {
            migrator: self.migrator,
            parent: self.parent,
            scope,
            depth: self.depth + 1,
        }
    }

    /// Fully migrate a nested document in configuration scope.
    pub fn migrate_nested(&self, doc: &Document) -> Document {
        self.child(Scope::Config).migrate_fully(doc)
    }

    /// Run passes until the document stops changing.
    fn migrate_fully(&self, doc: &Document) -> Document {
        if self.depth > MAX_DEPTH {
            tracing::debug!(depth = self.depth, "configuration nested too deeply, not migrating");
            return doc.clone();
        }

        let mut current = doc.clone();
        for _ in 0..MAX_PASSES {
            let next = self.migrate_once(&current);
            if next == current {
                return next;
            }
            current = next;
        }

        tracing::debug!("configuration migration did not settle");
        current
    }

    fn migrate_once(&self, doc: &Document) -> Document {
        let mut out = doc.clone();

        for rule in rules::PIPELINE {
            if rule.applies_to(self.scope) && rule.reads().any_present(&out) {
                rule.apply(&mut out, self);
            }
        }

        self.migrate_children(&mut out);
        package_rules::flatten_nested(&mut out);

        out
    }

    fn migrate_children(&self, doc: &mut Document) {
        for (key, value) in doc.iter_mut() {
            match value {
                Value::Object(sub) if !options::is_freeform(key) => {
                    *sub = self.child(Scope::Config).migrate_fully(sub);
                }
                Value::Array(items) => {
                    let child = self.child(Scope::for_array(key));
                    for item in items.iter_mut() {
                        if let Value::Object(sub) = item {
                            *sub = child.migrate_fully(sub);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}
