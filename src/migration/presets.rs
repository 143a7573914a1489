//! `extends` normalization and preset renames.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::rules::{KeySet, MigrationRule};
use super::MigrationContext;
use crate::core::document::{into_array, take, Document};

/// Built-in aliases for renamed presets, keyed by their `:` form.
const PRESET_ALIASES: &[(&str, &str)] = &[
    (":js-app", "config:js-app"),
    ("config:application", "config:js-app"),
    (":library", "config:js-lib"),
    ("config:library", "config:js-lib"),
    (":unpublishSafe", "npm:unpublishSafe"),
    (":automergeBranchMergeCommit", ":automergeBranch"),
    (":automergeBranchPush", ":automergeBranch"),
];

/// Preset references that already enable unpublish safety.
const UNPUBLISH_SAFE_PRESETS: &[&str] =
    &[":unpublishSafe", "default:unpublishSafe", "npm:unpublishSafe"];

const UNPUBLISH_SAFE_PRESET: &str = "npm:unpublishSafe";

/// Rewrite a built-in preset alias, returning `None` when `preset` is not one.
fn builtin_alias(preset: &str) -> Option<String> {
    let key = match preset.strip_prefix("default:") {
        Some(rest) => format!(":{rest}"),
        None => preset.to_string(),
    };

    if let Some((_, to)) = PRESET_ALIASES.iter().find(|(from, _)| *from == key) {
        return Some((*to).to_string());
    }
    key.strip_prefix(":masterIssue")
        .map(|rest| format!(":dependencyDashboard{rest}"))
}

/// User-supplied preset renames.
///
/// Keys are matched exactly. A rename to the empty string removes the
/// preset reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetRenames {
    renames: HashMap<String, String>,
}

impl PresetRenames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rename, replacing any earlier one for `from`.
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.renames.insert(from.into(), to.into());
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    /// Merge `other` into `self`; entries in `other` win.
    pub fn extend(&mut self, other: PresetRenames) {
        self.renames.extend(other.renames);
    }

    /// Resolve `preset` through the rename chain.
    ///
    /// Returns an empty string when the preset should be removed. A chain
    /// that loops back on itself leaves the preset unchanged.
    pub fn resolve(&self, preset: &str) -> String {
        let mut current = preset;
        let mut seen = HashSet::new();
        while let Some(next) = self.renames.get(current) {
            if !seen.insert(current) {
                tracing::debug!(preset, "preset rename cycle, leaving preset unchanged");
                return preset.to_string();
            }
            if next.is_empty() {
                return String::new();
            }
            current = next;
        }
        current.to_string()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PresetRenames {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut renames = PresetRenames::new();
        for (from, to) in iter {
            renames.insert(from, to);
        }
        renames
    }
}

impl From<HashMap<String, String>> for PresetRenames {
    fn from(renames: HashMap<String, String>) -> Self {
        PresetRenames { renames }
    }
}

/// Normalize one preset reference. `None` means the reference is dropped.
fn migrate_preset(preset: &str, renames: &PresetRenames) -> Option<String> {
    let preset = builtin_alias(preset).unwrap_or_else(|| preset.to_string());
    let resolved = renames.resolve(&preset);
    (!resolved.is_empty()).then_some(resolved)
}

pub struct Extends;

impl MigrationRule for Extends {
    fn name(&self) -> &'static str {
        "extends"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["extends"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["extends"])
    }
    fn apply(&self, doc: &mut Document, ctx: &MigrationContext<'_>) {
        let Some(value) = doc.get_mut("extends") else {
            return;
        };
        if !(value.is_string() || value.is_array()) {
            return;
        }

        let presets = into_array(value.take())
            .into_iter()
            .filter_map(|item| match item {
                Value::String(preset) => {
                    migrate_preset(&preset, ctx.preset_renames()).map(Value::String)
                }
                other => Some(other),
            })
            .collect();
        *value = Value::Array(presets);
    }
}

pub struct UnpublishSafe;

impl MigrationRule for UnpublishSafe {
    fn name(&self) -> &'static str {
        "unpublish-safe"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["unpublishSafe"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["extends"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        // A malformed `extends` is left for the user to fix, flag included.
        if doc
            .get("extends")
            .is_some_and(|v| !(v.is_string() || v.is_array()))
        {
            return;
        }
        if take(doc, "unpublishSafe") != Some(Value::Bool(true)) {
            return;
        }

        let extends = doc
            .entry("extends")
            .or_insert_with(|| Value::Array(Vec::new()));
        let mut presets = into_array(extends.take());
        let enabled = presets
            .iter()
            .filter_map(Value::as_str)
            .any(|p| UNPUBLISH_SAFE_PRESETS.contains(&p));
        if !enabled {
            presets.push(Value::String(UNPUBLISH_SAFE_PRESET.into()));
        }
        *extends = Value::Array(presets);
    }
}
