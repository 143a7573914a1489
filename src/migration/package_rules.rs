//! Rules that build and reshape `packageRules`.
//!
//! Several legacy shapes carried per-package or per-file settings outside of
//! `packageRules`: `packages`, `pathRules`, `packageFiles`, `depTypes` and the
//! dep-type blocks (`dependencies`, `devDependencies`, ...). They are all
//! promoted into `packageRules` entries here, and nested `packageRules` are
//! flattened after every pass.

use serde_json::Value;

use super::rules::{KeySet, MigrationRule};
use super::{MigrationContext, Scope};
use crate::core::document::{ensure_array, into_array, rename_key, take, Document};
use crate::core::options;

/// Blocks whose settings apply to one dependency type.
const DEP_TYPE_BLOCKS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "engines",
    "optionalDependencies",
    "peerDependencies",
];

/// Legacy matcher names and their `match*` replacements.
const MATCHER_RENAMES: &[(&str, &str)] = &[
    ("paths", "matchPaths"),
    ("languages", "matchLanguages"),
    ("baseBranchList", "matchBaseBranches"),
    ("managers", "matchManagers"),
    ("datasources", "matchDatasources"),
    ("depTypeList", "matchDepTypes"),
    ("packageNames", "matchPackageNames"),
    ("packagePatterns", "matchPackagePatterns"),
    ("sourceUrlPrefixes", "matchSourceUrlPrefixes"),
    ("updateTypes", "matchUpdateTypes"),
];

/// Singular matchers that become one-element `match*` lists.
const SINGULAR_MATCHERS: &[(&str, &str)] = &[
    ("packageName", "matchPackageNames"),
    ("packagePattern", "matchPackagePatterns"),
];

/// Merge `child` over `parent`.
///
/// Child values win. Objects present on both sides are merged one level
/// deep, and arrays of mergeable options are concatenated parent-first.
pub fn merge_child_config(parent: &Document, child: &Document) -> Document {
    let mut merged = parent.clone();
    for (key, child_value) in child {
        let combined = match (merged.get(key), child_value) {
            (Some(Value::Array(p)), Value::Array(c)) if options::is_mergeable(key) => {
                Value::Array(p.iter().chain(c).cloned().collect())
            }
            (Some(Value::Object(p)), Value::Object(c)) => {
                let mut obj = p.clone();
                for (k, v) in c {
                    obj.insert(k.clone(), v.clone());
                }
                Value::Object(obj)
            }
            _ => child_value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}

/// Replace every `packageRules` entry carrying its own `packageRules` array
/// with its sub-rules merged over it.
pub fn flatten_nested(doc: &mut Document) {
    let Some(Value::Array(rules)) = doc.get_mut("packageRules") else {
        return;
    };
    let nested = rules
        .iter()
        .any(|rule| rule.get("packageRules").is_some_and(Value::is_array));
    if !nested {
        return;
    }

    let mut flattened = Vec::with_capacity(rules.len());
    for rule in rules.drain(..) {
        let Value::Object(mut container) = rule else {
            flattened.push(rule);
            continue;
        };
        match take(&mut container, "packageRules") {
            Some(Value::Array(children)) if !children.is_empty() => {
                tracing::debug!(count = children.len(), "flattening nested packageRules");
                for child in children {
                    match child {
                        Value::Object(child) => {
                            flattened.push(Value::Object(merge_child_config(&container, &child)));
                        }
                        other => flattened.push(other),
                    }
                }
            }
            Some(Value::Array(_)) => flattened.push(Value::Object(container)),
            Some(other) => {
                container.insert("packageRules".into(), other);
                flattened.push(Value::Object(container));
            }
            None => flattened.push(Value::Object(container)),
        }
    }
    *rules = flattened;
}

/// Put `new_rules` in front of the existing `packageRules`.
///
/// A non-array `packageRules` other than `null` is kept as the first existing
/// entry. When there is no `packageRules` yet, the promoted list takes over
/// the position of `legacy_key`.
fn prepend_rules(doc: &mut Document, legacy_key: &str, new_rules: Vec<Value>) {
    if doc.contains_key("packageRules") {
        take(doc, legacy_key);
        let Some(existing) = doc.get_mut("packageRules") else {
            return;
        };
        let tail = match existing.take() {
            Value::Null => Vec::new(),
            other => into_array(other),
        };
        let mut rules = new_rules;
        rules.extend(tail);
        *existing = Value::Array(rules);
    } else {
        doc.insert(legacy_key.to_string(), Value::Array(new_rules));
        rename_key(doc, legacy_key, "packageRules");
    }
}

/// Append `new_rules` to `packageRules`, creating it if needed.
fn append_rules(doc: &mut Document, new_rules: Vec<Value>) {
    if new_rules.is_empty() {
        return;
    }
    ensure_array(doc, "packageRules").extend(new_rules);
}

fn string_list(item: &str) -> Value {
    Value::Array(vec![Value::String(item.to_string())])
}

pub struct PathRules;

impl MigrationRule for PathRules {
    fn name(&self) -> &'static str {
        "path-rules"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["pathRules"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["packageRules"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        match doc.get_mut("pathRules").map(Value::take) {
            Some(Value::Array(rules)) => prepend_rules(doc, "pathRules", rules),
            _ => {
                take(doc, "pathRules");
            }
        }
    }
}

pub struct Packages;

impl MigrationRule for Packages {
    fn name(&self) -> &'static str {
        "packages"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["packages"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["packageRules"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        match doc.get_mut("packages").map(Value::take) {
            Some(value @ (Value::Array(_) | Value::Object(_))) => {
                prepend_rules(doc, "packages", into_array(value));
            }
            _ => {
                take(doc, "packages");
            }
        }
    }
}

pub struct PackageFiles;

impl MigrationRule for PackageFiles {
    fn name(&self) -> &'static str {
        "package-files"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["packageFiles"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["packageRules", "includePaths"])
    }
    fn apply(&self, doc: &mut Document, ctx: &MigrationContext<'_>) {
        let Some(Value::Array(files)) = doc.get("packageFiles") else {
            return;
        };
        let files = files.clone();

        let mut paths = Vec::new();
        let mut promoted = Vec::new();
        for entry in files {
            let per_file = match entry {
                Value::String(path) => {
                    paths.push(path);
                    continue;
                }
                Value::Object(per_file) => per_file,
                _ => continue,
            };
            let Some(path) = per_file.get("packageFile").and_then(Value::as_str) else {
                continue;
            };
            let path = path.to_string();
            paths.push(path.clone());
            if per_file.len() < 2 {
                continue;
            }

            let mut payload = ctx.migrate_nested(&per_file);
            take(&mut payload, "packageFile");
            if let Some(Value::Array(rules)) = take(&mut payload, "packageRules") {
                for rule in rules {
                    if let Value::Object(mut rule) = rule {
                        rule.insert("matchPaths".into(), string_list(&path));
                        promoted.push(Value::Object(rule));
                    }
                }
            }
            if !payload.is_empty() {
                payload.insert("matchPaths".into(), string_list(&path));
                promoted.push(Value::Object(payload));
            }
        }

        take(doc, "packageFiles");
        let include = ensure_array(doc, "includePaths");
        for path in paths {
            let path = Value::String(path);
            if !include.contains(&path) {
                include.push(path);
            }
        }
        append_rules(doc, promoted);
    }
}

pub struct DepTypesList;

impl MigrationRule for DepTypesList {
    fn name(&self) -> &'static str {
        "dep-types"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["depTypes"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["packageRules"])
    }
    fn apply(&self, doc: &mut Document, ctx: &MigrationContext<'_>) {
        let Some(Value::Array(dep_types)) = take(doc, "depTypes") else {
            return;
        };

        let mut promoted = Vec::new();
        for entry in dep_types {
            let Value::Object(entry) = entry else {
                continue;
            };
            let Some(name) = entry.get("depType").and_then(Value::as_str) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            let name = name.to_string();

            let mut rule = ctx.migrate_nested(&entry);
            take(&mut rule, "depType");
            rule.insert("matchDepTypes".into(), string_list(&name));
            promoted.push(Value::Object(rule));
        }
        append_rules(doc, promoted);
    }
}

pub struct DepTypeBlocks;

impl MigrationRule for DepTypeBlocks {
    fn name(&self) -> &'static str {
        "dep-type-blocks"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(DEP_TYPE_BLOCKS)
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["packageRules"])
    }
    fn apply(&self, doc: &mut Document, ctx: &MigrationContext<'_>) {
        let mut promoted = Vec::new();
        for dep_type in DEP_TYPE_BLOCKS {
            if !doc.get(*dep_type).is_some_and(Value::is_object) {
                continue;
            }
            let Some(Value::Object(block)) = take(doc, dep_type) else {
                continue;
            };
            let mut rule = ctx.migrate_nested(&block);
            rule.insert("matchDepTypes".into(), string_list(dep_type));
            promoted.push(Value::Object(rule));
        }
        append_rules(doc, promoted);
    }
}

pub struct MatcherRenames;

impl MigrationRule for MatcherRenames {
    fn name(&self) -> &'static str {
        "matcher-renames"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&[
            "paths",
            "languages",
            "baseBranchList",
            "managers",
            "datasources",
            "depTypeList",
            "packageNames",
            "packagePatterns",
            "sourceUrlPrefixes",
            "updateTypes",
            "packageName",
            "packagePattern",
        ])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&[
            "matchPaths",
            "matchLanguages",
            "matchBaseBranches",
            "matchManagers",
            "matchDatasources",
            "matchDepTypes",
            "matchPackageNames",
            "matchPackagePatterns",
            "matchSourceUrlPrefixes",
            "matchUpdateTypes",
        ])
    }
    fn applies_to(&self, scope: Scope) -> bool {
        scope == Scope::PackageRule
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        for (legacy, current) in MATCHER_RENAMES {
            rename_key(doc, legacy, current);
        }

        for (legacy, current) in SINGULAR_MATCHERS {
            if !doc.contains_key(*legacy) {
                continue;
            }
            if doc.contains_key(*current) {
                let Some(value) = take(doc, legacy) else {
                    continue;
                };
                if let Some(existing) = doc.get_mut(*current) {
                    let mut items = into_array(existing.take());
                    if !items.contains(&value) {
                        items.push(value);
                    }
                    *existing = Value::Array(items);
                }
            } else {
                rename_key(doc, legacy, current);
                if let Some(value) = doc.get_mut(*current) {
                    *value = Value::Array(into_array(value.take()));
                }
            }
        }
    }
}
