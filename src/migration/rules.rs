//! Migration rules and their fixed order.
//!
//! A rule rewrites a handful of top-level keys of one document. Rules never
//! look at nested documents; the engine recurses into those itself.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::package_rules::{
    DepTypeBlocks, DepTypesList, MatcherRenames, PackageFiles, Packages, PathRules,
};
use super::presets::{Extends, UnpublishSafe};
use super::schedule::Schedule;
use super::{MigrationContext, Scope};
use crate::core::document::{
    ensure_object, into_array, is_truthy, push_unique, rename_key, take, Document,
};
use crate::core::options::{self, OptionStatus, OptionType};

/// The keys a rule reads or writes.
#[derive(Debug, Clone, Copy)]
pub enum KeySet {
    /// A fixed list of option names.
    Keys(&'static [&'static str]),
    /// Every option of the given type in the schema.
    OfType(OptionType),
    /// Every deprecated option with a rename target.
    Renamed,
    /// Every obsolete option.
    Removed,
    /// Every key holding a string value.
    StringValues,
}

impl KeySet {
    /// Whether any key of this set is present in `doc`.
    pub fn any_present(&self, doc: &Document) -> bool {
        match self {
            KeySet::Keys(keys) => keys.iter().any(|k| doc.contains_key(*k)),
            KeySet::OfType(kind) => doc.keys().any(|k| options::option_type(k) == Some(*kind)),
            KeySet::Renamed => doc.keys().any(|k| {
                matches!(
                    options::option(k).map(|o| o.status),
                    Some(OptionStatus::Renamed { .. })
                )
            }),
            KeySet::Removed => doc.keys().any(|k| options::is_removed(k)),
            KeySet::StringValues => doc.values().any(Value::is_string),
        }
    }
}

/// One step of the migration pipeline.
pub trait MigrationRule: Sync {
    /// Short identifier used in trace output.
    fn name(&self) -> &'static str;

    /// Keys whose presence triggers the rule.
    fn reads(&self) -> KeySet;

    /// Keys the rule may create or overwrite.
    fn writes(&self) -> KeySet;

    /// Whether the rule runs for documents in `scope`.
    fn applies_to(&self, _scope: Scope) -> bool {
        true
    }

    fn apply(&self, doc: &mut Document, ctx: &MigrationContext<'_>);
}

/// The migration rules, in the order they run.
pub static PIPELINE: &[&dyn MigrationRule] = &[
    &RemoveObsoleteOptions,
    &RemoveUnsetOptions,
    &WrapPackageRules,
    &RenameDeprecatedOptions,
    &HostRuleFields,
    &TravisFromNode,
    &BaseBranches,
    &SemanticCommits,
    &SemanticPrefix,
    &BooleanFromString,
    &ObjectFromBoolean,
    &StringFromSingletonArray,
    &Extends,
    &UnpublishSafe,
    &Schedule,
    &AutomergeModes,
    &AutomergeUpdateTypes,
    &AutomergeType,
    &RangeStrategy,
    &RebaseWhen,
    &TrustLevel,
    &IgnorePaths,
    &BranchPrefix,
    &PostUpdateOptions,
    &Notifications,
    &BinarySource,
    &Templates,
    &PathRules,
    &Packages,
    &PackageFiles,
    &DepTypesList,
    &DepTypeBlocks,
    &MatcherRenames,
];

/// Legacy keys whose `null` value means "not set".
const UNSET_WHEN_NULL: &[&str] = &[
    "exposeEnv",
    "pinVersions",
    "versionStrategy",
    "raiseDeprecationWarnings",
    "upgradeInRange",
    "gomodTidy",
    "unpublishSafe",
    "semanticPrefix",
];

pub struct RemoveObsoleteOptions;

impl MigrationRule for RemoveObsoleteOptions {
    fn name(&self) -> &'static str {
        "remove-obsolete-options"
    }
    fn reads(&self) -> KeySet {
        KeySet::Removed
    }
    fn writes(&self) -> KeySet {
        KeySet::Removed
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        doc.retain(|key, _| !options::is_removed(key));
    }
}

pub struct RemoveUnsetOptions;

impl MigrationRule for RemoveUnsetOptions {
    fn name(&self) -> &'static str {
        "remove-unset-options"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(UNSET_WHEN_NULL)
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(UNSET_WHEN_NULL)
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        doc.retain(|key, value| !(value.is_null() && UNSET_WHEN_NULL.contains(&key.as_str())));
    }
}

pub struct WrapPackageRules;

impl MigrationRule for WrapPackageRules {
    fn name(&self) -> &'static str {
        "wrap-package-rules"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["packageRules"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["packageRules"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        if let Some(rules) = doc.get_mut("packageRules") {
            if rules.is_object() {
                *rules = Value::Array(vec![rules.take()]);
            }
        }
    }
}

pub struct RenameDeprecatedOptions;

impl MigrationRule for RenameDeprecatedOptions {
    fn name(&self) -> &'static str {
        "rename-deprecated-options"
    }
    fn reads(&self) -> KeySet {
        KeySet::Renamed
    }
    fn writes(&self) -> KeySet {
        KeySet::Renamed
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        for (from, to, merge) in options::renamed_options() {
            if !doc.contains_key(from) {
                continue;
            }
            let both_objects =
                doc.get(from).is_some_and(Value::is_object) && doc.get(to).is_some_and(Value::is_object);
            if merge && both_objects {
                if let Some(Value::Object(legacy)) = take(doc, from) {
                    let dest = ensure_object(doc, to);
                    for (key, value) in legacy {
                        dest.entry(key).or_insert(value);
                    }
                }
            } else {
                rename_key(doc, from, to);
            }
        }
    }
}

const HOST_FIELDS: &[&str] = &["baseUrl", "endpoint", "hostName", "host", "domainName"];

pub struct HostRuleFields;

impl MigrationRule for HostRuleFields {
    fn name(&self) -> &'static str {
        "host-rule-fields"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["platform", "baseUrl", "endpoint", "hostName", "host", "domainName"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["hostType", "matchHost"])
    }
    fn applies_to(&self, scope: Scope) -> bool {
        scope == Scope::HostRule
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        rename_key(doc, "platform", "hostType");

        for field in HOST_FIELDS {
            if !doc.get(*field).is_some_and(Value::is_string) {
                continue;
            }
            if doc.contains_key("matchHost") {
                take(doc, field);
            } else {
                rename_key(doc, field, "matchHost");
            }
        }
    }
}

pub struct TravisFromNode;

impl MigrationRule for TravisFromNode {
    fn name(&self) -> &'static str {
        "travis-from-node"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["node"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["node", "travis"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        let Some(Value::Object(node)) = doc.get_mut("node") else {
            return;
        };
        if node.get("enabled") != Some(&Value::Bool(true)) {
            return;
        }
        take(node, "enabled");
        let node_empty = node.is_empty();

        ensure_object(doc, "travis").insert("enabled".into(), Value::Bool(true));
        if node_empty {
            take(doc, "node");
        }
    }
}

pub struct BaseBranches;

impl MigrationRule for BaseBranches {
    fn name(&self) -> &'static str {
        "base-branches"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["baseBranch"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["baseBranches"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        if doc.contains_key("baseBranches") {
            take(doc, "baseBranch");
            return;
        }
        rename_key(doc, "baseBranch", "baseBranches");
        if let Some(value) = doc.get_mut("baseBranches") {
            *value = Value::Array(into_array(value.take()));
        }
    }
}

pub struct SemanticCommits;

impl MigrationRule for SemanticCommits {
    fn name(&self) -> &'static str {
        "semantic-commits"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["semanticCommits"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["semanticCommits"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        let Some(value) = doc.get_mut("semanticCommits") else {
            return;
        };
        let normalized = match value {
            Value::Bool(true) => "enabled",
            Value::Bool(false) => "disabled",
            Value::String(s) if s == "enabled" || s == "disabled" => return,
            _ => "auto",
        };
        *value = Value::String(normalized.to_string());
    }
}

pub struct SemanticPrefix;

impl MigrationRule for SemanticPrefix {
    fn name(&self) -> &'static str {
        "semantic-prefix"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["semanticPrefix"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["semanticCommitType", "semanticCommitScope"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        let Some(prefix) = doc.get("semanticPrefix").and_then(Value::as_str) else {
            return;
        };
        let (commit_type, scope) = split_semantic_prefix(prefix);
        take(doc, "semanticPrefix");

        doc.entry("semanticCommitType")
            .or_insert(Value::String(commit_type));
        doc.entry("semanticCommitScope")
            .or_insert(scope.map_or(Value::Null, Value::String));
    }
}

/// Split `"type(scope): "` into its type and optional scope.
fn split_semantic_prefix(prefix: &str) -> (String, Option<String>) {
    let head = prefix.split(':').next().unwrap_or_default();
    let mut parts = head.split('(');
    let commit_type = parts.next().unwrap_or_default().to_string();
    let scope = parts
        .next()
        .map(|rest| rest.split(')').next().unwrap_or_default().to_string());
    (commit_type, scope)
}

pub struct BooleanFromString;

impl MigrationRule for BooleanFromString {
    fn name(&self) -> &'static str {
        "boolean-from-string"
    }
    fn reads(&self) -> KeySet {
        KeySet::OfType(OptionType::Boolean)
    }
    fn writes(&self) -> KeySet {
        KeySet::OfType(OptionType::Boolean)
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        for (key, value) in doc.iter_mut() {
            if options::option_type(key) != Some(OptionType::Boolean) {
                continue;
            }
            match value.as_str() {
                Some("true") => *value = Value::Bool(true),
                Some("false") => *value = Value::Bool(false),
                _ => {}
            }
        }
    }
}

pub struct ObjectFromBoolean;

impl MigrationRule for ObjectFromBoolean {
    fn name(&self) -> &'static str {
        "object-from-boolean"
    }
    fn reads(&self) -> KeySet {
        KeySet::OfType(OptionType::Object)
    }
    fn writes(&self) -> KeySet {
        KeySet::OfType(OptionType::Object)
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        for (key, value) in doc.iter_mut() {
            if options::option_type(key) != Some(OptionType::Object) {
                continue;
            }
            if let Value::Bool(enabled) = value {
                let mut block = Document::new();
                block.insert("enabled".into(), Value::Bool(*enabled));
                *value = Value::Object(block);
            }
        }
    }
}

pub struct StringFromSingletonArray;

impl MigrationRule for StringFromSingletonArray {
    fn name(&self) -> &'static str {
        "string-from-singleton-array"
    }
    fn reads(&self) -> KeySet {
        KeySet::OfType(OptionType::String)
    }
    fn writes(&self) -> KeySet {
        KeySet::OfType(OptionType::String)
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        for (key, value) in doc.iter_mut() {
            if options::option_type(key) != Some(OptionType::String) {
                continue;
            }
            let Value::Array(items) = value else {
                continue;
            };
            let replacement = match items.as_slice() {
                [Value::String(s)] => s.clone(),
                [item @ (Value::Number(_) | Value::Bool(_))] => item.to_string(),
                _ => continue,
            };
            *value = Value::String(replacement);
        }
    }
}

pub struct AutomergeModes;

impl MigrationRule for AutomergeModes {
    fn name(&self) -> &'static str {
        "automerge-modes"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["automerge"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["automerge", "major", "minor", "patch"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        let mode = match doc.get("automerge").and_then(Value::as_str) {
            Some(mode @ ("none" | "patch" | "minor" | "any")) => mode.to_string(),
            _ => return,
        };

        let set_update_type = |doc: &mut Document, update_type: &str, enabled: bool| {
            ensure_object(doc, update_type).insert("automerge".into(), Value::Bool(enabled));
        };

        match mode.as_str() {
            "none" => {
                doc.insert("automerge".into(), Value::Bool(false));
            }
            "any" => {
                doc.insert("automerge".into(), Value::Bool(true));
            }
            "patch" => {
                take(doc, "automerge");
                set_update_type(doc, "patch", true);
                set_update_type(doc, "minor", false);
                set_update_type(doc, "major", false);
            }
            _ => {
                take(doc, "automerge");
                set_update_type(doc, "minor", true);
                set_update_type(doc, "major", false);
            }
        }
    }
}

const AUTOMERGE_UPDATE_TYPES: &[(&str, &str)] = &[
    ("automergeMajor", "major"),
    ("automergeMinor", "minor"),
    ("automergePatch", "patch"),
];

pub struct AutomergeUpdateTypes;

impl MigrationRule for AutomergeUpdateTypes {
    fn name(&self) -> &'static str {
        "automerge-update-types"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["automergeMajor", "automergeMinor", "automergePatch"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["major", "minor", "patch"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        for (legacy, update_type) in AUTOMERGE_UPDATE_TYPES {
            if let Some(value) = take(doc, legacy) {
                let enabled = value == true || value == 1;
                ensure_object(doc, update_type).insert("automerge".into(), Value::Bool(enabled));
            }
        }
    }
}

pub struct AutomergeType;

impl MigrationRule for AutomergeType {
    fn name(&self) -> &'static str {
        "automerge-type"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["automergeType"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["automergeType"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        if let Some(value) = doc.get_mut("automergeType") {
            if value.as_str().is_some_and(|s| s.starts_with("branch-")) {
                *value = Value::String("branch".into());
            }
        }
    }
}

pub struct RangeStrategy;

impl MigrationRule for RangeStrategy {
    fn name(&self) -> &'static str {
        "range-strategy"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["pinVersions", "upgradeInRange", "versionStrategy"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["rangeStrategy"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        let pin = take(doc, "pinVersions");
        let upgrade_in_range = take(doc, "upgradeInRange");
        let version_strategy = take(doc, "versionStrategy");

        let strategy = match (pin, upgrade_in_range, version_strategy) {
            (Some(Value::Bool(true)), _, _) => Some("pin"),
            (Some(Value::Bool(false)), _, _) => Some("replace"),
            (_, Some(Value::Bool(true)), _) => Some("bump"),
            (_, _, Some(Value::String(s))) if s == "widen" => Some("widen"),
            _ => None,
        };
        if let Some(strategy) = strategy {
            doc.entry("rangeStrategy")
                .or_insert(Value::String(strategy.into()));
        }
    }
}

pub struct RebaseWhen;

impl MigrationRule for RebaseWhen {
    fn name(&self) -> &'static str {
        "rebase-when"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["rebaseStalePrs", "rebaseConflictedPrs"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["rebaseWhen"])
    }
    fn apply(&self, doc: &mut Document, ctx: &MigrationContext<'_>) {
        let stale = take(doc, "rebaseStalePrs");
        let conflicted = take(doc, "rebaseConflictedPrs");
        if doc.contains_key("rebaseWhen") {
            return;
        }

        let when = if conflicted == Some(Value::Bool(false)) {
            Some("never".to_string())
        } else {
            match stale {
                Some(Value::Bool(true)) => Some("behind-base-branch".to_string()),
                Some(Value::Bool(false)) => Some("conflicted".to_string()),
                Some(Value::Null) => Some(
                    ctx.parent()
                        .get("rebaseWhen")
                        .and_then(Value::as_str)
                        .unwrap_or("auto")
                        .to_string(),
                ),
                _ => None,
            }
        };
        if let Some(when) = when {
            doc.insert("rebaseWhen".into(), Value::String(when));
        }
    }
}

pub struct TrustLevel;

impl MigrationRule for TrustLevel {
    fn name(&self) -> &'static str {
        "trust-level"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["exposeEnv"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["trustLevel"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        let level = match take(doc, "exposeEnv") {
            Some(Value::Bool(true)) => "high",
            Some(Value::Bool(false)) => "low",
            _ => return,
        };
        doc.entry("trustLevel")
            .or_insert(Value::String(level.into()));
    }
}

pub struct IgnorePaths;

impl MigrationRule for IgnorePaths {
    fn name(&self) -> &'static str {
        "ignore-paths"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["ignoreNodeModules"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["ignorePaths"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        let Some(value) = take(doc, "ignoreNodeModules") else {
            return;
        };
        let paths = if is_truthy(&value) {
            vec![Value::String("node_modules/".into())]
        } else {
            Vec::new()
        };
        doc.entry("ignorePaths").or_insert(Value::Array(paths));
    }
}

pub struct BranchPrefix;

impl MigrationRule for BranchPrefix {
    fn name(&self) -> &'static str {
        "branch-prefix"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["branchPrefix"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["branchPrefix", "additionalBranchPrefix"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        let Some(prefix) = doc.get("branchPrefix").and_then(Value::as_str) else {
            return;
        };
        let Some(idx) = prefix.find("{{") else {
            return;
        };
        let (fixed, template) = (prefix[..idx].to_string(), prefix[idx..].to_string());

        let additional = match doc.get("additionalBranchPrefix").and_then(Value::as_str) {
            Some(existing) => format!("{template}{existing}"),
            None => template,
        };
        doc.insert("branchPrefix".into(), Value::String(fixed));
        doc.insert("additionalBranchPrefix".into(), Value::String(additional));
    }
}

pub struct PostUpdateOptions;

impl MigrationRule for PostUpdateOptions {
    fn name(&self) -> &'static str {
        "post-update-options"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["gomodTidy"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["postUpdateOptions"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        if take(doc, "gomodTidy").is_some_and(|v| is_truthy(&v)) {
            push_unique(doc, "postUpdateOptions", "gomodTidy");
        }
    }
}

pub struct Notifications;

impl MigrationRule for Notifications {
    fn name(&self) -> &'static str {
        "notifications"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["suppressNotifications", "raiseDeprecationWarnings"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["suppressNotifications"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        if let Some(Value::Array(items)) = doc.get_mut("suppressNotifications") {
            items.retain(|item| item.as_str() != Some("prEditNotification"));
        }
        if take(doc, "raiseDeprecationWarnings") == Some(Value::Bool(false)) {
            push_unique(doc, "suppressNotifications", "deprecationWarningIssues");
        }
    }
}

pub struct BinarySource;

impl MigrationRule for BinarySource {
    fn name(&self) -> &'static str {
        "binary-source"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["binarySource"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["binarySource"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        if let Some(value) = doc.get_mut("binarySource") {
            if value.as_str() == Some("auto") {
                *value = Value::String("global".into());
            }
        }
    }
}

const SEMANTIC_PREFIX_TEMPLATE: &str = "{{#if semanticCommitType}}{{semanticCommitType}}{{#if semanticCommitScope}}({{semanticCommitScope}}){{/if}}: {{/if}}";

static TEMPLATE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^{}]*\}\}").expect("valid template regex"));

static RENAMED_TEMPLATE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(fromVersion|toVersion|newValueMajor|newValueMinor|newVersionMajor|newVersionMinor|managerBranchPrefix)\b",
    )
    .expect("valid template field regex")
});

fn renamed_template_field(field: &str) -> &'static str {
    match field {
        "fromVersion" => "currentVersion",
        "toVersion" => "newVersion",
        "newValueMajor" | "newVersionMajor" => "newMajor",
        "managerBranchPrefix" => "additionalBranchPrefix",
        _ => "newMinor",
    }
}

/// Rewrite deprecated template variables in one string.
pub fn migrate_template(text: &str) -> String {
    let mut out = text
        .replace("{{baseDir}}", "{{packageFileDir}}")
        .replace("{{depNameShort}}", "{{depName}}");
    if let Some(rest) = out.strip_prefix("{{semanticPrefix}}") {
        out = format!("{SEMANTIC_PREFIX_TEMPLATE}{rest}");
    }

    TEMPLATE_SEGMENT
        .replace_all(&out, |caps: &regex::Captures<'_>| {
            RENAMED_TEMPLATE_FIELD
                .replace_all(&caps[0], |field: &regex::Captures<'_>| {
                    renamed_template_field(&field[1])
                })
                .into_owned()
        })
        .into_owned()
}

pub struct Templates;

impl MigrationRule for Templates {
    fn name(&self) -> &'static str {
        "templates"
    }
    fn reads(&self) -> KeySet {
        KeySet::StringValues
    }
    fn writes(&self) -> KeySet {
        KeySet::StringValues
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        for value in doc.values_mut() {
            if let Value::String(text) = value {
                let migrated = migrate_template(text);
                if migrated != *text {
                    *text = migrated;
                }
            }
        }
    }
}
