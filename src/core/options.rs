//! Static option schema.
//!
//! Every option the migration engine knows about has one entry here. The
//! table is built once on first use and is read-only afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Value kind of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Boolean,
    String,
    Integer,
    Array,
    Object,
}

/// Lifecycle status of an option name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionStatus {
    /// Part of the current schema.
    Current,
    /// Deprecated name for another option.
    Renamed {
        to: &'static str,
        /// Merge object contents into the destination instead of replacing it.
        merge: bool,
    },
    /// Obsolete; deleted whatever its value.
    Removed,
    /// Deprecated, rewritten by a dedicated migration rule.
    Legacy,
}

/// Metadata for one option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSchemaEntry {
    pub name: &'static str,
    pub kind: OptionType,
    pub status: OptionStatus,
    /// Arrays that are concatenated rather than replaced when configs merge.
    pub mergeable: bool,
    /// Objects whose keys are user data rather than option names.
    pub freeform: bool,
}

impl OptionSchemaEntry {
    const fn new(name: &'static str, kind: OptionType) -> Self {
        OptionSchemaEntry {
            name,
            kind,
            status: OptionStatus::Current,
            mergeable: false,
            freeform: false,
        }
    }

    const fn mergeable(mut self) -> Self {
        self.mergeable = true;
        self
    }

    const fn freeform(mut self) -> Self {
        self.freeform = true;
        self
    }

    const fn renamed(mut self, to: &'static str) -> Self {
        self.status = OptionStatus::Renamed { to, merge: false };
        self
    }

    const fn renamed_merging(mut self, to: &'static str) -> Self {
        self.status = OptionStatus::Renamed { to, merge: true };
        self
    }

    const fn removed(mut self) -> Self {
        self.status = OptionStatus::Removed;
        self
    }

    const fn legacy(mut self) -> Self {
        self.status = OptionStatus::Legacy;
        self
    }
}

use OptionType::{Array, Boolean, Integer, Object, String as Str};

const fn opt(name: &'static str, kind: OptionType) -> OptionSchemaEntry {
    OptionSchemaEntry::new(name, kind)
}

static OPTIONS: &[OptionSchemaEntry] = &[
    // Booleans
    opt("enabled", Boolean),
    opt("automerge", Boolean),
    opt("autodiscover", Boolean),
    opt("onboarding", Boolean),
    opt("separateMinorPatch", Boolean),
    opt("separateMajorMinor", Boolean),
    opt("separateMultipleMajor", Boolean),
    opt("dependencyDashboard", Boolean),
    opt("dependencyDashboardApproval", Boolean),
    opt("dependencyDashboardAutoclose", Boolean),
    opt("includeForks", Boolean),
    opt("respectLatest", Boolean),
    opt("ignoreUnstable", Boolean),
    opt("ignoreDeprecated", Boolean),
    opt("unicodeEmoji", Boolean),
    opt("pinDigests", Boolean),
    opt("rollbackPrs", Boolean),
    opt("recreateClosed", Boolean),
    opt("printConfig", Boolean),
    opt("commitBodyTable", Boolean),
    opt("draftPR", Boolean),
    opt("platformAutomerge", Boolean),
    opt("updateNotScheduled", Boolean),
    // Strings
    opt("semanticCommits", Str),
    opt("semanticCommitType", Str),
    opt("semanticCommitScope", Str),
    opt("rangeStrategy", Str),
    opt("rebaseWhen", Str),
    opt("versioning", Str),
    opt("groupName", Str),
    opt("groupSlug", Str),
    opt("commitMessage", Str),
    opt("commitMessagePrefix", Str),
    opt("commitMessageAction", Str),
    opt("commitMessageTopic", Str),
    opt("commitMessageExtra", Str),
    opt("commitMessageSuffix", Str),
    opt("commitBody", Str),
    opt("prTitle", Str),
    opt("prCreation", Str),
    opt("branchName", Str),
    opt("branchPrefix", Str),
    opt("additionalBranchPrefix", Str),
    opt("branchTopic", Str),
    opt("automergeType", Str),
    opt("automergeStrategy", Str),
    opt("binarySource", Str),
    opt("trustLevel", Str),
    opt("timezone", Str),
    opt("platform", Str),
    opt("hostType", Str),
    opt("matchHost", Str),
    opt("matchCurrentVersion", Str),
    opt("followTag", Str),
    opt("extractVersion", Str),
    opt("dependencyDashboardTitle", Str),
    opt("dependencyDashboardHeader", Str),
    opt("dependencyDashboardFooter", Str),
    // Integers
    opt("prConcurrentLimit", Integer),
    opt("prHourlyLimit", Integer),
    opt("prNotPendingHours", Integer),
    opt("stabilityDays", Integer),
    // Arrays
    opt("extends", Array),
    opt("ignoreDeps", Array),
    opt("ignorePaths", Array),
    opt("includePaths", Array),
    opt("baseBranches", Array),
    opt("schedule", Array),
    opt("labels", Array),
    opt("assignees", Array),
    opt("reviewers", Array),
    opt("enabledManagers", Array),
    opt("registryUrls", Array),
    opt("suppressNotifications", Array),
    opt("postUpdateOptions", Array),
    opt("packageRules", Array).mergeable(),
    opt("hostRules", Array).mergeable(),
    opt("regexManagers", Array).mergeable(),
    opt("matchPaths", Array),
    opt("matchLanguages", Array),
    opt("matchBaseBranches", Array),
    opt("matchManagers", Array),
    opt("matchDatasources", Array),
    opt("matchDepTypes", Array),
    opt("matchPackageNames", Array),
    opt("matchPackagePatterns", Array),
    opt("matchPackagePrefixes", Array),
    opt("matchSourceUrlPrefixes", Array),
    opt("matchUpdateTypes", Array),
    opt("excludePackageNames", Array),
    opt("excludePackagePatterns", Array),
    opt("excludePackagePrefixes", Array),
    // Objects
    opt("major", Object),
    opt("minor", Object),
    opt("patch", Object),
    opt("pin", Object),
    opt("digest", Object),
    opt("lockFileMaintenance", Object),
    opt("vulnerabilityAlerts", Object),
    opt("constraints", Object).freeform(),
    opt("customEnvVariables", Object).freeform(),
    opt("migratePresets", Object).freeform(),
    opt("secrets", Object).freeform(),
    opt("npm", Object),
    opt("meteor", Object),
    opt("travis", Object),
    opt("node", Object),
    opt("nvmrc", Object),
    opt("docker", Object),
    opt("gomod", Object),
    opt("nuget", Object),
    opt("pipenv", Object),
    opt("pip_setup", Object),
    opt("pip_requirements", Object),
    opt("poetry", Object),
    opt("mix", Object),
    opt("cocoapods", Object),
    opt("cargo", Object),
    opt("composer", Object),
    opt("maven", Object),
    opt("gradle", Object),
    opt("bundler", Object),
    // Renamed
    opt("masterIssue", Boolean).renamed("dependencyDashboard"),
    opt("masterIssueApproval", Boolean).renamed("dependencyDashboardApproval"),
    opt("masterIssueAutoclose", Boolean).renamed("dependencyDashboardAutoclose"),
    opt("masterIssueTitle", Str).renamed("dependencyDashboardTitle"),
    opt("masterIssueHeader", Str).renamed("dependencyDashboardHeader"),
    opt("masterIssueFooter", Str).renamed("dependencyDashboardFooter"),
    opt("versionScheme", Str).renamed("versioning"),
    opt("multipleMajorPrs", Boolean).renamed("separateMultipleMajor"),
    opt("separateMajorReleases", Boolean).renamed("separateMajorMinor"),
    opt("separatePatchReleases", Boolean).renamed("separateMinorPatch"),
    opt("renovateFork", Boolean).renamed("includeForks"),
    opt("managerBranchPrefix", Str).renamed("additionalBranchPrefix"),
    opt("excludedPackageNames", Array).renamed("excludePackageNames"),
    opt("excludedPackagePatterns", Array).renamed("excludePackagePatterns"),
    opt("endpoints", Array).renamed("hostRules"),
    opt("compatibility", Object).renamed_merging("constraints"),
    // Removed
    opt("maintainYarnLock", Boolean).removed(),
    opt("yarnCacheFolder", Str).removed(),
    opt("yarnMaintenanceBranchName", Str).removed(),
    opt("yarnMaintenanceCommitMessage", Str).removed(),
    opt("yarnMaintenancePrTitle", Str).removed(),
    opt("yarnMaintenancePrBody", Str).removed(),
    opt("yarnMaintenanceSchedule", Array).removed(),
    opt("groupBranchName", Str).removed(),
    opt("groupCommitMessage", Str).removed(),
    opt("groupPrTitle", Str).removed(),
    opt("groupPrBody", Str).removed(),
    opt("gitFs", Boolean).removed(),
    // Rewritten by dedicated rules
    opt("baseBranch", Str).legacy(),
    opt("pinVersions", Boolean).legacy(),
    opt("upgradeInRange", Boolean).legacy(),
    opt("versionStrategy", Str).legacy(),
    opt("exposeEnv", Boolean).legacy(),
    opt("ignoreNodeModules", Boolean).legacy(),
    opt("rebaseStalePrs", Boolean).legacy(),
    opt("rebaseConflictedPrs", Boolean).legacy(),
    opt("semanticPrefix", Str).legacy(),
    opt("unpublishSafe", Boolean).legacy(),
    opt("automergeMajor", Boolean).legacy(),
    opt("automergeMinor", Boolean).legacy(),
    opt("automergePatch", Boolean).legacy(),
    opt("gomodTidy", Boolean).legacy(),
    opt("raiseDeprecationWarnings", Boolean).legacy(),
    opt("packageFiles", Array).legacy(),
    opt("depTypes", Array).legacy(),
    opt("packages", Array).legacy(),
    opt("pathRules", Array).legacy(),
    opt("packageName", Str).legacy(),
    opt("packagePattern", Str).legacy(),
];

static BY_NAME: LazyLock<HashMap<&'static str, &'static OptionSchemaEntry>> =
    LazyLock::new(|| OPTIONS.iter().map(|o| (o.name, o)).collect());

/// Look up an option by name.
pub fn option(name: &str) -> Option<&'static OptionSchemaEntry> {
    BY_NAME.get(name).copied()
}

/// The value kind of an option, if known.
pub fn option_type(name: &str) -> Option<OptionType> {
    option(name).map(|o| o.kind)
}

/// Whether arrays of this option concatenate when configs merge.
pub fn is_mergeable(name: &str) -> bool {
    option(name).is_some_and(|o| o.mergeable)
}

/// Whether an object option holds user data that must not be migrated.
pub fn is_freeform(name: &str) -> bool {
    option(name).is_some_and(|o| o.freeform)
}

/// Whether an option is obsolete and should be deleted.
pub fn is_removed(name: &str) -> bool {
    option(name).is_some_and(|o| o.status == OptionStatus::Removed)
}

/// Iterate over `(deprecated, current, merge)` rename triples.
pub fn renamed_options() -> impl Iterator<Item = (&'static str, &'static str, bool)> {
    OPTIONS.iter().filter_map(|o| match o.status {
        OptionStatus::Renamed { to, merge } => Some((o.name, to, merge)),
        _ => None,
    })
}
