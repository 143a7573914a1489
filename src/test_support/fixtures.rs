//! Test fixtures for common test scenarios.
//!
//! Configuration documents exercising many migrations at once.

use serde_json::{json, Value};

use crate::core::document::Document;

/// Convert a `json!` object literal into a [`Document`].
///
/// Panics if `value` is not an object.
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture is not an object: {other}"),
    }
}

/// A configuration touching nearly every legacy option at once.
///
/// Migrating it yields nine package rules, one host rule and
/// `automerge: false`.
pub fn legacy_config() -> Value {
    json!({
        "endpoints": [{}],
        "enabled": true,
        "platform": "github",
        "hostRules": [
            {
                "platform": "docker",
                "endpoint": "https://docker.io",
                "host": "docker.io",
                "username": "some-username",
                "password": "some-password"
            }
        ],
        "compatibility": {
            "python": "3.7"
        },
        "extends": [
            ":automergeBranchMergeCommit",
            "default:js-app",
            "config:library",
            ":masterIssue",
            "helpers:oddIsUnstable"
        ],
        "maintainYarnLock": true,
        "onboarding": "false",
        "multipleMajorPrs": true,
        "gitFs": false,
        "ignoreNpmrcFile": true,
        "separateMajorReleases": true,
        "separatePatchReleases": true,
        "suppressNotifications": ["lockFileErrors", "prEditNotification"],
        "automerge": "none",
        "automergeMajor": false,
        "binarySource": "auto",
        "automergeMinor": true,
        "automergePatch": true,
        "masterIssue": "true",
        "masterIssueTitle": "foo",
        "gomodTidy": true,
        "upgradeInRange": true,
        "trustLevel": "high",
        "automergeType": "branch-push",
        "branchName": "{{{branchPrefix}}}{{{managerBranchPrefix}}}{{{branchTopic}}}{{{baseDir}}}",
        "baseBranch": "next",
        "managerBranchPrefix": "foo",
        "branchPrefix": "renovate/{{parentDir}}-",
        "renovateFork": true,
        "ignoreNodeModules": true,
        "node": {
            "enabled": true
        },
        "poetry": {
            "rebaseStalePrs": true,
            "versionScheme": "pep440"
        },
        "pipenv": {
            "rebaseStalePrs": false,
            "rebaseConflictedPrs": true
        },
        "pip_setup": {
            "rebaseConflictedPrs": false
        },
        "rebaseStalePrs": null,
        "rebaseConflictedPrs": true,
        "meteor": true,
        "autodiscover": "true",
        "schedule": "on the last day of the month",
        "commitMessage": "{{semanticPrefix}}some commit message {{depNameShort}}",
        "prTitle": "{{semanticPrefix}}some pr title",
        "semanticPrefix": "fix(deps): ",
        "pathRules": [
            {
                "paths": ["examples/**"],
                "extends": ["foo"]
            }
        ],
        "peerDependencies": {
            "versionStrategy": "widen"
        },
        "packageRules": [
            {
                "packagePatterns": "^(@angular|typescript)",
                "groupName": ["angular packages"],
                "excludedPackageNames": "foo"
            },
            {
                "packagePatterns": ["^foo"],
                "groupName": ["foo"]
            },
            {
                "packageName": "angular",
                "packagePattern": "ang",
                "enabled": false
            },
            {
                "packageNames": ["guava"],
                "versionScheme": "maven"
            },
            {
                "packageNames": ["foo"],
                "packageRules": [
                    {
                        "depTypeList": ["bar"],
                        "automerge": true
                    }
                ]
            }
        ],
        "exposeEnv": true,
        "lockFileMaintenance": {
            "exposeEnv": false,
            "gitFs": true,
            "automerge": "any",
            "schedule": "before 5am every day"
        },
        "devDependencies": {
            "automerge": "minor",
            "schedule": null
        },
        "nvmrc": {
            "pathRules": [
                {
                    "paths": ["node/**"],
                    "extends": "node"
                }
            ]
        },
        "depTypes": [
            "dependencies",
            {
                "depType": "optionalDependencies",
                "respectLatest": false,
                "automerge": "minor",
                "schedule": "before 5am on Mondays"
            }
        ],
        "raiseDeprecationWarnings": false
    })
}

/// A current configuration that needs no migration.
pub fn current_config() -> Value {
    json!({
        "extends": ["config:base"],
        "baseBranches": ["main"],
        "schedule": ["before 5am on monday"],
        "packageRules": [
            {
                "matchPackageNames": ["serde"],
                "automerge": true,
                "automergeType": "branch"
            }
        ]
    })
}
