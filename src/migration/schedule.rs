//! Schedule text normalization.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::rules::{KeySet, MigrationRule};
use super::MigrationContext;
use crate::core::document::Document;

static AFTER_BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)(after|before) (.*?) and (after|before) (.*?)( |$)(.*)")
        .expect("valid schedule split regex")
});

static EVERY_WEEKDAY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"every ((?:mon|tues|wednes|thurs|fri|satur|sun)day)$")
        .expect("valid weekday regex")
});

/// Normalize a `schedule` value.
///
/// Returns `None` when the value is not a schedule (not a non-empty string
/// or a list of strings). A string that stays a single entry is returned as
/// a string, anything else as an array.
pub fn migrate_schedule(value: &Value) -> Option<Value> {
    let entries: Vec<String> = match value {
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<_>>()?,
        _ => return None,
    };

    let mut schedules = Vec::with_capacity(entries.len());
    let mut split_off = Vec::new();
    for entry in entries {
        match split_time_range(&entry) {
            Some((first, second)) => {
                schedules.push(first);
                split_off.push(second);
            }
            None => schedules.push(entry),
        }
    }
    schedules.extend(split_off);

    let schedules: Vec<String> = schedules.iter().map(|s| normalize_entry(s)).collect();

    if value.is_string() && schedules.len() == 1 {
        schedules.into_iter().next().map(Value::String)
    } else {
        Some(Value::Array(schedules.into_iter().map(Value::String).collect()))
    }
}

/// Split `"after T1 and before T2 ..."` into two entries when the range
/// wraps past midnight.
fn split_time_range(entry: &str) -> Option<(String, String)> {
    if !(entry.contains(" and ") && entry.contains("before ") && entry.contains("after ")) {
        return None;
    }
    let after = minutes_after(entry, "after ")?;
    let before = minutes_after(entry, "before ")?;
    if after <= before {
        return None;
    }

    let caps = AFTER_BEFORE.captures(entry)?;
    let prefix = &caps[1];
    let rest = &caps[7];
    let first = format!("{prefix}{} {} {rest}", &caps[2], &caps[3]);
    let second = format!("{prefix}{} {} {rest}", &caps[4], &caps[5]);
    Some((first.trim().to_string(), second.trim().to_string()))
}

/// Parse the time following `marker` into minutes past midnight.
fn minutes_after(entry: &str, marker: &str) -> Option<u32> {
    let start = entry.find(marker)? + marker.len();
    let token = entry[start..].split_whitespace().next()?;
    parse_time(token)
}

/// Parse `5am`, `10pm`, `5:30pm` or `17:00`.
fn parse_time(token: &str) -> Option<u32> {
    let token = token.to_ascii_lowercase();
    let (clock, meridiem) = if let Some(t) = token.strip_suffix("am") {
        (t, Some(false))
    } else if let Some(t) = token.strip_suffix("pm") {
        (t, Some(true))
    } else {
        (token.as_str(), None)
    };

    let (hours, minutes) = match clock.split_once(':') {
        Some((h, m)) => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        None => (clock.parse::<u32>().ok()?, 0),
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    let hours = match meridiem {
        Some(true) if hours < 12 => hours + 12,
        Some(false) if hours == 12 => 0,
        _ => hours,
    };
    Some(hours * 60 + minutes)
}

fn normalize_entry(entry: &str) -> String {
    let mut out = entry.replacen(
        "on the last day of the month",
        "on the first day of the month",
        1,
    );
    out = out.replacen("on every weekday", "every weekday", 1);
    if let Some(stripped) = out.strip_suffix(" every day") {
        out = stripped.to_string();
    }
    out = EVERY_WEEKDAY_NAME.replace(&out, "on $1").into_owned();
    if out.ends_with("days") {
        out = out.replacen("days", "day", 1);
    }
    out
}

pub struct Schedule;

impl MigrationRule for Schedule {
    fn name(&self) -> &'static str {
        "schedule"
    }
    fn reads(&self) -> KeySet {
        KeySet::Keys(&["schedule"])
    }
    fn writes(&self) -> KeySet {
        KeySet::Keys(&["schedule"])
    }
    fn apply(&self, doc: &mut Document, _ctx: &MigrationContext<'_>) {
        let Some(value) = doc.get_mut("schedule") else {
            return;
        };
        if let Some(migrated) = migrate_schedule(value) {
            *value = migrated;
        }
    }
}
