// JSON reports: machine-readable versions of the terminal output.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::personality::compare::KeyPolicy;
use crate::pipeline::compare::{AccountProfile, Comparison};

#[derive(Serialize)]
struct ComparisonReport<'a> {
    generated_at: String,
    key_policy: String,
    #[serde(flatten)]
    comparison: &'a Comparison,
}

#[derive(Serialize)]
struct ProfileReport<'a> {
    generated_at: String,
    #[serde(flatten)]
    profile: &'a AccountProfile,
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Render a comparison as pretty-printed JSON.
pub fn comparison_json(
    comparison: &Comparison,
    policy: KeyPolicy,
    now: DateTime<Utc>,
) -> Result<String> {
    let report = ComparisonReport {
        generated_at: timestamp(now),
        key_policy: policy.to_string(),
        comparison,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Render a single profile as pretty-printed JSON.
pub fn profile_json(profile: &AccountProfile, now: DateTime<Utc>) -> Result<String> {
    let report = ProfileReport {
        generated_at: timestamp(now),
        profile,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
