// Trait comparison: per-trait absolute distance between two profiles.
//
// The analysis service does not promise the same trait set for every
// profile, so what happens on a mismatch is an explicit KeyPolicy rather
// than an assumption.

use std::fmt;
use std::str::FromStr;

use super::{DifferenceMap, TraitMap};
use crate::error::{AffinityError, Result, Side};

/// How to treat traits that appear in only one of the two profiles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum KeyPolicy {
    /// Both profiles must carry exactly the same traits.
    #[default]
    Strict,
    /// Compare only the traits both profiles carry.
    Intersect,
    /// Compare over the union, scoring a missing trait as the given value.
    Fill(f64),
}

impl fmt::Display for KeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPolicy::Strict => f.write_str("strict"),
            KeyPolicy::Intersect => f.write_str("intersect"),
            KeyPolicy::Fill(score) => write!(f, "fill:{score}"),
        }
    }
}

impl FromStr for KeyPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "strict" => return Ok(KeyPolicy::Strict),
            "intersect" => return Ok(KeyPolicy::Intersect),
            _ => {}
        }

        let Some(raw) = s.strip_prefix("fill:") else {
            anyhow::bail!("Unknown key policy '{s}' (expected strict, intersect or fill:<score>)");
        };
        let score: f64 = raw
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid fill score '{raw}'"))?;
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            anyhow::bail!("Fill score must be between 0 and 1, got {score}");
        }
        Ok(KeyPolicy::Fill(score))
    }
}

/// Compare two profiles under the default strict policy.
///
/// Fails with `KeyMismatch` if either map has a trait the other lacks.
pub fn compare(a: &TraitMap, b: &TraitMap) -> Result<DifferenceMap> {
    compare_with_policy(a, b, KeyPolicy::Strict)
}

/// Compute `|a[t] - b[t]|` for each trait, resolving mismatched trait sets
/// according to `policy`.
///
/// Output order follows `a`; under `Fill`, traits only `b` has come after.
pub fn compare_with_policy(a: &TraitMap, b: &TraitMap, policy: KeyPolicy) -> Result<DifferenceMap> {
    let mut diffs = DifferenceMap::with_capacity(a.len());

    for (trait_id, &score_a) in a {
        match (b.get(trait_id), policy) {
            (Some(&score_b), _) => {
                diffs.insert(trait_id.clone(), (score_a - score_b).abs());
            }
            (None, KeyPolicy::Strict) => {
                return Err(AffinityError::KeyMismatch {
                    trait_id: trait_id.clone(),
                    missing_from: Side::Second,
                });
            }
            (None, KeyPolicy::Intersect) => {}
            (None, KeyPolicy::Fill(fill)) => {
                diffs.insert(trait_id.clone(), (score_a - fill).abs());
            }
        }
    }

    for (trait_id, &score_b) in b {
        if a.contains_key(trait_id) {
            continue;
        }
        match policy {
            KeyPolicy::Strict => {
                return Err(AffinityError::KeyMismatch {
                    trait_id: trait_id.clone(),
                    missing_from: Side::First,
                });
            }
            KeyPolicy::Intersect => {}
            KeyPolicy::Fill(fill) => {
                diffs.insert(trait_id.clone(), (fill - score_b).abs());
            }
        }
    }

    Ok(diffs)
}
