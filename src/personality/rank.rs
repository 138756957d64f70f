// Similarity ranking: smallest difference first.

use super::{DifferenceMap, RankedList, RankedTrait};

/// Number of shared traits reported when the caller doesn't say otherwise.
pub const DEFAULT_TOP_N: usize = 5;

/// Sort traits by ascending difference and keep the first `limit`.
///
/// The sort is stable, so traits with equal differences keep the order they
/// had in `diffs`. A `limit` larger than the map returns every entry.
pub fn rank(diffs: &DifferenceMap, limit: usize) -> RankedList {
    let mut ranked: RankedList = diffs
        .iter()
        .map(|(trait_id, &difference)| RankedTrait {
            trait_id: trait_id.clone(),
            difference,
        })
        .collect();

    ranked.sort_by(|a, b| a.difference.total_cmp(&b.difference));
    ranked.truncate(limit);
    ranked
}
