// Personality trait core: the pure transforms between an analysis result
// and the ranked list of shared traits.
//
// extract: nested analysis tree -> flat TraitMap
// compare: two TraitMaps -> per-trait absolute differences
// rank:    differences -> the N most similar traits

pub mod compare;
pub mod extract;
pub mod rank;

use indexmap::IndexMap;

/// Trait id → score in [0, 1], in the order the traits were first seen.
pub type TraitMap = IndexMap<String, f64>;

/// Trait id → absolute score difference between two accounts.
pub type DifferenceMap = IndexMap<String, f64>;

/// One entry of a ranked similarity list.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RankedTrait {
    pub trait_id: String,
    pub difference: f64,
}

/// Traits ordered from most to least similar.
pub type RankedList = Vec<RankedTrait>;
