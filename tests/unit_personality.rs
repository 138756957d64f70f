// Unit tests for the trait core: flatten, compare and rank.
//
// Pure functions only. No network or filesystem access.

use serde_json::{json, Value};

use affinity::error::{AffinityError, Side};
use affinity::personality::compare::{compare, compare_with_policy, KeyPolicy};
use affinity::personality::extract::{flatten, RawAnalysisTree};
use affinity::personality::rank::rank;
use affinity::personality::{DifferenceMap, TraitMap};

fn map(entries: &[(&str, f64)]) -> TraitMap {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn leaf(category: &str, id: &str, pct: f64) -> Value {
    json!({ "category": category, "id": id, "percentage": pct })
}

/// A tree shaped like a real v2 profile: personality, needs and values
/// branches, with facets four levels down.
fn realistic_tree() -> RawAnalysisTree {
    RawAnalysisTree(json!({
        "id": "*UNKNOWN*",
        "source": "*UNKNOWN*",
        "word_count": 3542,
        "processed_lang": "en",
        "tree": {
            "id": "r",
            "name": "root",
            "children": [
                {
                    "id": "personality",
                    "name": "Big 5",
                    "children": [
                        {
                            "id": "Openness_parent",
                            "name": "Openness",
                            "category": "personality",
                            "percentage": 0.81,
                            "children": [
                                {
                                    "id": "Openness",
                                    "name": "Openness",
                                    "category": "personality",
                                    "percentage": 0.81,
                                    "children": [
                                        leaf("personality", "Adventurousness", 0.42),
                                        leaf("personality", "Imagination", 0.77)
                                    ]
                                },
                                {
                                    "id": "Agreeableness",
                                    "name": "Agreeableness",
                                    "category": "personality",
                                    "percentage": 0.12,
                                    "children": [
                                        leaf("personality", "Altruism", 0.33),
                                        leaf("personality", "Trust", 0.64)
                                    ]
                                }
                            ]
                        }
                    ]
                },
                {
                    "id": "needs",
                    "name": "Needs",
                    "children": [
                        {
                            "id": "Challenge_parent",
                            "category": "needs",
                            "percentage": 0.3,
                            "children": [
                                leaf("needs", "Challenge", 0.3),
                                leaf("needs", "Closeness", 0.5)
                            ]
                        }
                    ]
                },
                {
                    "id": "values",
                    "name": "Values",
                    "children": [
                        {
                            "id": "Tradition_parent",
                            "category": "values",
                            "percentage": 0.2,
                            "children": [ leaf("values", "Tradition", 0.2) ]
                        }
                    ]
                }
            ]
        }
    }))
}

// ============================================================
// flatten
// ============================================================

#[test]
fn flatten_single_leaf_scenario() {
    let tree = RawAnalysisTree(json!({
        "tree": { "children": [
            { "category": "personality", "id": "Openness", "percentage": 0.7 }
        ] }
    }));
    let traits = flatten(&tree).unwrap();
    assert_eq!(traits, map(&[("Openness", 0.7)]));
}

#[test]
fn flatten_collects_every_personality_leaf() {
    let traits = flatten(&realistic_tree()).unwrap();
    assert_eq!(traits.len(), 4);
    assert_eq!(traits["Adventurousness"], 0.42);
    assert_eq!(traits["Imagination"], 0.77);
    assert_eq!(traits["Altruism"], 0.33);
    assert_eq!(traits["Trust"], 0.64);
}

#[test]
fn flatten_omits_branch_nodes_and_other_categories() {
    let traits = flatten(&realistic_tree()).unwrap();
    for absent in ["Openness", "Agreeableness", "Openness_parent", "Challenge", "Tradition"] {
        assert!(!traits.contains_key(absent), "{absent} should not be collected");
    }
}

#[test]
fn flatten_handles_depth_beyond_four() {
    let mut node = leaf("personality", "Deep", 0.9);
    for _ in 0..12 {
        node = json!({ "children": [node] });
    }
    let tree = RawAnalysisTree(json!({ "tree": { "children": [node] } }));
    assert_eq!(flatten(&tree).unwrap(), map(&[("Deep", 0.9)]));
}

#[test]
fn flatten_omits_non_personality_at_every_depth() {
    let tree = RawAnalysisTree(json!({ "tree": { "children": [
        leaf("needs", "Top", 0.1),
        { "children": [ leaf("values", "Mid", 0.2), { "children": [ leaf("needs", "Low", 0.3) ] } ] }
    ] } }));
    assert!(flatten(&tree).unwrap().is_empty());
}

#[test]
fn flatten_empty_children_is_empty_map() {
    let tree = RawAnalysisTree(json!({ "tree": { "children": [] } }));
    assert!(flatten(&tree).unwrap().is_empty());

    let tree = RawAnalysisTree(json!({ "tree": { "children": [ { "children": [] } ] } }));
    assert!(flatten(&tree).unwrap().is_empty());
}

#[test]
fn flatten_is_deterministic() {
    let tree = realistic_tree();
    assert_eq!(flatten(&tree).unwrap(), flatten(&tree).unwrap());
}

#[test]
fn flatten_missing_percentage_is_malformed() {
    let tree = RawAnalysisTree(json!({ "tree": { "children": [
        { "category": "personality", "id": "Openness" }
    ] } }));
    match flatten(&tree).unwrap_err() {
        AffinityError::MalformedInput { path, reason } => {
            assert_eq!(path, "$.tree.children[0]");
            assert!(reason.contains("percentage"));
        }
        other => panic!("expected MalformedInput, got {other}"),
    }
}

#[test]
fn flatten_non_personality_leaf_needs_no_id() {
    // Only personality leaves have to carry id/percentage.
    let tree = RawAnalysisTree(json!({ "tree": { "children": [
        { "category": "needs" },
        leaf("personality", "Trust", 0.5)
    ] } }));
    assert_eq!(flatten(&tree).unwrap(), map(&[("Trust", 0.5)]));
}

#[test]
fn flatten_non_object_root_is_malformed() {
    let tree = RawAnalysisTree(json!([1, 2, 3]));
    assert!(matches!(
        flatten(&tree),
        Err(AffinityError::MalformedInput { .. })
    ));
}

// ============================================================
// compare
// ============================================================

#[test]
fn compare_scenario() {
    let a = map(&[("Openness", 0.7), ("Agreeableness", 0.3)]);
    let b = map(&[("Openness", 0.5), ("Agreeableness", 0.3)]);
    let diffs = compare(&a, &b).unwrap();
    assert_eq!(diffs.len(), 2);
    assert!((diffs["Openness"] - 0.2).abs() < 1e-9);
    assert_eq!(diffs["Agreeableness"], 0.0);
}

#[test]
fn compare_is_symmetric() {
    let a = map(&[("x", 0.91), ("y", 0.05), ("z", 0.5)]);
    let b = map(&[("z", 0.25), ("x", 0.13), ("y", 0.6)]);
    let ab = compare(&a, &b).unwrap();
    let ba = compare(&b, &a).unwrap();
    for (trait_id, diff) in &ab {
        assert_eq!(*diff, ba[trait_id]);
        assert_eq!(*diff, (a[trait_id] - b[trait_id]).abs());
    }
    assert_eq!(ab.len(), ba.len());
}

#[test]
fn compare_strict_fails_on_missing_key() {
    let a = map(&[("Openness", 0.7), ("Trust", 0.2)]);
    let b = map(&[("Openness", 0.5)]);
    match compare(&a, &b).unwrap_err() {
        AffinityError::KeyMismatch {
            trait_id,
            missing_from,
        } => {
            assert_eq!(trait_id, "Trust");
            assert_eq!(missing_from, Side::Second);
        }
        other => panic!("expected KeyMismatch, got {other}"),
    }
    // And the reverse direction fails too.
    assert!(matches!(
        compare(&b, &a),
        Err(AffinityError::KeyMismatch { .. })
    ));
}

#[test]
fn compare_intersect_keeps_shared_traits_only() {
    let a = map(&[("Openness", 0.7), ("Trust", 0.2)]);
    let b = map(&[("Openness", 0.5), ("Altruism", 0.9)]);
    let diffs = compare_with_policy(&a, &b, KeyPolicy::Intersect).unwrap();
    assert_eq!(diffs.len(), 1);
    assert!((diffs["Openness"] - 0.2).abs() < 1e-9);
}

#[test]
fn compare_fill_covers_union() {
    let a = map(&[("Openness", 0.7), ("Trust", 0.2)]);
    let b = map(&[("Openness", 0.5), ("Altruism", 0.9)]);
    let diffs = compare_with_policy(&a, &b, KeyPolicy::Fill(0.5)).unwrap();
    assert_eq!(diffs.len(), 3);
    assert!((diffs["Trust"] - 0.3).abs() < 1e-9);
    assert!((diffs["Altruism"] - 0.4).abs() < 1e-9);
}

#[test]
fn compare_empty_maps() {
    assert!(compare(&TraitMap::new(), &TraitMap::new()).unwrap().is_empty());
}

// ============================================================
// rank
// ============================================================

#[test]
fn rank_scenario() {
    let diffs: DifferenceMap = map(&[("A", 0.5), ("B", 0.1), ("C", 0.3)]);
    let ranked = rank(&diffs, 2);
    let pairs: Vec<(&str, f64)> = ranked
        .iter()
        .map(|r| (r.trait_id.as_str(), r.difference))
        .collect();
    assert_eq!(pairs, vec![("B", 0.1), ("C", 0.3)]);
}

#[test]
fn rank_is_ascending() {
    let diffs = map(&[("a", 0.9), ("b", 0.0), ("c", 0.45), ("d", 0.2), ("e", 0.7)]);
    let ranked = rank(&diffs, 10);
    for pair in ranked.windows(2) {
        assert!(pair[0].difference <= pair[1].difference);
    }
}

#[test]
fn rank_is_stable_for_ties() {
    let diffs = map(&[("z", 0.2), ("a", 0.1), ("m", 0.2), ("b", 0.1), ("c", 0.2)]);
    let order: Vec<String> = rank(&diffs, 5).into_iter().map(|r| r.trait_id).collect();
    assert_eq!(order, vec!["a", "b", "z", "m", "c"]);
}

#[test]
fn rank_limit_is_min_of_limit_and_len() {
    let diffs = map(&[("a", 0.3), ("b", 0.2), ("c", 0.1)]);
    for limit in 0..6 {
        assert_eq!(rank(&diffs, limit).len(), limit.min(3));
    }
}
