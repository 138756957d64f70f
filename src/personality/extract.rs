// Trait extraction: flattens a Personality Insights category tree.
//
// The analysis service returns a nested tree: `tree.children` holds the
// top-level categories (personality, needs, values), each of which nests
// further groups and finally leaf traits. Only leaves tagged with the
// "personality" category are collected. Branches are walked with an explicit
// stack so depth is unbounded.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TraitMap;
use crate::error::{AffinityError, Result};

/// The category tag that marks a leaf as a personality trait.
pub const PERSONALITY_CATEGORY: &str = "personality";

/// The analysis service's response, exactly as it came off the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAnalysisTree(pub Value);

impl RawAnalysisTree {
    /// Load a saved analysis document from disk.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        Ok(value.into())
    }
}

impl From<Value> for RawAnalysisTree {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A node of the category tree, classified by whether it carries `children`.
enum Node<'a> {
    Branch(&'a [Value]),
    Leaf(&'a serde_json::Map<String, Value>),
}

fn classify<'a>(value: &'a Value, path: &str) -> Result<Node<'a>> {
    let object = value
        .as_object()
        .ok_or_else(|| AffinityError::malformed(path, "expected an object"))?;

    match object.get("children") {
        Some(Value::Array(children)) => Ok(Node::Branch(children)),
        Some(_) => Err(AffinityError::malformed(
            format!("{path}.children"),
            "expected an array",
        )),
        None => Ok(Node::Leaf(object)),
    }
}

/// Flatten an analysis tree into a map of trait id → percentage.
///
/// Every reachable leaf whose `category` is "personality" contributes one
/// entry; other leaves are skipped. Entries appear in document order. Empty
/// `children` arrays are fine and contribute nothing.
pub fn flatten(tree: &RawAnalysisTree) -> Result<TraitMap> {
    let root = tree
        .0
        .get("tree")
        .ok_or_else(|| AffinityError::malformed("$", "missing key 'tree'"))?;

    let top_level = match classify(root, "$.tree")? {
        Node::Branch(children) => children,
        Node::Leaf(_) => {
            return Err(AffinityError::malformed(
                "$.tree",
                "missing key 'children'",
            ))
        }
    };

    let mut traits = TraitMap::new();

    // Children are pushed in reverse so they pop in document order.
    let mut stack: Vec<(String, &Value)> = top_level
        .iter()
        .enumerate()
        .rev()
        .map(|(i, child)| (format!("$.tree.children[{i}]"), child))
        .collect();

    while let Some((path, value)) = stack.pop() {
        match classify(value, &path)? {
            Node::Branch(children) => {
                stack.extend(
                    children
                        .iter()
                        .enumerate()
                        .rev()
                        .map(|(i, child)| (format!("{path}.children[{i}]"), child)),
                );
            }
            Node::Leaf(leaf) => {
                if let Some((id, score)) = personality_leaf(leaf, &path)? {
                    traits.insert(id, score);
                }
            }
        }
    }

    Ok(traits)
}

/// Read a leaf's trait entry, or `None` if it belongs to another category.
fn personality_leaf(
    leaf: &serde_json::Map<String, Value>,
    path: &str,
) -> Result<Option<(String, f64)>> {
    let category = leaf
        .get("category")
        .ok_or_else(|| AffinityError::malformed(path, "missing key 'category'"))?
        .as_str()
        .ok_or_else(|| AffinityError::malformed(format!("{path}.category"), "expected a string"))?;

    if category != PERSONALITY_CATEGORY {
        return Ok(None);
    }

    let id = leaf
        .get("id")
        .ok_or_else(|| AffinityError::malformed(path, "missing key 'id'"))?
        .as_str()
        .ok_or_else(|| AffinityError::malformed(format!("{path}.id"), "expected a string"))?;

    let percentage = leaf
        .get("percentage")
        .ok_or_else(|| AffinityError::malformed(path, "missing key 'percentage'"))?
        .as_f64()
        .ok_or_else(|| {
            AffinityError::malformed(format!("{path}.percentage"), "expected a number")
        })?;

    Ok(Some((id.to_string(), percentage)))
}
