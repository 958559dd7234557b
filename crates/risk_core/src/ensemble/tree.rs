//! Decision tree structures for ensemble scoring
//!
//! Thresholds and leaf values are fixed-point integers at the model scale.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// Internal nodes have `feature_idx >= 0`, valid `left`/`right` children and
/// `leaf == None`. Leaves have `feature_idx == -1` and carry `leaf`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Node {
    /// Node ID (informational, not used in traversal)
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Column index to split on (-1 for leaf nodes)
    #[serde(rename = "feature_idx", alias = "feature")]
    pub feature_idx: i32,

    /// Split threshold (fixed-point)
    pub threshold: i64,

    /// Leaf value (fixed-point)
    pub leaf: Option<i64>,
}

impl Node {
    /// Create an internal (split) node
    pub fn internal(id: i32, feature_idx: i32, threshold: i64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    /// Create a leaf node
    pub fn leaf(id: i32, value: i64) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0,
            leaf: Some(value),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// Outcome of walking a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Reached a leaf with this value
    Leaf(i64),
    /// Split referenced a column the row does not have
    MissingFeature(usize),
    /// Child index out of range or leaf without value
    Malformed(usize),
}

/// A single decision tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,

    /// Weight of this tree in the ensemble sum (fixed-point)
    pub weight: i64,
}

impl Tree {
    pub fn new(nodes: Vec<Node>, weight: i64) -> Self {
        Self { nodes, weight }
    }

    /// Walk from the root to a leaf; equal values go left
    pub fn traverse(&self, features: &[i64]) -> Traversal {
        let mut idx = 0usize;

        // A well-formed tree never visits more nodes than it has.
        for _ in 0..=self.nodes.len() {
            let Some(node) = self.nodes.get(idx) else {
                return Traversal::Malformed(idx);
            };

            if node.is_leaf() {
                return match node.leaf {
                    Some(value) => Traversal::Leaf(value),
                    None => Traversal::Malformed(idx),
                };
            }

            let feature_idx = node.feature_idx as usize;
            let Some(&value) = features.get(feature_idx) else {
                return Traversal::MissingFeature(feature_idx);
            };

            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            if next < 0 {
                return Traversal::Malformed(idx);
            }
            idx = next as usize;
        }

        Traversal::Malformed(idx)
    }

    /// Highest column index referenced by a split
    pub fn max_feature_index(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter(|node| !node.is_leaf())
            .map(|node| node.feature_idx as usize)
            .max()
    }

    /// Validate tree structure
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                if node.leaf.is_none() {
                    return Err(format!("Leaf node {i} has no leaf value"));
                }
                continue;
            }

            if node.left < 0 || node.left as usize >= self.nodes.len() {
                return Err(format!("Node {} has invalid left child: {}", i, node.left));
            }
            if node.right < 0 || node.right as usize >= self.nodes.len() {
                return Err(format!("Node {} has invalid right child: {}", i, node.right));
            }
            // Children always come after their parent, which rules out cycles.
            if node.left as usize <= i || node.right as usize <= i {
                return Err(format!("Node {i} points back to an earlier node"));
            }
            if node.feature_idx < 0 {
                return Err(format!(
                    "Internal node {} has invalid feature index: {}",
                    i, node.feature_idx
                ));
            }
        }

        Ok(())
    }
}
