//! Regression trees of the rent ensemble
//!
//! Thresholds and leaf values are fixed-point integers at the model scale.

use serde::{Deserialize, Serialize};

/// A split or leaf node
///
/// Split nodes carry a feature index and point at two children by
/// position in the tree's node list. Leaf nodes use `-1` for both
/// children and the feature index, and carry `leaf`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Node {
    pub id: i32,
    pub left: i32,
    pub right: i32,
    #[serde(rename = "feature_idx", alias = "feature")]
    pub feature_idx: i32,
    pub threshold: i64,
    pub leaf: Option<i64>,
}

impl Node {
    /// Split on `feature_idx`: `value <= threshold` goes left
    pub fn split(id: i32, feature_idx: i32, threshold: i64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

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
        self.leaf.is_some()
    }

    fn child(&self, go_left: bool, len: usize) -> Option<usize> {
        let idx = if go_left { self.left } else { self.right };
        usize::try_from(idx).ok().filter(|&idx| idx < len)
    }
}

/// One weighted tree of the ensemble; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub weight: i64,
}

impl Tree {
    pub fn new(nodes: Vec<Node>, weight: i64) -> Self {
        Self { nodes, weight }
    }

    /// Walk from the root to a leaf and return its value.
    ///
    /// `features` must already be at the model scale. Returns `None` when
    /// the walk leaves the tree or does not reach a leaf within
    /// `nodes.len()` steps; validated trees always reach a leaf.
    pub fn evaluate(&self, features: &[i64]) -> Option<i64> {
        let mut idx = 0usize;

        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(idx)?;
            if let Some(value) = node.leaf {
                return Some(value);
            }

            let feature = usize::try_from(node.feature_idx)
                .ok()
                .and_then(|f| features.get(f))?;
            idx = node.child(*feature <= node.threshold, self.nodes.len())?;
        }

        None
    }

    /// Check child links and feature indices against `feature_count`
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                continue;
            }

            for (side, child) in [("left", node.left), ("right", node.right)] {
                // Children must come after their parent so every walk terminates.
                match usize::try_from(child) {
                    Ok(c) if c > i && c < self.nodes.len() => {}
                    _ => return Err(format!("node {i} has invalid {side} child {child}")),
                }
            }

            match usize::try_from(node.feature_idx) {
                Ok(f) if f < feature_count => {}
                _ => {
                    return Err(format!(
                        "node {i} splits on feature {} but the model has {feature_count}",
                        node.feature_idx
                    ))
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_split() -> Tree {
        Tree::new(
            vec![
                Node::split(0, 0, 1000, 1, 2),
                Node::leaf(1, 15_000),
                Node::leaf(2, 30_000),
            ],
            1,
        )
    }

    #[test]
    fn test_split_goes_left_on_equal() {
        let tree = area_split();
        assert_eq!(tree.evaluate(&[999]), Some(15_000));
        assert_eq!(tree.evaluate(&[1000]), Some(15_000));
        assert_eq!(tree.evaluate(&[1001]), Some(30_000));
    }

    #[test]
    fn test_missing_feature_yields_none() {
        assert_eq!(area_split().evaluate(&[]), None);
    }

    #[test]
    fn test_single_leaf_tree() {
        let tree = Tree::new(vec![Node::leaf(0, 42)], 1);
        assert_eq!(tree.evaluate(&[]), Some(42));
        assert!(tree.validate(0).is_ok());
    }

    #[test]
    fn test_validate_child_out_of_bounds() {
        let tree = Tree::new(
            vec![
                Node::split(0, 0, 50, 5, 2),
                Node::leaf(1, 100),
                Node::leaf(2, 200),
            ],
            1,
        );
        let err = tree.validate(9).unwrap_err();
        assert!(err.contains("left child"));
    }

    #[test]
    fn test_validate_rejects_backward_link() {
        let tree = Tree::new(
            vec![
                Node::split(0, 0, 50, 1, 2),
                Node::split(1, 0, 10, 0, 2),
                Node::leaf(2, 200),
            ],
            1,
        );
        assert!(tree.validate(9).is_err());
    }

    #[test]
    fn test_validate_feature_index_against_count() {
        let tree = Tree::new(
            vec![
                Node::split(0, 9, 50, 1, 2),
                Node::leaf(1, 100),
                Node::leaf(2, 200),
            ],
            1,
        );
        assert!(tree.validate(9).is_err());
        assert!(tree.validate(10).is_ok());
    }

    #[test]
    fn test_validate_empty_tree() {
        assert!(Tree::new(Vec::new(), 1).validate(9).is_err());
    }
}
