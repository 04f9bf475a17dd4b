use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ModelError;

/// Current model file format.
pub const BDT_MODEL_VERSION: i64 = 1;

/// How tree outputs are combined into one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostType {
    /// Weighted mean of leaf values in `[-1, 1]`.
    AdaBoost,
    /// Sum of leaf responses mapped through `2/(1+exp(-2x)) - 1`.
    Grad,
}

/// One node of a flattened decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        cut: f32,
        /// Go right when `(value >= cut) == cut_type`.
        cut_type: bool,
        left: usize,
        right: usize,
    },
    Leaf {
        /// `1` for signal, `-1` for background.
        node_type: i8,
        purity: f32,
        #[serde(default)]
        response: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    #[serde(default = "unit_weight")]
    pub weight: f64,
    /// Root first; children always come after their parent.
    pub nodes: Vec<Node>,
}

fn unit_weight() -> f64 {
    1.0
}

impl Tree {
    /// The leaf reached by `features`.
    fn leaf(&self, features: &[f32]) -> Option<&Node> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx)? {
                Node::Split {
                    feature,
                    cut,
                    cut_type,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    idx = if (value >= *cut) == *cut_type {
                        *right
                    } else {
                        *left
                    };
                }
                leaf @ Node::Leaf { .. } => return Some(leaf),
            }
        }
    }
}

/// Boosted decision-tree classifier loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BdtModel {
    pub model_version: i64,
    /// Ordered input variable names.
    pub variables: Vec<String>,
    /// Passthrough spectator names; never read during evaluation.
    #[serde(default)]
    pub spectators: Vec<String>,
    pub boost: BoostType,
    /// AdaBoost only: use the ±1 leaf type instead of the purity.
    #[serde(default = "default_yes_no_leaf")]
    pub use_yes_no_leaf: bool,
    pub trees: Vec<Tree>,
}

fn default_yes_no_leaf() -> bool {
    true
}

impl BdtModel {
    /// Check the structure of every tree.
    pub fn validate(&self) -> Result<(), String> {
        if self.model_version != BDT_MODEL_VERSION {
            return Err(format!(
                "Unsupported model_version {} (expected {BDT_MODEL_VERSION})",
                self.model_version
            ));
        }
        if self.variables.is_empty() {
            return Err("Model declares no variables".to_string());
        }
        if self.trees.is_empty() {
            return Err("Model contains no trees".to_string());
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            if !tree.weight.is_finite() {
                return Err(format!("Tree {tree_idx} has non-finite weight"));
            }
            if tree.nodes.is_empty() {
                return Err(format!("Tree {tree_idx} has no nodes"));
            }
            for (node_idx, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= self.variables.len() {
                            return Err(format!(
                                "Tree {tree_idx} node {node_idx} uses variable {feature} of {}",
                                self.variables.len()
                            ));
                        }
                        for child in [*left, *right] {
                            if child <= node_idx || child >= tree.nodes.len() {
                                return Err(format!(
                                    "Tree {tree_idx} node {node_idx} has invalid child {child}"
                                ));
                            }
                        }
                    }
                    Node::Leaf { node_type, .. } => {
                        if self.boost == BoostType::AdaBoost
                            && self.use_yes_no_leaf
                            && !matches!(node_type, -1 | 1)
                        {
                            return Err(format!(
                                "Tree {tree_idx} leaf {node_idx} has node_type {node_type}"
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Load and validate a model from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_slice(&bytes).map_err(|source| ModelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        model.validate().map_err(|reason| ModelError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(model)
    }

    /// Classifier score for a feature vector ordered like `variables`.
    pub fn evaluate(&self, features: &[f32]) -> f32 {
        match self.boost {
            BoostType::AdaBoost => {
                let mut sum = 0.0;
                let mut norm = 0.0;
                for tree in &self.trees {
                    let value = match tree.leaf(features) {
                        Some(Node::Leaf {
                            node_type, purity, ..
                        }) => {
                            if self.use_yes_no_leaf {
                                f64::from(*node_type)
                            } else {
                                f64::from(*purity)
                            }
                        }
                        _ => 0.0,
                    };
                    sum += tree.weight * value;
                    norm += tree.weight;
                }
                if norm > 0.0 { (sum / norm) as f32 } else { 0.0 }
            }
            BoostType::Grad => {
                let sum: f64 = self
                    .trees
                    .iter()
                    .map(|tree| match tree.leaf(features) {
                        Some(Node::Leaf { response, .. }) => f64::from(*response),
                        _ => 0.0,
                    })
                    .sum();
                (2.0 / (1.0 + (-2.0 * sum).exp()) - 1.0) as f32
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(node_type: i8, purity: f32, response: f32) -> Node {
        Node::Leaf {
            node_type,
            purity,
            response,
        }
    }

    fn stump(feature: usize, cut: f32, low: Node, high: Node, weight: f64) -> Tree {
        Tree {
            weight,
            nodes: vec![
                Node::Split {
                    feature,
                    cut,
                    cut_type: true,
                    left: 1,
                    right: 2,
                },
                low,
                high,
            ],
        }
    }

    fn model(boost: BoostType, trees: Vec<Tree>) -> BdtModel {
        BdtModel {
            model_version: BDT_MODEL_VERSION,
            variables: vec!["a".into(), "b".into()],
            spectators: Vec::new(),
            boost,
            use_yes_no_leaf: true,
            trees,
        }
    }

    #[test]
    fn ada_boost_weights_yes_no_leaves() {
        let bdt = model(BoostType::AdaBoost, vec![
            stump(0, 0.5, leaf(-1, 0.2, 0.0), leaf(1, 0.8, 0.0), 3.0),
            stump(1, 0.0, leaf(-1, 0.3, 0.0), leaf(1, 0.7, 0.0), 1.0),
        ]);
        assert_eq!(bdt.evaluate(&[1.0, 1.0]), 1.0);
        assert_eq!(bdt.evaluate(&[0.0, -1.0]), -1.0);
        assert_eq!(bdt.evaluate(&[1.0, -1.0]), 0.5);
        assert_eq!(bdt.evaluate(&[0.5, -1.0]), 0.5);
    }

    #[test]
    fn ada_boost_can_use_purity() {
        let mut bdt = model(BoostType::AdaBoost, vec![stump(
            0,
            0.5,
            leaf(-1, 0.25, 0.0),
            leaf(1, 0.75, 0.0),
            2.0,
        )]);
        bdt.use_yes_no_leaf = false;
        assert_eq!(bdt.evaluate(&[0.0, 0.0]), 0.25);
        assert_eq!(bdt.evaluate(&[1.0, 0.0]), 0.75);
    }

    #[test]
    fn grad_boost_maps_sum_through_sigmoid() {
        let bdt = model(BoostType::Grad, vec![
            stump(0, 0.5, leaf(-1, 0.0, -0.2), leaf(1, 0.0, 0.3), 1.0),
            stump(1, 0.5, leaf(-1, 0.0, -0.1), leaf(1, 0.0, 0.4), 1.0),
        ]);
        let expected = 2.0 / (1.0 + (-2.0_f64 * 0.7).exp()) - 1.0;
        assert!((f64::from(bdt.evaluate(&[1.0, 1.0])) - expected).abs() < 1e-6);
        assert!(bdt.evaluate(&[0.0, 0.0]) < 0.0);
    }

    #[test]
    fn inverted_cut_type_swaps_branches() {
        let mut tree = stump(0, 0.5, leaf(-1, 0.0, 0.0), leaf(1, 0.0, 0.0), 1.0);
        if let Node::Split { cut_type, .. } = &mut tree.nodes[0] {
            *cut_type = false;
        }
        let bdt = model(BoostType::AdaBoost, vec![tree]);
        assert_eq!(bdt.evaluate(&[1.0, 0.0]), -1.0);
        assert_eq!(bdt.evaluate(&[0.0, 0.0]), 1.0);
    }

    #[test]
    fn nan_input_goes_left() {
        let bdt = model(BoostType::AdaBoost, vec![stump(
            0,
            0.5,
            leaf(-1, 0.0, 0.0),
            leaf(1, 0.0, 0.0),
            1.0,
        )]);
        assert_eq!(bdt.evaluate(&[f32::NAN, 0.0]), -1.0);
    }

    #[test]
    fn validate_rejects_backward_child() {
        let mut tree = stump(0, 0.5, leaf(-1, 0.0, 0.0), leaf(1, 0.0, 0.0), 1.0);
        if let Node::Split { left, .. } = &mut tree.nodes[0] {
            *left = 0;
        }
        let err = model(BoostType::AdaBoost, vec![tree]).validate().unwrap_err();
        assert!(err.contains("invalid child"), "{err}");
    }

    #[test]
    fn validate_rejects_unknown_variable() {
        let tree = stump(5, 0.5, leaf(-1, 0.0, 0.0), leaf(1, 0.0, 0.0), 1.0);
        let err = model(BoostType::AdaBoost, vec![tree]).validate().unwrap_err();
        assert!(err.contains("variable 5"), "{err}");
    }

    #[test]
    fn json_format_reads_back() {
        let json = r#"{
            "model_version": 1,
            "variables": ["a", "b"],
            "spectators": ["pt"],
            "boost": "ada_boost",
            "trees": [{
                "weight": 0.5,
                "nodes": [
                    {"split": {"feature": 1, "cut": 2.0, "cut_type": true, "left": 1, "right": 2}},
                    {"leaf": {"node_type": -1, "purity": 0.1}},
                    {"leaf": {"node_type": 1, "purity": 0.9}}
                ]
            }]
        }"#;
        let bdt: BdtModel = serde_json::from_str(json).unwrap();
        bdt.validate().unwrap();
        assert!(bdt.use_yes_no_leaf);
        assert_eq!(bdt.evaluate(&[0.0, 3.0]), 1.0);
    }
}
