//! Random forest of binary decision trees.
//!
//! Nodes are stored flat; node 0 is the root. A split sends a row left when
//! `x[feature] <= threshold`. Leaves hold per-class weights (sample counts or
//! fractions); each tree votes with its normalized leaf weights and the
//! forest averages the votes.

use serde::{Deserialize, Serialize};

use super::check_feature_count;
use crate::error::InferenceError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: [f64; 2],
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, input_dim: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= input_dim {
                        return Err(format!(
                            "node {idx} splits on feature {feature}, input_dim is {input_dim}"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx} threshold is not finite"));
                    }
                    // Children must point forward, which also rules out cycles.
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(format!("node {idx} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(format!("leaf {idx} weights must be finite and >= 0"));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {idx} weights sum to zero"));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Some(TreeNode::Leaf { value }) => {
                    let total = value[0] + value[1];
                    return Ok([value[0] / total, value[1] / total]);
                }
                None => {
                    return Err(InferenceError::Evaluation(format!(
                        "tree node {idx} out of range"
                    )))
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Row width. Usually left out of artifacts and filled by [`RandomForest::resolve_input_dim`].
    #[serde(default)]
    pub input_dim: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fill a missing `input_dim` from the model's feature count, else from the
    /// highest split feature.
    pub fn resolve_input_dim(&mut self, feature_count: Option<usize>) {
        if self.input_dim != 0 {
            return;
        }
        self.input_dim = feature_count.unwrap_or_else(|| {
            self.trees
                .iter()
                .flat_map(|t| &t.nodes)
                .filter_map(|node| match node {
                    TreeNode::Split { feature, .. } => Some(feature + 1),
                    TreeNode::Leaf { .. } => None,
                })
                .max()
                .unwrap_or(0)
        });
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.input_dim == 0 {
            return Err("input_dim must be > 0".to_string());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.input_dim)
                .map_err(|e| format!("tree[{idx}]: {e}"))?;
        }
        Ok(())
    }

    pub fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        check_feature_count(features.len(), self.input_dim)?;
        let mut sum = [0.0_f64; 2];
        for tree in &self.trees {
            let [p0, p1] = tree.leaf_proba(features)?;
            sum[0] += p0;
            sum[1] += p1;
        }
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}
