use serde::{Deserialize, Serialize};

use crate::error::TrainingError;
use crate::ml::Regressor;
use crate::models::{FeatureVector, FEATURE_COUNT};

/// Minimum impurity decrease for a split to be kept
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

/// Growth limits for the regression tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 20,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        value: f64,
        samples: usize,
    },
    /// Rows with `x[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// CART regression tree with squared-error splits
///
/// Nodes live in a flat array; the root is node 0 and children always have
/// a larger index than their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    params: TreeParams,
    nodes: Vec<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    cost: f64,
}

impl DecisionTreeRegressor {
    /// Fit a tree on `rows` and their `targets`
    pub fn fit(
        rows: &[FeatureVector],
        targets: &[f64],
        params: TreeParams,
    ) -> Result<Self, TrainingError> {
        if rows.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }
        if rows.len() != targets.len() {
            return Err(TrainingError::ShapeMismatch {
                rows: rows.len(),
                targets: targets.len(),
            });
        }

        let mut tree = Self {
            params,
            nodes: Vec::new(),
        };
        tree.grow(rows, targets, (0..rows.len()).collect(), 0);

        tracing::debug!(
            "Fitted regression tree: {} nodes, depth {}",
            tree.nodes.len(),
            tree.depth()
        );

        Ok(tree)
    }

    pub fn params(&self) -> TreeParams {
        self.params
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Depth of the deepest leaf; a single-leaf tree has depth 0
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];

        while let Some((idx, depth)) = stack.pop() {
            match self.nodes.get(idx) {
                Some(Node::Split { left, right, .. }) => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
                Some(Node::Leaf { .. }) => max_depth = max_depth.max(depth),
                None => {}
            }
        }

        max_depth
    }

    /// Check the structure of a tree read from disk
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!("node {} splits on unknown feature {}", idx, feature));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", idx));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", idx, child));
                        }
                    }
                }
                Node::Leaf { value, .. } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} has a non-finite value", idx));
                    }
                }
            }
        }

        Ok(())
    }

    /// Predict the target for one feature vector
    pub fn predict_one(&self, features: &FeatureVector) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn predict_many(&self, rows: &[FeatureVector]) -> Vec<f64> {
        rows.iter().map(|r| self.predict_one(r)).collect()
    }

    fn grow(
        &mut self,
        rows: &[FeatureVector],
        targets: &[f64],
        indices: Vec<usize>,
        depth: usize,
    ) -> usize {
        let node_idx = self.nodes.len();
        let samples = indices.len();
        let value = indices.iter().map(|&i| targets[i]).sum::<f64>() / samples as f64;
        self.nodes.push(Node::Leaf { value, samples });

        if depth >= self.params.max_depth || samples < self.params.min_samples_split {
            return node_idx;
        }

        let Some(split) = self.best_split(rows, targets, &indices) else {
            return node_idx;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| rows[i].get(split.feature) <= split.threshold);

        let left = self.grow(rows, targets, left_rows, depth + 1);
        let right = self.grow(rows, targets, right_rows, depth + 1);

        self.nodes[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };

        node_idx
    }

    /// Split minimizing the summed squared error of both children
    fn best_split(
        &self,
        rows: &[FeatureVector],
        targets: &[f64],
        indices: &[usize],
    ) -> Option<BestSplit> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        if n < 2 * min_leaf {
            return None;
        }

        let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
        let parent_cost = total_sq - total_sum * total_sum / n as f64;

        let mut best: Option<BestSplit> = None;
        let mut sorted = indices.to_vec();

        for feature in 0..FEATURE_COUNT {
            sorted.sort_by(|&a, &b| rows[a].get(feature).total_cmp(&rows[b].get(feature)));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for pos in 1..n {
                let prev = sorted[pos - 1];
                left_sum += targets[prev];
                left_sq += targets[prev] * targets[prev];

                if pos < min_leaf || n - pos < min_leaf {
                    continue;
                }

                let lo = rows[prev].get(feature);
                let hi = rows[sorted[pos]].get(feature);
                if lo >= hi {
                    continue;
                }

                let left_n = pos as f64;
                let right_n = (n - pos) as f64;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let cost = (left_sq - left_sum * left_sum / left_n)
                    + (right_sq - right_sum * right_sum / right_n);

                if best.as_ref().map_or(true, |b| cost < b.cost) {
                    best = Some(BestSplit {
                        feature,
                        threshold: lo + (hi - lo) / 2.0,
                        cost,
                    });
                }
            }
        }

        best.filter(|b| parent_cost - b.cost > MIN_IMPURITY_DECREASE)
    }
}

impl Regressor for DecisionTreeRegressor {
    fn predict(&self, features: &FeatureVector) -> f64 {
        self.predict_one(features)
    }

    fn name(&self) -> &str {
        "decision_tree"
    }
}
