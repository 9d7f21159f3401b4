//! Random-forest classifier evaluated from decision-tree node arrays
//!
//! Trees use the flat layout produced by scikit-learn: parallel arrays of
//! left child, right child, split feature, split threshold and per-node class
//! counts, with `-1` children marking a leaf.

use crate::classifier::Classifier;
use phishguard_core::{Error, ProbabilityPair, Result};
use serde::{Deserialize, Serialize};

/// Child index that marks a leaf node
pub const LEAF: i64 = -1;

/// Serialized form of one decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights, `[unsafe, safe]`
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        probabilities: [f64; 2],
    },
}

/// A validated decision tree ready for evaluation
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Validate and compile a serialized tree.
    ///
    /// Children must point strictly forward, which rules out cycles and
    /// guarantees every walk ends at a leaf.
    pub fn from_artifact(artifact: &TreeArtifact, n_features: usize) -> Result<Self> {
        let n = artifact.children_left.len();
        if n == 0 {
            return Err(Error::model("decision tree has no nodes"));
        }
        if artifact.children_right.len() != n
            || artifact.feature.len() != n
            || artifact.threshold.len() != n
            || artifact.value.len() != n
        {
            return Err(Error::model(format!(
                "decision tree node arrays differ in length (expected {})",
                n
            )));
        }

        let mut nodes = Vec::with_capacity(n);
        for idx in 0..n {
            let left = artifact.children_left[idx];
            let right = artifact.children_right[idx];

            let node = if left == LEAF && right == LEAF {
                Node::Leaf {
                    probabilities: normalize(&artifact.value[idx], idx)?,
                }
            } else {
                let left = child_index(left, idx, n)?;
                let right = child_index(right, idx, n)?;

                let feature = usize::try_from(artifact.feature[idx])
                    .ok()
                    .filter(|f| *f < n_features)
                    .ok_or_else(|| {
                        Error::model(format!(
                            "node {} splits on feature {} but the schema has {} features",
                            idx, artifact.feature[idx], n_features
                        ))
                    })?;

                let threshold = artifact.threshold[idx];
                if !threshold.is_finite() {
                    return Err(Error::model(format!(
                        "node {} has non-finite threshold",
                        idx
                    )));
                }

                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }
            };

            nodes.push(node);
        }

        Ok(Self { nodes })
    }

    /// Class probabilities of the leaf `features` falls into.
    ///
    /// Values are rounded through `f32` before comparison, matching the
    /// single-precision inputs the trees were trained on.
    pub fn predict(&self, features: &[f64]) -> [f64; 2] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { probabilities } => return *probabilities,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features[*feature] as f32 as f64;
                    idx = if x <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

fn child_index(child: i64, parent: usize, n: usize) -> Result<usize> {
    usize::try_from(child)
        .ok()
        .filter(|c| *c > parent && *c < n)
        .ok_or_else(|| {
            Error::model(format!(
                "node {} has invalid child {} (tree has {} nodes)",
                parent, child, n
            ))
        })
}

fn normalize(weights: &[f64], idx: usize) -> Result<[f64; 2]> {
    let [unsafe_w, safe_w] = <[f64; 2]>::try_from(weights).map_err(|_| {
        Error::model(format!(
            "leaf {} has {} class weights, expected 2",
            idx,
            weights.len()
        ))
    })?;

    let total = unsafe_w + safe_w;
    if !(unsafe_w >= 0.0 && safe_w >= 0.0 && total > 0.0 && total.is_finite()) {
        return Err(Error::model(format!(
            "leaf {} has invalid class weights [{}, {}]",
            idx, unsafe_w, safe_w
        )));
    }

    Ok([unsafe_w / total, safe_w / total])
}

/// Ensemble of decision trees; probabilities are the mean over trees
#[derive(Debug, Clone)]
pub struct RandomForest {
    name: String,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Compile serialized trees into a forest over `n_features` inputs
    pub fn from_artifacts(
        name: impl Into<String>,
        trees: &[TreeArtifact],
        n_features: usize,
    ) -> Result<Self> {
        if trees.is_empty() {
            return Err(Error::model("random forest has no trees"));
        }

        let trees = trees
            .iter()
            .enumerate()
            .map(|(i, tree)| {
                DecisionTree::from_artifact(tree, n_features).map_err(|e| match e {
                    Error::Model(msg) => Error::model(format!("tree {}: {}", i, msg)),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.into(),
            trees,
            n_features,
        })
    }

    /// Number of trees in the ensemble
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForest {
    fn predict_proba(&self, features: &[f64]) -> Result<ProbabilityPair> {
        if features.len() != self.n_features {
            return Err(Error::computation(format!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }

        let mut totals = [0.0_f64; 2];
        for tree in &self.trees {
            let [unsafe_p, safe_p] = tree.predict(features);
            totals[0] += unsafe_p;
            totals[1] += safe_p;
        }

        let count = self.trees.len() as f64;
        Ok(ProbabilityPair::new(totals[0] / count, totals[1] / count))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}
