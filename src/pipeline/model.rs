use serde::{Deserialize, Serialize};

use super::error::FatalConfigError;

/// Trained regressor producing one raw output per scaled row.
///
/// The raw output is on the training target's scale (log price); the
/// pipeline owns the inverse transform.
pub trait Regressor: Send + Sync {
    fn n_features(&self) -> usize;

    fn predict(&self, row: &[f64]) -> f64;
}

/// `intercept + Σ coefficients[i] * x[i]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn check(&self) -> Result<(), FatalConfigError> {
        if !self.intercept.is_finite() {
            return Err(FatalConfigError::InvalidModel(
                "intercept is not finite".to_string(),
            ));
        }
        if let Some(i) = self.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(FatalConfigError::InvalidModel(format!(
                "coefficient {} is not finite",
                i
            )));
        }
        Ok(())
    }
}

impl Regressor for LinearModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, row: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(row)
            .fold(self.intercept, |acc, (c, x)| acc + c * x)
    }
}

/// One node of a regression tree, stored in a flat array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Go to `left` when `x[feature] < threshold`, otherwise `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { leaf: f64 },
}

/// A regression tree. Node 0 is the root; every child index is greater
/// than its parent's, which rules out cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Leaf value reached by `row`, or NaN if the tree is malformed.
    pub fn evaluate(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf { leaf }) => return *leaf,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let Some(x) = row.get(*feature) else {
                        return f64::NAN;
                    };
                    let next = if *x < *threshold { *left } else { *right };
                    if next <= idx {
                        return f64::NAN;
                    }
                    idx = next;
                }
                None => return f64::NAN,
            }
        }
    }

    fn check(&self, tree_idx: usize, n_features: usize) -> Result<(), FatalConfigError> {
        if self.nodes.is_empty() {
            return Err(FatalConfigError::InvalidModel(format!(
                "tree {} has no nodes",
                tree_idx
            )));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return Err(FatalConfigError::InvalidModel(format!(
                            "tree {} node {}: leaf value is not finite",
                            tree_idx, i
                        )));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(FatalConfigError::InvalidModel(format!(
                            "tree {} node {}: feature index {} out of range (n_features = {})",
                            tree_idx, i, feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(FatalConfigError::InvalidModel(format!(
                            "tree {} node {}: threshold is not finite",
                            tree_idx, i
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(FatalConfigError::InvalidModel(format!(
                                "tree {} node {}: child index {} is invalid",
                                tree_idx, i, child
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Additive tree ensemble (gradient boosting): `base_score + Σ tree(x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub base_score: f64,
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn check(&self) -> Result<(), FatalConfigError> {
        if !self.base_score.is_finite() {
            return Err(FatalConfigError::InvalidModel(
                "base_score is not finite".to_string(),
            ));
        }
        if self.trees.is_empty() {
            return Err(FatalConfigError::InvalidModel(
                "ensemble has no trees".to_string(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.check(i, self.n_features)?;
        }
        Ok(())
    }
}

impl Regressor for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, row: &[f64]) -> f64 {
        self.trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.evaluate(row))
    }
}

/// On-disk model, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl ModelArtifact {
    pub fn check(&self) -> Result<(), FatalConfigError> {
        match self {
            ModelArtifact::Linear(m) => m.check(),
            ModelArtifact::TreeEnsemble(m) => m.check(),
        }
    }

    /// Short human description, e.g. "tree ensemble (4 trees)".
    pub fn summary(&self) -> String {
        match self {
            ModelArtifact::Linear(m) => {
                format!("linear ({} coefficients)", m.coefficients.len())
            }
            ModelArtifact::TreeEnsemble(m) => {
                let nodes: usize = m.trees.iter().map(|t| t.nodes.len()).sum();
                format!("tree ensemble ({} trees, {} nodes)", m.trees.len(), nodes)
            }
        }
    }
}

impl Regressor for ModelArtifact {
    fn n_features(&self) -> usize {
        match self {
            ModelArtifact::Linear(m) => m.n_features(),
            ModelArtifact::TreeEnsemble(m) => m.n_features(),
        }
    }

    fn predict(&self, row: &[f64]) -> f64 {
        match self {
            ModelArtifact::Linear(m) => m.predict(row),
            ModelArtifact::TreeEnsemble(m) => m.predict(row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Tree {
        Tree {
            nodes: vec![
                Node::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { leaf: left },
                Node::Leaf { leaf: right },
            ],
        }
    }

    #[test]
    fn test_linear_predict() {
        let model = LinearModel {
            intercept: 1.0,
            coefficients: vec![2.0, -1.0],
        };
        assert_eq!(model.predict(&[3.0, 4.0]), 3.0);
        assert_eq!(model.n_features(), 2);
    }

    #[test]
    fn test_tree_goes_left_below_threshold() {
        let tree = stump(0, 0.5, -1.0, 1.0);
        assert_eq!(tree.evaluate(&[0.4]), -1.0);
        // Equal to the threshold goes right.
        assert_eq!(tree.evaluate(&[0.5]), 1.0);
        assert_eq!(tree.evaluate(&[0.9]), 1.0);
    }

    #[test]
    fn test_ensemble_sums_trees() {
        let model = TreeEnsemble {
            base_score: 3.0,
            n_features: 2,
            trees: vec![stump(0, 0.0, 0.1, 0.2), stump(1, 0.0, 0.01, 0.02)],
        };
        model.check().unwrap();
        assert!((model.predict(&[-1.0, 1.0]) - 3.12).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_tree_evaluates_to_nan() {
        let tree = Tree {
            nodes: vec![Node::Split {
                feature: 0,
                threshold: 0.0,
                left: 5,
                right: 6,
            }],
        };
        assert!(tree.evaluate(&[1.0]).is_nan());
    }

    #[test]
    fn test_check_rejects_backward_child() {
        let model = TreeEnsemble {
            base_score: 0.0,
            n_features: 1,
            trees: vec![Tree {
                nodes: vec![
                    Node::Split {
                        feature: 0,
                        threshold: 0.0,
                        left: 1,
                        right: 0,
                    },
                    Node::Leaf { leaf: 1.0 },
                ],
            }],
        };
        let err = model.check().unwrap_err();
        assert!(err.to_string().contains("child index 0"));
    }

    #[test]
    fn test_check_rejects_feature_out_of_range() {
        let model = TreeEnsemble {
            base_score: 0.0,
            n_features: 1,
            trees: vec![stump(3, 0.0, 0.0, 0.0)],
        };
        assert!(model.check().is_err());
    }

    #[test]
    fn test_check_rejects_empty_ensemble() {
        let model = TreeEnsemble {
            base_score: 0.0,
            n_features: 8,
            trees: vec![],
        };
        assert!(model.check().is_err());
    }

    #[test]
    fn test_parse_tree_ensemble() {
        let json = r#"{
            "kind": "tree_ensemble",
            "base_score": 3.0,
            "n_features": 1,
            "trees": [[
                {"feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                {"leaf": -0.25},
                {"leaf": 0.25}
            ]]
        }"#;
        let model: ModelArtifact = serde_json::from_str(json).unwrap();
        model.check().unwrap();
        assert_eq!(model.n_features(), 1);
        assert_eq!(model.predict(&[1.0]), 3.25);
        assert_eq!(model.summary(), "tree ensemble (1 trees, 3 nodes)");
    }

    #[test]
    fn test_parse_linear() {
        let json = r#"{"kind": "linear", "intercept": 0.5, "coefficients": [1.0, 2.0]}"#;
        let model: ModelArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(model.predict(&[1.0, 1.0]), 3.5);
    }
}
