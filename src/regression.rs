//! Pre-trained salary model.
//!
//! The model is exported from the training notebook as JSON, tagged by
//! `kind`:
//!
//! ```json
//! { "kind": "linear", "intercept": 1650.0,
//!   "domain_coefficients": { "Sciences": 180.0 },
//!   "region_coefficients": { "Île-de-France": 320.0 } }
//!
//! { "kind": "random_forest",
//!   "encoder": { "domains": ["Droit", "Sciences"], "regions": ["Bretagne"] },
//!   "trees": [ { "nodes": [
//!       { "feature": 1, "threshold": 0.5, "left": 1, "right": 2 },
//!       { "value": 1800.0 },
//!       { "value": 2100.0 } ] } ] }
//! ```
//!
//! Inputs are one-hot encoded as `[domains..., regions...]`. Categories
//! unseen at training time encode as all zeros, so `predict` is total.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("random forest has no trees")]
    EmptyForest,
    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },
    #[error("tree {tree}, node {node}: child {child} is out of range or not after its parent")]
    BadChild { tree: usize, node: usize, child: usize },
    #[error("tree {tree}, node {node}: feature {feature} exceeds encoder width {width}")]
    BadFeature { tree: usize, node: usize, feature: usize, width: usize },
    #[error("non-finite parameter in {0}")]
    NonFinite(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SalaryModel {
    Linear(LinearModel),
    RandomForest(RandomForest),
}

impl SalaryModel {
    /// Read and validate a model file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).context("reading model file")?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let model: SalaryModel = serde_json::from_str(text).context("parsing model JSON")?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            SalaryModel::Linear(m) => m.validate(),
            SalaryModel::RandomForest(m) => m.validate(),
        }
    }

    /// Estimated monthly median salary (€).
    pub fn predict(&self, domain: &str, region: &str) -> f64 {
        match self {
            SalaryModel::Linear(m) => m.predict(domain, region),
            SalaryModel::RandomForest(m) => m.predict(domain, region),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SalaryModel::Linear(_) => "linear",
            SalaryModel::RandomForest(_) => "random forest",
        }
    }
}

// ---------------------------------------------------------------------------
// Linear model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    #[serde(default)]
    pub domain_coefficients: BTreeMap<String, f64>,
    #[serde(default)]
    pub region_coefficients: BTreeMap<String, f64>,
}

impl LinearModel {
    fn validate(&self) -> Result<(), ModelError> {
        if !self.intercept.is_finite() {
            return Err(ModelError::NonFinite("intercept".into()));
        }
        for (name, c) in self.domain_coefficients.iter().chain(&self.region_coefficients) {
            if !c.is_finite() {
                return Err(ModelError::NonFinite(format!("coefficient '{name}'")));
            }
        }
        Ok(())
    }

    pub fn predict(&self, domain: &str, region: &str) -> f64 {
        self.intercept
            + self.domain_coefficients.get(domain).copied().unwrap_or(0.0)
            + self.region_coefficients.get(region).copied().unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Random forest
// ---------------------------------------------------------------------------

/// Category vocabularies of the one-hot encoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub domains: Vec<String>,
    pub regions: Vec<String>,
}

impl OneHotEncoder {
    pub fn width(&self) -> usize {
        self.domains.len() + self.regions.len()
    }

    pub fn encode(&self, domain: &str, region: &str) -> Vec<f64> {
        let mut x = vec![0.0; self.width()];
        if let Some(i) = self.domains.iter().position(|d| d == domain) {
            x[i] = 1.0;
        }
        if let Some(j) = self.regions.iter().position(|r| r == region) {
            x[self.domains.len() + j] = 1.0;
        }
        x
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// One regression tree; node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Walk from the root; `x[feature] <= threshold` goes left.
    ///
    /// Children always follow their parent (checked by `validate`), so the
    /// walk ends after at most `nodes.len()` steps.
    fn evaluate(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return *value,
                Some(TreeNode::Split { feature, threshold, left, right }) => {
                    let v = x.get(*feature).copied().unwrap_or(0.0);
                    idx = if v <= *threshold { *left } else { *right };
                }
                None => break,
            }
        }
        f64::NAN
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub encoder: OneHotEncoder,
    pub trees: Vec<RegressionTree>,
}

impl RandomForest {
    fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::EmptyForest);
        }
        let width = self.encoder.width();
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ModelError::EmptyTree { tree: t });
            }
            for (n, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Leaf { value } => {
                        if !value.is_finite() {
                            return Err(ModelError::NonFinite(format!("tree {t}, node {n}")));
                        }
                    }
                    TreeNode::Split { feature, threshold, left, right } => {
                        if *feature >= width {
                            return Err(ModelError::BadFeature { tree: t, node: n, feature: *feature, width });
                        }
                        if !threshold.is_finite() {
                            return Err(ModelError::NonFinite(format!("tree {t}, node {n}")));
                        }
                        for &child in [left, right] {
                            if child <= n || child >= tree.nodes.len() {
                                return Err(ModelError::BadChild { tree: t, node: n, child });
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Mean of the tree outputs.
    pub fn predict(&self, domain: &str, region: &str) -> f64 {
        let x = self.encoder.encode(domain, region);
        let sum: f64 = self.trees.iter().map(|t| t.evaluate(&x)).sum();
        sum / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOREST: &str = r#"{
        "kind": "random_forest",
        "encoder": { "domains": ["Droit", "Sciences"], "regions": ["Bretagne", "Île-de-France"] },
        "trees": [
            { "nodes": [
                { "feature": 1, "threshold": 0.5, "left": 1, "right": 2 },
                { "value": 1800.0 },
                { "value": 2100.0 } ] },
            { "nodes": [
                { "feature": 3, "threshold": 0.5, "left": 1, "right": 2 },
                { "value": 1900.0 },
                { "value": 2500.0 } ] }
        ]
    }"#;

    #[test]
    fn forest_averages_trees() {
        let model = SalaryModel::from_json(FOREST).unwrap();
        assert_eq!(model.kind(), "random forest");
        assert_eq!(model.predict("Droit", "Bretagne"), (1800.0 + 1900.0) / 2.0);
        assert_eq!(model.predict("Sciences", "Île-de-France"), (2100.0 + 2500.0) / 2.0);
    }

    #[test]
    fn unseen_categories_still_predict() {
        let model = SalaryModel::from_json(FOREST).unwrap();
        let y = model.predict("Inconnu", "Nulle part");
        assert!(y.is_finite());
        assert_eq!(y, (1800.0 + 1900.0) / 2.0);
    }

    #[test]
    fn every_training_pair_is_numeric() {
        let model = SalaryModel::from_json(FOREST).unwrap();
        for d in ["Droit", "Sciences"] {
            for r in ["Bretagne", "Île-de-France"] {
                assert!(model.predict(d, r).is_finite());
            }
        }
    }

    #[test]
    fn linear_model_adds_coefficients() {
        let model = SalaryModel::from_json(
            r#"{ "kind": "linear", "intercept": 1500.0,
                 "domain_coefficients": { "Sciences": 200.0 },
                 "region_coefficients": { "Bretagne": -50.0 } }"#,
        )
        .unwrap();
        assert_eq!(model.predict("Sciences", "Bretagne"), 1650.0);
        assert_eq!(model.predict("Droit", "Corse"), 1500.0);
    }

    #[test]
    fn cyclic_tree_is_rejected() {
        let text = r#"{ "kind": "random_forest",
            "encoder": { "domains": ["A"], "regions": ["B"] },
            "trees": [ { "nodes": [
                { "feature": 0, "threshold": 0.5, "left": 0, "right": 1 },
                { "value": 1.0 } ] } ] }"#;
        let model: SalaryModel = serde_json::from_str(text).unwrap();
        assert_eq!(model.validate(), Err(ModelError::BadChild { tree: 0, node: 0, child: 0 }));
    }

    #[test]
    fn out_of_range_feature_is_rejected() {
        let text = r#"{ "kind": "random_forest",
            "encoder": { "domains": ["A"], "regions": ["B"] },
            "trees": [ { "nodes": [
                { "feature": 5, "threshold": 0.5, "left": 1, "right": 2 },
                { "value": 1.0 }, { "value": 2.0 } ] } ] }"#;
        let model: SalaryModel = serde_json::from_str(text).unwrap();
        assert!(matches!(model.validate(), Err(ModelError::BadFeature { feature: 5, .. })));
    }

    #[test]
    fn empty_forest_is_rejected() {
        let err = SalaryModel::from_json(r#"{ "kind": "random_forest", "encoder": { "domains": [], "regions": [] }, "trees": [] }"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("no trees"));
    }
}
