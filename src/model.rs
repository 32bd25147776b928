//! Binary churn classifiers backed by linfa

use crate::error::ModelError;
use linfa::prelude::*;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Anything that can be fitted on encoded features and 0/1 labels.
///
/// The encoding pipeline never depends on which implementation is used.
pub trait Classifier {
    fn name(&self) -> &'static str;

    fn fit(
        &self,
        features: &Array2<f64>,
        labels: &Array1<usize>,
    ) -> Result<FittedModel, ModelError>;
}

/// Selectable classifier backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierKind {
    #[default]
    Logistic,
    DecisionTree,
}

impl ClassifierKind {
    pub fn build(self, max_iterations: u64, max_depth: Option<usize>) -> Box<dyn Classifier> {
        match self {
            ClassifierKind::Logistic => Box::new(LogisticRegressionClassifier { max_iterations }),
            ClassifierKind::DecisionTree => Box::new(DecisionTreeClassifier { max_depth }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogisticRegressionClassifier {
    pub max_iterations: u64,
}

impl Default for LogisticRegressionClassifier {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
        }
    }
}

impl Classifier for LogisticRegressionClassifier {
    fn name(&self) -> &'static str {
        "logistic regression"
    }

    fn fit(
        &self,
        features: &Array2<f64>,
        labels: &Array1<usize>,
    ) -> Result<FittedModel, ModelError> {
        check_training_set(features, labels)?;
        let dataset = Dataset::new(features.clone(), labels.clone());
        let model = LogisticRegression::default()
            .max_iterations(self.max_iterations)
            .fit(&dataset)?;
        Ok(FittedModel::Logistic(model))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecisionTreeClassifier {
    pub max_depth: Option<usize>,
}

impl Classifier for DecisionTreeClassifier {
    fn name(&self) -> &'static str {
        "decision tree"
    }

    fn fit(
        &self,
        features: &Array2<f64>,
        labels: &Array1<usize>,
    ) -> Result<FittedModel, ModelError> {
        check_training_set(features, labels)?;
        let dataset = Dataset::new(features.clone(), labels.clone());
        let model = DecisionTree::params()
            .max_depth(self.max_depth)
            .fit(&dataset)?;
        Ok(FittedModel::DecisionTree(model))
    }
}

fn check_training_set(features: &Array2<f64>, labels: &Array1<usize>) -> Result<(), ModelError> {
    if features.nrows() == 0 {
        return Err(ModelError::EmptyTrainingSet);
    }
    if features.nrows() != labels.len() {
        return Err(ModelError::LengthMismatch {
            rows: features.nrows(),
            labels: labels.len(),
        });
    }
    let first = labels[0];
    if labels.iter().all(|&l| l == first) {
        return Err(ModelError::SingleClass);
    }
    Ok(())
}

/// A trained model, read-only after fitting.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "algorithm", content = "model", rename_all = "kebab-case")]
pub enum FittedModel {
    Logistic(FittedLogisticRegression<f64, usize>),
    DecisionTree(DecisionTree<f64, usize>),
}

impl FittedModel {
    pub fn predict(&self, features: &Array2<f64>) -> Array1<usize> {
        match self {
            FittedModel::Logistic(model) => model.predict(features),
            FittedModel::DecisionTree(model) => model.predict(features),
        }
    }

    /// Probability of the positive (churn) class, when the backend provides one.
    pub fn predict_probability(&self, features: &Array2<f64>) -> Option<Array1<f64>> {
        match self {
            // Probabilities are for linfa's positive class, the more frequent one.
            FittedModel::Logistic(model) => {
                let p = model.predict_probabilities(features);
                Some(if model.labels().pos.class == 1 {
                    p
                } else {
                    p.mapv(|v| 1.0 - v)
                })
            }
            FittedModel::DecisionTree(_) => None,
        }
    }

    /// Input width the model was fitted with, when the backend records it.
    pub fn n_features(&self) -> Option<usize> {
        match self {
            FittedModel::Logistic(model) => Some(model.params().len()),
            FittedModel::DecisionTree(_) => None,
        }
    }

    pub fn algorithm(&self) -> &'static str {
        match self {
            FittedModel::Logistic(_) => "logistic regression",
            FittedModel::DecisionTree(_) => "decision tree",
        }
    }
}

/// Seeded shuffle split into `(train, test)`.
pub fn train_test_split<T: Clone>(
    rows: &[T],
    test_ratio: f64,
    seed: u64,
) -> Result<(Vec<T>, Vec<T>), ModelError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(ModelError::InvalidTestRatio(test_ratio));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = rows.to_vec();
    data.shuffle(&mut rng);

    let test_len = ((data.len() as f64) * test_ratio).round() as usize;
    let split_index = data.len().saturating_sub(test_len);
    let test = data.split_off(split_index);
    info!(train = data.len(), test = test.len(), seed, "split dataset");
    Ok((data, test))
}
