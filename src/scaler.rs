//! Optional feature standardization

use crate::error::ModelError;
use linfa::prelude::*;
use linfa_preprocessing::linear_scaling::LinearScaler;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Per-column standardization `(x - mean) / std`, fitted on training features
/// and replayed unchanged at inference time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StandardScaler(LinearScaler<f64>);

impl StandardScaler {
    pub fn fit(features: &Array2<f64>, labels: &Array1<usize>) -> Result<Self, ModelError> {
        let dataset = Dataset::new(features.clone(), labels.clone());
        let scaler = LinearScaler::standard().fit(&dataset)?;
        Ok(Self(scaler))
    }

    pub fn n_features(&self) -> usize {
        self.0.offsets().len()
    }

    pub fn transform(&self, features: &Array2<f64>) -> Array2<f64> {
        self.0.transform(features.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_transform() {
        let x = array![[1.0, 10.0], [3.0, 20.0], [5.0, 30.0]];
        let scaler = StandardScaler::fit(&x, &array![0, 1, 0]).unwrap();
        let scaled = scaler.transform(&x);

        assert_eq!(scaler.n_features(), 2);
        assert!(scaled[[1, 0]].abs() < 1e-12);
        assert!(scaled[[1, 1]].abs() < 1e-12);
        assert!(scaled[[0, 0]] < 0.0 && scaled[[2, 0]] > 0.0);
        assert!((scaled[[0, 0]] + scaled[[2, 0]]).abs() < 1e-12);
    }

    #[test]
    fn test_transform_new_rows_with_training_statistics() {
        let train = array![[0.0, 4.0], [2.0, 8.0], [4.0, 12.0]];
        let scaler = StandardScaler::fit(&train, &array![0, 1, 1]).unwrap();

        let centre = scaler.transform(&array![[2.0, 8.0]]);
        assert!(centre.iter().all(|v| v.abs() < 1e-12));

        let above = scaler.transform(&array![[6.0, 16.0]]);
        let edge = scaler.transform(&array![[4.0, 12.0]]);
        assert!(above[[0, 0]] > edge[[0, 0]]);
    }

    #[test]
    fn test_round_trips_through_json() {
        let x = array![[1.0, 0.0], [3.0, 1.0]];
        let scaler = StandardScaler::fit(&x, &array![0, 1]).unwrap();

        let json = serde_json::to_string(&scaler).unwrap();
        let restored: StandardScaler = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.transform(&x), scaler.transform(&x));
    }
}
