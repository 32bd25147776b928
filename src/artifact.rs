//! Persisted training artifact: schema, scaler and model saved and loaded together

use crate::encoder::FeatureEncoder;
use crate::error::{ArtifactError, EncodingError};
use crate::model::FittedModel;
use crate::record::Record;
use crate::scaler::StandardScaler;
use crate::schema::EncodingSchema;
use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub crate_version: String,
    pub trained_at: DateTime<Utc>,
    pub schema_fingerprint: String,
    pub n_features: usize,
    pub algorithm: String,
}

/// Everything needed to score a new record.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ArtifactMetadata,
    pub schema: EncodingSchema,
    pub scaler: Option<StandardScaler>,
    pub model: FittedModel,
}

/// Outcome of scoring one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: &'static str,
    pub churn_probability: Option<f64>,
}

impl ModelArtifact {
    /// Bundle a fitted model with its schema. `n_features` is the width of
    /// the matrix the model was fitted on.
    pub fn new(
        schema: EncodingSchema,
        scaler: Option<StandardScaler>,
        model: FittedModel,
        n_features: usize,
    ) -> Result<Self, EncodingError> {
        let metadata = ArtifactMetadata {
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            trained_at: Utc::now(),
            schema_fingerprint: schema.fingerprint(),
            n_features,
            algorithm: model.algorithm().to_string(),
        };
        let artifact = Self {
            metadata,
            schema,
            scaler,
            model,
        };
        artifact.verify()?;
        Ok(artifact)
    }

    /// Check that schema, scaler and recorded feature count agree.
    pub fn verify(&self) -> Result<(), EncodingError> {
        let computed = self.schema.fingerprint();
        if computed != self.metadata.schema_fingerprint {
            return Err(EncodingError::FingerprintMismatch {
                stored: self.metadata.schema_fingerprint.clone(),
                computed,
            });
        }
        if self.metadata.n_features != self.schema.len() {
            return Err(EncodingError::SchemaMismatch {
                expected: self.metadata.n_features,
                actual: self.schema.len(),
            });
        }
        if let Some(width) = self.model.n_features() {
            if width != self.metadata.n_features {
                return Err(EncodingError::SchemaMismatch {
                    expected: width,
                    actual: self.metadata.n_features,
                });
            }
        }
        if let Some(scaler) = &self.scaler {
            if scaler.n_features() != self.schema.len() {
                return Err(EncodingError::SchemaMismatch {
                    expected: scaler.n_features(),
                    actual: self.schema.len(),
                });
            }
        }
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            fingerprint = %self.metadata.schema_fingerprint,
            "saved artifact"
        );
        Ok(())
    }

    /// Load and verify an artifact. A schema that does not match the
    /// fingerprint recorded at training time is rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&text)?;
        artifact.verify()?;
        Ok(artifact)
    }

    /// Encode (and scale, if trained with scaling) a batch of records.
    pub fn features(&self, records: &[Record]) -> Result<Array2<f64>, EncodingError> {
        let features = FeatureEncoder::new(&self.schema).encode_batch(records)?;
        Ok(match &self.scaler {
            Some(scaler) => scaler.transform(&features),
            None => features,
        })
    }

    pub fn predict(&self, record: &Record) -> Result<Prediction, EncodingError> {
        let features = self.features(std::slice::from_ref(record))?;
        let code = self.model.predict(&features)[0];
        let label = self
            .schema
            .decode_label(code)
            .ok_or_else(|| EncodingError::UnknownLabel(code.to_string()))?;
        let churn_probability = self.model.predict_probability(&features).map(|p| p[0]);
        Ok(Prediction {
            label,
            churn_probability,
        })
    }
}
