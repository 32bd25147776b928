//! Error kinds for schema derivation, feature encoding and model training

use thiserror::Error;

/// Malformed or degenerate reference data found while deriving the encoding schema.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("Reference table is empty")]
    EmptyTable,
    #[error("Attribute '{0}' is not a column of the reference table")]
    UnknownAttribute(String),
    #[error("Categorical attribute '{attribute}' has {observed} distinct value(s); need two")]
    Degenerate { attribute: String, observed: usize },
    #[error("Label '{label}' contains value '{value}' outside the domain {{No, Yes}}")]
    LabelOutOfDomain { label: String, value: String },
    #[error("Label '{0}' is missing from a reference row")]
    MissingLabel(String),
    #[error("Reference category '{category}' was never observed for attribute '{attribute}'")]
    UnknownReference { attribute: String, category: String },
    #[error("Reference category pinned for '{0}', which is not a multi-valued categorical")]
    ReferenceNotApplicable(String),
    #[error("Numeric attribute '{attribute}' has non-numeric value '{value}'")]
    NonNumeric { attribute: String, value: String },
}

/// A record could not be turned into a feature vector aligned with the schema.
#[derive(Debug, Error, PartialEq)]
pub enum EncodingError {
    #[error("Required numeric attribute '{0}' is missing")]
    MissingNumeric(String),
    #[error("Attribute '{attribute}' expects a number, got '{value}'")]
    NonNumeric { attribute: String, value: String },
    #[error("Label attribute '{0}' is missing")]
    MissingLabel(String),
    #[error("Label value '{0}' is outside the domain {{No, Yes}}")]
    UnknownLabel(String),
    #[error("Model expects {expected} features but the schema produces {actual}")]
    SchemaMismatch { expected: usize, actual: usize },
    #[error("Artifact schema fingerprint {stored} does not match recomputed {computed}")]
    FingerprintMismatch { stored: String, computed: String },
    #[error("Invalid value '{value}' for '{attribute}': {reason}")]
    InvalidField {
        attribute: String,
        value: String,
        reason: String,
    },
}

/// Failure of the underlying classifier during fit or predict.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Training set is empty")]
    EmptyTrainingSet,
    #[error(
        "Training labels contain a single class; both churned and retained customers are required"
    )]
    SingleClass,
    #[error("Feature matrix has {rows} rows but {labels} labels were supplied")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("Invalid test ratio {0}; expected a value in (0, 1)")]
    InvalidTestRatio(f64),
    #[error("Logistic regression failed: {0}")]
    Logistic(#[from] linfa_logistic::error::Error),
    #[error("Decision tree failed: {0}")]
    Tree(#[from] linfa::Error),
    #[error("Feature scaling failed: {0}")]
    Scaling(#[from] linfa_preprocessing::error::PreprocessingError),
}

/// Failure to persist or restore a training artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to access artifact {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to (de)serialize artifact: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
