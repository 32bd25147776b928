//! ChurnForge: a Rust CLI application for customer churn prediction
//!
//! This library derives a fixed categorical encoding schema from a customer
//! table, trains a binary classifier on the encoded features, and scores new
//! customers through exactly the same schema.

pub mod artifact;
pub mod attributes;
pub mod cli;
pub mod config;
pub mod data;
pub mod encoder;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod predict;
pub mod record;
pub mod scaler;
pub mod schema;
pub mod viz;

// Re-export public items for easier access
pub use artifact::{ModelArtifact, Prediction};
pub use attributes::CustomerRecord;
pub use cli::Args;
pub use config::PipelineConfig;
pub use data::{load_customer_data, CustomerData, DatasetSummary};
pub use encoder::FeatureEncoder;
pub use error::{EncodingError, ModelError, SchemaError};
pub use metrics::{evaluate, ConfusionMatrix, EvaluationReport};
pub use model::{Classifier, ClassifierKind, FittedModel};
pub use record::{RawTable, Record, Value};
pub use schema::{AttributeRule, EncodingSchema, ReferencePolicy, SchemaBuilder};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
