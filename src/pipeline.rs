//! Training pipeline: clean, derive schema, split, fit, evaluate

use crate::artifact::ModelArtifact;
use crate::attributes::{categorical_attributes, numeric_attributes};
use crate::config::PipelineConfig;
use crate::data::drop_invalid_numeric;
use crate::encoder::FeatureEncoder;
use crate::metrics::{evaluate, EvaluationReport};
use crate::model::train_test_split;
use crate::record::{RawTable, Value};
use crate::scaler::StandardScaler;
use crate::schema::SchemaBuilder;
use std::collections::BTreeSet;
use tracing::info;

/// Result of one training run
#[derive(Debug)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub report: EvaluationReport,
    pub train_rows: usize,
    pub test_rows: usize,
    pub dropped_rows: usize,
}

/// Columns encoded as categoricals: the known customer categoricals present in
/// the table, plus any other feature column holding non-numeric text.
pub fn infer_categorical(table: &RawTable, label: &str) -> Vec<String> {
    let known: BTreeSet<&str> = categorical_attributes().into_iter().collect();
    let numeric: BTreeSet<&str> = numeric_attributes().into_iter().collect();

    table
        .columns()
        .iter()
        .filter(|c| c.as_str() != label && !numeric.contains(c.as_str()))
        .filter(|c| {
            known.contains(c.as_str())
                || table.column(c).flatten().any(|v| match v {
                    Value::Text(s) => !s.trim().is_empty() && v.as_number().is_none(),
                    Value::Number(_) => false,
                })
        })
        .cloned()
        .collect()
}

pub fn schema_builder(config: &PipelineConfig, categorical: Vec<String>) -> SchemaBuilder {
    config.reference_overrides.iter().fold(
        SchemaBuilder::new(config.target.clone())
            .categorical(categorical)
            .reference_policy(config.reference_policy),
        |builder, (attribute, category)| builder.reference(attribute, category),
    )
}

pub fn train(table: &RawTable, config: &PipelineConfig) -> crate::Result<TrainingOutcome> {
    let table = table.without_columns(&config.drop_columns);
    let required: Vec<&str> = numeric_attributes()
        .into_iter()
        .filter(|a| table.has_column(a))
        .collect();
    let (table, dropped_rows) = drop_invalid_numeric(table, &required);

    let categorical = infer_categorical(&table, &config.target);
    info!(categorical = categorical.len(), "deriving encoding schema");
    let schema = schema_builder(config, categorical).build(&table)?;
    info!(columns = schema.len(), fingerprint = %schema.fingerprint(), "schema ready");

    let (train_rows, test_rows) = train_test_split(table.rows(), config.test_ratio, config.seed)?;
    let encoder = FeatureEncoder::new(&schema);
    let mut x_train = encoder.encode_batch(&train_rows)?;
    let y_train = encoder.encode_labels(&train_rows)?;
    let mut x_test = encoder.encode_batch(&test_rows)?;
    let y_test = encoder.encode_labels(&test_rows)?;

    let scaler = config
        .scale
        .then(|| StandardScaler::fit(&x_train, &y_train))
        .transpose()?;
    if let Some(scaler) = &scaler {
        x_train = scaler.transform(&x_train);
        x_test = scaler.transform(&x_test);
    }

    let classifier = config.classifier.build(config.max_iterations, config.max_depth);
    info!(classifier = classifier.name(), rows = x_train.nrows(), "fitting model");
    let model = classifier.fit(&x_train, &y_train)?;

    let predictions = model.predict(&x_test);
    let report = evaluate(&predictions.to_vec(), &y_test.to_vec())?;
    info!(accuracy = report.accuracy, "evaluated on held-out rows");

    let artifact = ModelArtifact::new(schema, scaler, model, x_train.ncols())?;

    Ok(TrainingOutcome {
        artifact,
        report,
        train_rows: train_rows.len(),
        test_rows: test_rows.len(),
        dropped_rows,
    })
}
