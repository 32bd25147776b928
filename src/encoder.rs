//! Feature encoding against a fixed schema

use crate::error::EncodingError;
use crate::record::{Record, Value};
use crate::schema::{AttributeRule, EncodingSchema};
use ndarray::{Array1, Array2};
use tracing::warn;

/// Applies an [`EncodingSchema`] to new records.
///
/// Encoding is a pure function of `(schema, record)`: the output always has
/// `schema.len()` entries in `schema.columns()` order. Categorical values that
/// are missing or were never observed when the schema was built encode as 0 in
/// every column of their attribute. Attributes unknown to the schema are ignored.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder<'a> {
    schema: &'a EncodingSchema,
}

impl<'a> FeatureEncoder<'a> {
    pub fn new(schema: &'a EncodingSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &EncodingSchema {
        self.schema
    }

    /// Encode one record into a feature vector.
    pub fn encode(&self, record: &Record) -> Result<Vec<f64>, EncodingError> {
        let mut vector = Vec::with_capacity(self.schema.len());
        for rule in self.schema.rules() {
            let value = record.get(rule.attribute());
            match rule {
                AttributeRule::Numeric { attribute } => {
                    vector.push(numeric(attribute, value)?);
                }
                AttributeRule::Binary { attribute, values } => {
                    let code = match value.map(Value::as_category) {
                        Some(c) if c == values[1] => 1.0,
                        Some(c) if c == values[0] => 0.0,
                        Some(c) => {
                            warn!(
                                attribute = %attribute,
                                value = %c,
                                "unseen category encoded as 0"
                            );
                            0.0
                        }
                        None => 0.0,
                    };
                    vector.push(code);
                }
                AttributeRule::OneHot {
                    attribute,
                    reference,
                    categories,
                } => {
                    let observed = value.map(Value::as_category);
                    if let Some(c) = &observed {
                        if c != reference && !categories.contains(c) {
                            warn!(
                                attribute = %attribute,
                                value = %c,
                                "unseen category encoded as baseline"
                            );
                        }
                    }
                    vector.extend(categories.iter().map(|category| {
                        if observed.as_deref() == Some(category.as_str()) {
                            1.0
                        } else {
                            0.0
                        }
                    }));
                }
            }
        }
        debug_assert_eq!(vector.len(), self.schema.len());
        Ok(vector)
    }

    /// Encode records into a `(n_records, schema.len())` matrix.
    pub fn encode_batch(&self, records: &[Record]) -> Result<Array2<f64>, EncodingError> {
        let width = self.schema.len();
        let mut data = Vec::with_capacity(records.len() * width);
        for record in records {
            data.extend(self.encode(record)?);
        }
        let actual = data.len();
        Array2::from_shape_vec((records.len(), width), data).map_err(|_| {
            EncodingError::SchemaMismatch {
                expected: records.len() * width,
                actual,
            }
        })
    }

    /// Encode the label attribute of each record.
    pub fn encode_labels(&self, records: &[Record]) -> Result<Array1<usize>, EncodingError> {
        records
            .iter()
            .map(|record| {
                let value = record
                    .get(self.schema.label())
                    .ok_or_else(|| EncodingError::MissingLabel(self.schema.label().to_string()))?;
                self.schema.encode_label(value)
            })
            .collect()
    }
}

fn numeric(attribute: &str, value: Option<&Value>) -> Result<f64, EncodingError> {
    let value = value.ok_or_else(|| EncodingError::MissingNumeric(attribute.to_string()))?;
    value.as_number().ok_or_else(|| EncodingError::NonNumeric {
        attribute: attribute.to_string(),
        value: value.to_string(),
    })
}
