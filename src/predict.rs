//! Prediction front-end: terminal form and JSON record input
//!
//! Field-level and encoding errors are shown to the user and the form keeps
//! running; only I/O failures end the session.

use crate::artifact::{ModelArtifact, Prediction};
use crate::attributes::{CustomerRecord, FieldKind, FieldSpec, FIELDS};
use crate::record::{Record, Value};
use anyhow::Context;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::debug;

/// Read a single customer record from a JSON object file.
pub fn load_record(path: &Path) -> crate::Result<Record> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record {}", path.display()))?;
    let record = serde_json::from_str(&text)
        .with_context(|| format!("Record {} is not a JSON object of attributes", path.display()))?;
    Ok(record)
}

/// Validate a record against the customer attribute domain and score it.
pub fn predict_customer(artifact: &ModelArtifact, raw: &Record) -> crate::Result<Prediction> {
    let customer = CustomerRecord::new(raw)?;
    Ok(artifact.predict(customer.as_record())?)
}

pub fn format_prediction(prediction: &Prediction) -> String {
    match prediction.churn_probability {
        Some(p) => format!(
            "🔮 Churn Prediction: {} (churn probability {:.2})",
            prediction.label, p
        ),
        None => format!("🔮 Churn Prediction: {}", prediction.label),
    }
}

/// Interactive form over arbitrary reader/writer pairs.
pub struct PredictionForm<'a, R, W> {
    artifact: &'a ModelArtifact,
    input: R,
    output: W,
}

enum Answer {
    Value(Value),
    Quit,
}

impl<'a, R: BufRead, W: Write> PredictionForm<'a, R, W> {
    pub fn new(artifact: &'a ModelArtifact, input: R, output: W) -> Self {
        Self {
            artifact,
            input,
            output,
        }
    }

    /// Run until the user quits or input ends. Returns the number of
    /// predictions made.
    pub fn run(mut self) -> crate::Result<usize> {
        writeln!(self.output, "📊 Customer Churn Predictor")?;
        writeln!(
            self.output,
            "Enter customer details; choices accept a name or number. Type 'q' to quit.\n"
        )?;

        let mut predictions = 0;
        loop {
            let Some(record) = self.collect_record()? else {
                break;
            };

            match CustomerRecord::new(&record).and_then(|c| self.artifact.predict(c.as_record())) {
                Ok(prediction) => {
                    predictions += 1;
                    writeln!(self.output, "\n{}\n", format_prediction(&prediction))?;
                }
                Err(err) => {
                    debug!(error = %err, "prediction rejected");
                    writeln!(self.output, "\n✗ Could not score this customer: {}\n", err)?;
                }
            }
        }
        writeln!(self.output, "Goodbye.")?;
        Ok(predictions)
    }

    fn collect_record(&mut self) -> crate::Result<Option<Record>> {
        let mut record = Record::new();
        for field_spec in FIELDS.iter() {
            match self.ask(field_spec)? {
                Answer::Value(value) => record.insert(field_spec.name, value),
                Answer::Quit => return Ok(None),
            }
        }
        Ok(Some(record))
    }

    fn ask(&mut self, field_spec: &FieldSpec) -> crate::Result<Answer> {
        loop {
            write!(self.output, "{}{}: ", field_spec.prompt, hint(field_spec))?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(Answer::Quit);
            }
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
                return Ok(Answer::Quit);
            }

            match field_spec.parse(line) {
                Ok(value) => return Ok(Answer::Value(value)),
                Err(err) => writeln!(self.output, "  ✗ {}", err)?,
            }
        }
    }
}

fn hint(field_spec: &FieldSpec) -> String {
    match field_spec.kind {
        FieldKind::Choice(options) => {
            let listed: Vec<String> = options
                .iter()
                .enumerate()
                .map(|(i, o)| format!("{}={}", i + 1, o))
                .collect();
            format!(" [{}]", listed.join(", "))
        }
        FieldKind::Flag => " [Yes/No]".to_string(),
        FieldKind::Integer { min, max } => format!(" [{}-{}]", min, max),
        FieldKind::Decimal { min, max } => format!(" [{}-{}]", min, max),
    }
}
