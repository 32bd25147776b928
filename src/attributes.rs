//! Customer attribute domain for the Telco churn dataset
//!
//! Declares the 19 customer attributes collected by the prediction form, the
//! enumerated values or numeric range each one accepts, and [`CustomerRecord`],
//! a record whose field set has been checked against that domain.

use crate::error::EncodingError;
use crate::record::{Record, Value};

/// Accepted input for one attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// One of a fixed set of strings
    Choice(&'static [&'static str]),
    /// Yes/No question stored as 1/0
    Flag,
    /// Whole number within an inclusive range
    Integer { min: i64, max: i64 },
    /// Decimal within an inclusive range
    Decimal { min: f64, max: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub prompt: &'static str,
    pub kind: FieldKind,
}

const YES_NO: &[&str] = &["Yes", "No"];
const INTERNET_ADDON: &[&str] = &["Yes", "No", "No internet service"];

/// Form fields in dataset column order.
pub const FIELDS: [FieldSpec; 19] = [
    FieldSpec {
        name: "gender",
        prompt: "Gender",
        kind: FieldKind::Choice(&["Male", "Female"]),
    },
    FieldSpec {
        name: "SeniorCitizen",
        prompt: "Senior Citizen",
        kind: FieldKind::Flag,
    },
    FieldSpec {
        name: "Partner",
        prompt: "Partner",
        kind: FieldKind::Choice(YES_NO),
    },
    FieldSpec {
        name: "Dependents",
        prompt: "Dependents",
        kind: FieldKind::Choice(YES_NO),
    },
    FieldSpec {
        name: "tenure",
        prompt: "Tenure (months)",
        kind: FieldKind::Integer { min: 0, max: 120 },
    },
    FieldSpec {
        name: "PhoneService",
        prompt: "Phone Service",
        kind: FieldKind::Choice(YES_NO),
    },
    FieldSpec {
        name: "MultipleLines",
        prompt: "Multiple Lines",
        kind: FieldKind::Choice(&["Yes", "No", "No phone service"]),
    },
    FieldSpec {
        name: "InternetService",
        prompt: "Internet Service",
        kind: FieldKind::Choice(&["DSL", "Fiber optic", "No"]),
    },
    FieldSpec {
        name: "OnlineSecurity",
        prompt: "Online Security",
        kind: FieldKind::Choice(INTERNET_ADDON),
    },
    FieldSpec {
        name: "OnlineBackup",
        prompt: "Online Backup",
        kind: FieldKind::Choice(INTERNET_ADDON),
    },
    FieldSpec {
        name: "DeviceProtection",
        prompt: "Device Protection",
        kind: FieldKind::Choice(INTERNET_ADDON),
    },
    FieldSpec {
        name: "TechSupport",
        prompt: "Tech Support",
        kind: FieldKind::Choice(INTERNET_ADDON),
    },
    FieldSpec {
        name: "StreamingTV",
        prompt: "Streaming TV",
        kind: FieldKind::Choice(INTERNET_ADDON),
    },
    FieldSpec {
        name: "StreamingMovies",
        prompt: "Streaming Movies",
        kind: FieldKind::Choice(INTERNET_ADDON),
    },
    FieldSpec {
        name: "Contract",
        prompt: "Contract",
        kind: FieldKind::Choice(&["Month-to-month", "One year", "Two year"]),
    },
    FieldSpec {
        name: "PaperlessBilling",
        prompt: "Paperless Billing",
        kind: FieldKind::Choice(YES_NO),
    },
    FieldSpec {
        name: "PaymentMethod",
        prompt: "Payment Method",
        kind: FieldKind::Choice(&[
            "Electronic check",
            "Mailed check",
            "Bank transfer (automatic)",
            "Credit card (automatic)",
        ]),
    },
    FieldSpec {
        name: "MonthlyCharges",
        prompt: "Monthly Charges",
        kind: FieldKind::Decimal { min: 0.0, max: 1_000.0 },
    },
    FieldSpec {
        name: "TotalCharges",
        prompt: "Total Charges",
        kind: FieldKind::Decimal { min: 0.0, max: 100_000.0 },
    },
];

/// Identifier column present in the raw dataset but never used as a feature.
pub const ID_COLUMN: &str = "customerID";

/// Churn label column.
pub const LABEL_COLUMN: &str = "Churn";

pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Attributes encoded as categoricals.
pub fn categorical_attributes() -> Vec<&'static str> {
    FIELDS
        .iter()
        .filter(|f| matches!(f.kind, FieldKind::Choice(_)))
        .map(|f| f.name)
        .collect()
}

/// Attributes that must coerce to numbers (tenure and the two charges, plus
/// the 0/1 senior citizen flag).
pub fn numeric_attributes() -> Vec<&'static str> {
    FIELDS
        .iter()
        .filter(|f| !matches!(f.kind, FieldKind::Choice(_)))
        .map(|f| f.name)
        .collect()
}

impl FieldSpec {
    /// Parse user input for this field. Choices match case-insensitively or by
    /// 1-based position in the option list.
    pub fn parse(&self, input: &str) -> Result<Value, EncodingError> {
        let input = input.trim();
        let invalid = |reason: String| EncodingError::InvalidField {
            attribute: self.name.to_string(),
            value: input.to_string(),
            reason,
        };

        match self.kind {
            FieldKind::Choice(options) => {
                if let Ok(index) = input.parse::<usize>() {
                    if (1..=options.len()).contains(&index) {
                        return Ok(Value::from(options[index - 1]));
                    }
                }
                options
                    .iter()
                    .find(|o| o.eq_ignore_ascii_case(input))
                    .map(|o| Value::from(*o))
                    .ok_or_else(|| invalid(format!("expected one of {}", options.join(", "))))
            }
            FieldKind::Flag => match input.to_ascii_lowercase().as_str() {
                "yes" | "y" | "1" => Ok(Value::Number(1.0)),
                "no" | "n" | "0" => Ok(Value::Number(0.0)),
                _ => Err(invalid("expected Yes or No".to_string())),
            },
            FieldKind::Integer { min, max } => {
                let n: i64 = input
                    .parse()
                    .map_err(|_| invalid("expected a whole number".to_string()))?;
                if (min..=max).contains(&n) {
                    Ok(Value::from(n))
                } else {
                    Err(invalid(format!("expected a value between {} and {}", min, max)))
                }
            }
            FieldKind::Decimal { min, max } => {
                let n: f64 = input
                    .parse()
                    .map_err(|_| invalid("expected a number".to_string()))?;
                if n.is_finite() && (min..=max).contains(&n) {
                    Ok(Value::Number(n))
                } else {
                    Err(invalid(format!("expected a value between {} and {}", min, max)))
                }
            }
        }
    }

    /// Check an already-typed value against the domain.
    pub fn validate(&self, value: &Value) -> Result<Value, EncodingError> {
        match (self.kind, value) {
            (FieldKind::Flag, Value::Number(n)) if *n == 0.0 || *n == 1.0 => Ok(value.clone()),
            (FieldKind::Integer { .. }, Value::Number(n)) if n.fract() == 0.0 => {
                self.parse(&format!("{}", *n as i64))
            }
            (FieldKind::Decimal { .. }, Value::Number(n)) => self.parse(&n.to_string()),
            _ => self.parse(&value.as_category()),
        }
    }
}

/// A customer record whose attributes are exactly [`FIELDS`], each within its domain.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord(Record);

impl CustomerRecord {
    /// Validate a raw record. Unknown attributes are rejected so that typos
    /// in field names cannot silently fall back to baseline encodings.
    pub fn new(raw: &Record) -> Result<Self, EncodingError> {
        if let Some((name, value)) = raw.iter().find(|(name, _)| field(name).is_none()) {
            return Err(EncodingError::InvalidField {
                attribute: name.clone(),
                value: value.to_string(),
                reason: "not a customer attribute".to_string(),
            });
        }

        let mut record = Record::new();
        for field_spec in FIELDS.iter() {
            let value = raw.get(field_spec.name).ok_or_else(|| EncodingError::InvalidField {
                attribute: field_spec.name.to_string(),
                value: String::new(),
                reason: "missing".to_string(),
            })?;
            record.insert(field_spec.name, field_spec.validate(value)?);
        }
        Ok(Self(record))
    }

    pub fn as_record(&self) -> &Record {
        &self.0
    }

    pub fn into_record(self) -> Record {
        self.0
    }
}

impl TryFrom<Record> for CustomerRecord {
    type Error = EncodingError;

    fn try_from(raw: Record) -> Result<Self, Self::Error> {
        CustomerRecord::new(&raw)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_customer() -> Record {
        Record::new()
            .with("gender", "Female")
            .with("SeniorCitizen", 0i64)
            .with("Partner", "Yes")
            .with("Dependents", "No")
            .with("tenure", 5i64)
            .with("PhoneService", "Yes")
            .with("MultipleLines", "No")
            .with("InternetService", "DSL")
            .with("OnlineSecurity", "Yes")
            .with("OnlineBackup", "No")
            .with("DeviceProtection", "Yes")
            .with("TechSupport", "No")
            .with("StreamingTV", "No")
            .with("StreamingMovies", "No")
            .with("Contract", "Month-to-month")
            .with("PaperlessBilling", "Yes")
            .with("PaymentMethod", "Electronic check")
            .with("MonthlyCharges", 70.35)
            .with("TotalCharges", 350.5)
    }

    #[test]
    fn test_domain_partition() {
        assert_eq!(categorical_attributes().len(), 15);
        assert_eq!(
            numeric_attributes(),
            vec!["SeniorCitizen", "tenure", "MonthlyCharges", "TotalCharges"]
        );
    }

    #[test]
    fn test_parse_choice() {
        let contract = field("Contract").unwrap();
        assert_eq!(contract.parse("one year").unwrap(), Value::from("One year"));
        assert_eq!(contract.parse("3").unwrap(), Value::from("Two year"));
        assert!(contract.parse("4").is_err());
        assert!(contract.parse("Three year").is_err());
    }

    #[test]
    fn test_parse_numeric_ranges() {
        let tenure = field("tenure").unwrap();
        assert_eq!(tenure.parse("12").unwrap(), Value::Number(12.0));
        assert!(tenure.parse("-1").is_err());
        assert!(tenure.parse("1.5").is_err());

        let senior = field("SeniorCitizen").unwrap();
        assert_eq!(senior.parse("Yes").unwrap(), Value::Number(1.0));
        assert!(senior.parse("maybe").is_err());
    }

    #[test]
    fn test_customer_record_validation() {
        let record = CustomerRecord::new(&sample_customer()).unwrap();
        assert_eq!(record.as_record().len(), 19);

        let mut missing = sample_customer();
        missing.remove("TotalCharges");
        assert!(CustomerRecord::new(&missing).is_err());

        let typo = sample_customer().with("Contrat", "One year");
        assert!(CustomerRecord::try_from(typo).is_err());

        let bad = sample_customer().with("InternetService", "Satellite");
        assert!(CustomerRecord::new(&bad).is_err());
    }
}
