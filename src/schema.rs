//! Encoding schema derivation
//!
//! The schema is derived once from the reference table and is the only source
//! of truth for the column layout seen by the model. Rules:
//!
//! * two-valued categoricals map to a single 0/1 column; the observed values are
//!   sorted lexicographically and the first maps to 0
//! * categoricals with more values expand into one indicator column per category
//!   except a reference category, named `attribute_value`, in sorted order
//! * numeric attributes pass through as one column
//! * the label is mapped from the fixed domain `No -> 0`, `Yes -> 1`

use crate::error::{EncodingError, SchemaError};
use crate::record::{RawTable, Value};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Label domain, in encoded order.
pub const LABEL_DOMAIN: [&str; 2] = ["No", "Yes"];

/// Which sorted category becomes the reference for multi-valued attributes
/// when no explicit override is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    /// Lexicographically smallest category (drop-first convention)
    #[default]
    First,
    /// Lexicographically largest category
    Last,
}

/// How one raw attribute maps onto schema columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeRule {
    Numeric {
        attribute: String,
    },
    /// `values[0]` encodes to 0, `values[1]` to 1
    Binary {
        attribute: String,
        values: [String; 2],
    },
    /// One indicator per entry of `categories`; `reference` has no column.
    OneHot {
        attribute: String,
        reference: String,
        categories: Vec<String>,
    },
}

impl AttributeRule {
    pub fn attribute(&self) -> &str {
        match self {
            AttributeRule::Numeric { attribute }
            | AttributeRule::Binary { attribute, .. }
            | AttributeRule::OneHot { attribute, .. } => attribute,
        }
    }

    /// Number of schema columns this rule produces.
    pub fn width(&self) -> usize {
        match self {
            AttributeRule::Numeric { .. } | AttributeRule::Binary { .. } => 1,
            AttributeRule::OneHot { categories, .. } => categories.len(),
        }
    }

    fn column_names(&self) -> Vec<String> {
        match self {
            AttributeRule::Numeric { attribute } | AttributeRule::Binary { attribute, .. } => {
                vec![attribute.clone()]
            }
            AttributeRule::OneHot {
                attribute,
                categories,
                ..
            } => categories
                .iter()
                .map(|c| indicator_name(attribute, c))
                .collect(),
        }
    }
}

/// Name of the indicator column for `category` of `attribute`.
pub fn indicator_name(attribute: &str, category: &str) -> String {
    format!("{}_{}", attribute, category)
}

/// Ordered column list plus the per-attribute rules that produce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingSchema {
    columns: Vec<String>,
    rules: Vec<AttributeRule>,
    label: String,
}

impl EncodingSchema {
    fn from_rules(rules: Vec<AttributeRule>, label: String) -> Self {
        let columns = rules.iter().flat_map(AttributeRule::column_names).collect();
        Self {
            columns,
            rules,
            label,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rules(&self) -> &[AttributeRule] {
        &self.rules
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn rule(&self, attribute: &str) -> Option<&AttributeRule> {
        self.rules.iter().find(|r| r.attribute() == attribute)
    }

    /// SHA-256 over the canonical JSON form of columns, rules and label.
    pub fn fingerprint(&self) -> String {
        // Serializing owned Vec/String data cannot fail.
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        format!("{:x}", Sha256::digest(&bytes))
    }

    /// Encode a raw label value.
    pub fn encode_label(&self, value: &Value) -> Result<usize, EncodingError> {
        let category = value.as_category();
        LABEL_DOMAIN
            .iter()
            .position(|v| *v == category)
            .ok_or(EncodingError::UnknownLabel(category))
    }

    /// Decode an encoded label back to its raw value.
    pub fn decode_label(&self, code: usize) -> Option<&'static str> {
        LABEL_DOMAIN.get(code).copied()
    }

    /// Recover the raw value of a two-valued attribute from its 0/1 code.
    pub fn decode_binary(&self, attribute: &str, code: f64) -> Option<&str> {
        match self.rule(attribute)? {
            AttributeRule::Binary { values, .. } if code == 0.0 => Some(&values[0]),
            AttributeRule::Binary { values, .. } if code == 1.0 => Some(&values[1]),
            _ => None,
        }
    }
}

/// Derives an [`EncodingSchema`] from a reference table.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    label: String,
    categorical: BTreeSet<String>,
    policy: ReferencePolicy,
    overrides: BTreeMap<String, String>,
}

impl SchemaBuilder {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            categorical: BTreeSet::new(),
            policy: ReferencePolicy::default(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn categorical<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical.extend(attributes.into_iter().map(Into::into));
        self
    }

    pub fn reference_policy(mut self, policy: ReferencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Pin the reference category of a multi-valued attribute.
    pub fn reference(mut self, attribute: impl Into<String>, category: impl Into<String>) -> Self {
        self.overrides.insert(attribute.into(), category.into());
        self
    }

    pub fn build(&self, table: &RawTable) -> Result<EncodingSchema, SchemaError> {
        if table.height() == 0 {
            return Err(SchemaError::EmptyTable);
        }
        if !table.has_column(&self.label) {
            return Err(SchemaError::UnknownAttribute(self.label.clone()));
        }
        if let Some(missing) = self.categorical.iter().find(|c| !table.has_column(c)) {
            return Err(SchemaError::UnknownAttribute(missing.clone()));
        }

        self.validate_label(table)?;

        let mut rules = Vec::new();
        for attribute in table.columns().iter().filter(|c| **c != self.label) {
            let rule = if self.categorical.contains(attribute) {
                self.categorical_rule(table, attribute)?
            } else {
                numeric_rule(table, attribute)?
            };
            debug!(attribute = %attribute, width = rule.width(), "derived encoding rule");
            rules.push(rule);
        }

        if let Some(attribute) = self.overrides.keys().find(|attribute| {
            !rules.iter().any(|rule| {
                matches!(rule, AttributeRule::OneHot { attribute: a, .. } if a == *attribute)
            })
        }) {
            return Err(SchemaError::ReferenceNotApplicable(attribute.clone()));
        }

        Ok(EncodingSchema::from_rules(rules, self.label.clone()))
    }

    fn validate_label(&self, table: &RawTable) -> Result<(), SchemaError> {
        for value in table.column(&self.label) {
            let value = value.ok_or_else(|| SchemaError::MissingLabel(self.label.clone()))?;
            let category = value.as_category();
            if !LABEL_DOMAIN.contains(&category.as_str()) {
                return Err(SchemaError::LabelOutOfDomain {
                    label: self.label.clone(),
                    value: category,
                });
            }
        }
        Ok(())
    }

    fn categorical_rule(
        &self,
        table: &RawTable,
        attribute: &str,
    ) -> Result<AttributeRule, SchemaError> {
        let observed: BTreeSet<String> = table
            .column(attribute)
            .flatten()
            .map(Value::as_category)
            .filter(|c| !c.is_empty())
            .collect();

        match observed.len() {
            0 | 1 => Err(SchemaError::Degenerate {
                attribute: attribute.to_string(),
                observed: observed.len(),
            }),
            2 => {
                let mut values = observed.into_iter();
                let (zero, one) = match (values.next(), values.next()) {
                    (Some(zero), Some(one)) => (zero, one),
                    _ => unreachable!("set has exactly two elements"),
                };
                Ok(AttributeRule::Binary {
                    attribute: attribute.to_string(),
                    values: [zero, one],
                })
            }
            _ => {
                let reference = match self.overrides.get(attribute) {
                    Some(pinned) if observed.contains(pinned) => pinned.clone(),
                    Some(pinned) => {
                        return Err(SchemaError::UnknownReference {
                            attribute: attribute.to_string(),
                            category: pinned.clone(),
                        })
                    }
                    None => {
                        let picked = match self.policy {
                            ReferencePolicy::First => observed.iter().next(),
                            ReferencePolicy::Last => observed.iter().next_back(),
                        };
                        picked.cloned().unwrap_or_default()
                    }
                };
                let categories = observed.into_iter().filter(|c| *c != reference).collect();
                Ok(AttributeRule::OneHot {
                    attribute: attribute.to_string(),
                    reference,
                    categories,
                })
            }
        }
    }
}

fn numeric_rule(table: &RawTable, attribute: &str) -> Result<AttributeRule, SchemaError> {
    for value in table.column(attribute).flatten() {
        let blank = matches!(value, Value::Text(s) if s.trim().is_empty());
        if !blank && value.as_number().is_none() {
            return Err(SchemaError::NonNumeric {
                attribute: attribute.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(AttributeRule::Numeric {
        attribute: attribute.to_string(),
    })
}
