//! Command-line interface definitions and argument parsing

use crate::config::PipelineConfig;
use crate::model::ClassifierKind;
use crate::schema::ReferencePolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Customer churn prediction with schema-locked categorical encoding
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Optional TOML file with pipeline settings; flags override it
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print shape, dtypes, null and duplicate counts and render exploratory charts
    Inspect {
        /// Path to the input CSV file
        #[arg(short, long, default_value = "WA_Fn-UseC_-Telco-Customer-Churn.csv")]
        input: String,

        /// Output path for the churn distribution plot
        #[arg(short, long, default_value = "churn_distribution.png")]
        output: String,

        /// Skip chart rendering
        #[arg(long)]
        no_plots: bool,
    },
    /// Derive the encoding schema, train and evaluate a classifier, save the artifact
    Train {
        /// Path to the input CSV file
        #[arg(short, long, default_value = "WA_Fn-UseC_-Telco-Customer-Churn.csv")]
        input: String,

        /// Where to write the schema + model artifact
        #[arg(short, long, default_value = "churn_model.json")]
        model: PathBuf,

        #[command(flatten)]
        overrides: TrainOverrides,
    },
    /// Score a customer from a JSON record or the interactive form
    Predict {
        /// Trained artifact produced by `train`
        #[arg(short, long, default_value = "churn_model.json")]
        model: PathBuf,

        /// JSON object of customer attributes; omit to use the interactive form
        #[arg(short, long)]
        record: Option<PathBuf>,
    },
}

/// Training flags that override the config file
#[derive(clap::Args, Debug, Default)]
pub struct TrainOverrides {
    /// Classifier backend
    #[arg(long, value_enum)]
    pub classifier: Option<ClassifierKind>,

    /// Standardize features before fitting
    #[arg(long)]
    pub scale: bool,

    /// Fraction of rows held out for evaluation
    #[arg(long)]
    pub test_ratio: Option<f64>,

    /// Seed for the train/test shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum iterations for logistic regression
    #[arg(long)]
    pub max_iterations: Option<u64>,

    /// Maximum depth for the decision tree
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Reference category choice for multi-valued attributes
    #[arg(long, value_enum)]
    pub reference_policy: Option<ReferencePolicy>,

    /// Pin a reference category, e.g. --reference "Contract=Two year" (repeatable)
    #[arg(long = "reference")]
    pub references: Vec<String>,
}

impl TrainOverrides {
    /// Parse `Attribute=Category` pairs
    pub fn parse_references(&self) -> crate::Result<Vec<(String, String)>> {
        self.references
            .iter()
            .map(|pair| {
                let (attribute, category) = pair.split_once('=').ok_or_else(|| {
                    anyhow::anyhow!("Reference must be in format 'Attribute=Category': {}", pair)
                })?;
                let (attribute, category) = (attribute.trim(), category.trim());
                if attribute.is_empty() || category.is_empty() {
                    anyhow::bail!("Reference must be in format 'Attribute=Category': {}", pair);
                }
                Ok((attribute.to_string(), category.to_string()))
            })
            .collect()
    }

    /// Layer these flags over `config`.
    pub fn apply(&self, mut config: PipelineConfig) -> crate::Result<PipelineConfig> {
        if let Some(classifier) = self.classifier {
            config.classifier = classifier;
        }
        if self.scale {
            config.scale = true;
        }
        if let Some(ratio) = self.test_ratio {
            config.test_ratio = ratio;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(iterations) = self.max_iterations {
            config.max_iterations = iterations;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = Some(depth);
        }
        if let Some(policy) = self.reference_policy {
            config.reference_policy = policy;
        }
        config.reference_overrides.extend(self.parse_references()?);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_references() {
        let mut overrides = TrainOverrides {
            references: vec!["Contract=Two year".to_string()],
            ..Default::default()
        };

        let result = overrides.parse_references().unwrap();
        assert_eq!(result, vec![("Contract".to_string(), "Two year".to_string())]);

        overrides.references = vec!["invalid".to_string()];
        assert!(overrides.parse_references().is_err());

        overrides.references = vec!["Contract=".to_string()];
        assert!(overrides.parse_references().is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let overrides = TrainOverrides {
            classifier: Some(ClassifierKind::DecisionTree),
            seed: Some(7),
            references: vec!["InternetService=No".to_string()],
            ..Default::default()
        };
        let config = overrides.apply(PipelineConfig::default()).unwrap();

        assert_eq!(config.classifier, ClassifierKind::DecisionTree);
        assert_eq!(config.seed, 7);
        assert_eq!(config.test_ratio, 0.2);
        assert!(!config.scale);
        assert_eq!(
            config.reference_overrides.get("InternetService").map(String::as_str),
            Some("No")
        );
    }

    #[test]
    fn test_parse_subcommands() {
        let args = Args::parse_from([
            "churnforge",
            "train",
            "--input",
            "telco.csv",
            "--classifier",
            "decision-tree",
            "--reference",
            "Contract=Two year",
            "--scale",
        ]);
        match args.command {
            Command::Train {
                input, overrides, ..
            } => {
                assert_eq!(input, "telco.csv");
                assert_eq!(overrides.classifier, Some(ClassifierKind::DecisionTree));
                assert!(overrides.scale);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
