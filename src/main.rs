//! ChurnForge: customer churn prediction CLI
//!
//! This is the main entrypoint that orchestrates data inspection, schema
//! derivation and training, and prediction for new customers.

use anyhow::Result;
use churnforge::cli::{Args, Command, TrainOverrides};
use churnforge::predict::{self, PredictionForm};
use churnforge::{load_customer_data, logging, pipeline, viz, ModelArtifact, PipelineConfig};
use clap::Parser;
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = PipelineConfig::load(args.config.as_deref())?;

    match &args.command {
        Command::Inspect {
            input,
            output,
            no_plots,
        } => run_inspect(&config, input, output, *no_plots),
        Command::Train {
            input,
            model,
            overrides,
        } => run_training(config, input, model, overrides),
        Command::Predict { model, record } => run_prediction(model, record.as_deref()),
    }
}

/// Print dataset overview and render exploratory charts
fn run_inspect(config: &PipelineConfig, input: &str, output: &str, no_plots: bool) -> Result<()> {
    println!("=== Data Loading and Understanding ===\n");

    let data = load_customer_data(input)?;
    println!("{}\n", data.frame.head(Some(5)));
    println!("{}", data.summary());

    if !no_plots {
        let start = Instant::now();
        let paths = viz::generate_visualization_report(&data.table, &config.target, output)?;
        println!("\n✓ Visualizations generated in {:.2}s", start.elapsed().as_secs_f64());
        for path in paths {
            println!("  Saved: {}", path);
        }
    }

    Ok(())
}

/// Run full training pipeline
fn run_training(
    config: PipelineConfig,
    input: &str,
    model_path: &Path,
    overrides: &TrainOverrides,
) -> Result<()> {
    println!("=== Churn Training Pipeline ===\n");
    let start_time = Instant::now();
    let config = overrides.apply(config)?;

    let data = load_customer_data(input)?;
    println!("✓ Data loaded: {} customers", data.table.height());

    let outcome = pipeline::train(&data.table, &config)?;
    let schema = &outcome.artifact.schema;

    if outcome.dropped_rows > 0 {
        println!(
            "  Dropped {} rows with missing or non-numeric charges",
            outcome.dropped_rows
        );
    }
    println!(
        "✓ Encoding schema derived: {} feature columns (fingerprint {})",
        schema.len(),
        &schema.fingerprint()[..12]
    );
    println!(
        "✓ Model fitted: {} on {} rows, evaluated on {} rows",
        outcome.artifact.metadata.algorithm, outcome.train_rows, outcome.test_rows
    );

    println!("\n=== Evaluation ===");
    println!("{}", outcome.report);

    outcome.artifact.save(model_path)?;

    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", start_time.elapsed().as_secs_f64());
    println!("Model and schema saved to: {}", model_path.display());

    Ok(())
}

/// Score a single customer, or run the interactive form
fn run_prediction(model_path: &Path, record_path: Option<&Path>) -> Result<()> {
    let artifact = ModelArtifact::load(model_path)?;

    match record_path {
        Some(path) => {
            let record = predict::load_record(path)?;
            let prediction = predict::predict_customer(&artifact, &record)?;
            println!("{}", predict::format_prediction(&prediction));
        }
        None => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let count = PredictionForm::new(&artifact, stdin.lock(), stdout.lock()).run()?;
            println!("Scored {} customer(s)", count);
        }
    }

    Ok(())
}
