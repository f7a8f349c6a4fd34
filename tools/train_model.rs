//! Offline Model Trainer
//!
//! Trains the pass/fail classifier from the labeled dataset and writes the
//! classifier, scaler and feature list the predictor loads at startup.

use anyhow::Result;
use student_pass_predictor::{config::AppConfig, models::ArtifactLoader, telemetry, training};
use tracing::info;

fn main() -> Result<()> {
    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let config_path = args.get(1).map(|s| s.as_str()).unwrap_or("config/config.toml");

    let mut config = AppConfig::load_from_path(config_path)?;
    if let Some(dataset) = args.get(2) {
        config.artifacts.dataset_path = dataset.clone();
    }

    telemetry::init(&config.logging, "train_model")?;
    info!(
        config = %config_path,
        dataset = %config.artifacts.dataset_path,
        output_dir = %config.artifacts.dir,
        "Starting offline training"
    );

    let artifacts = training::train_from_csv(
        &config.artifacts.dataset_path,
        config.artifacts.delimiter()?,
        &config.training,
    )?;

    ArtifactLoader::new(&config.artifacts).save(&artifacts)?;

    let report = &artifacts.report;
    info!(
        rows = report.rows,
        passes = report.passes,
        fails = report.fails,
        test_accuracy = format!("{:.3}", report.test_accuracy),
        converged = report.converged,
        coefficients = ?artifacts.classifier.coefficients,
        intercept = artifacts.classifier.intercept,
        "Training complete"
    );

    Ok(())
}
