//! Offline training of the pass/fail classifier

pub mod dataset;
pub mod split;

pub use dataset::LabeledDataset;
pub use split::{stratified_split, Split};

use crate::config::TrainingConfig;
use crate::error::PredictResult;
use crate::feature_assembler::FeatureSchema;
use crate::models::classifier::LogisticRegression;
use crate::models::inference::ModelBundle;
use crate::models::scaler::StandardScaler;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Summary of a training run, persisted next to the artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub trained_at: DateTime<Utc>,
    pub rows: usize,
    pub passes: usize,
    pub fails: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub iterations: usize,
    pub converged: bool,
    pub final_loss: f64,
    pub seed: u64,
}

/// The three fitted artifacts plus how they were produced
#[derive(Debug, Clone)]
pub struct TrainedArtifacts {
    pub schema: FeatureSchema,
    pub scaler: StandardScaler,
    pub classifier: LogisticRegression,
    pub report: TrainingReport,
}

impl TrainedArtifacts {
    pub fn into_bundle(self) -> PredictResult<ModelBundle> {
        ModelBundle::new(self.schema, self.scaler, Box::new(self.classifier))
    }
}

/// Fit scaler and classifier on a labeled dataset.
///
/// The scaler is fitted on every row, then rows are split 80/20 (by
/// default) with label stratification and the classifier is fitted on the
/// training side only. Both classes are expected in the data; a
/// single-class dataset still trains but yields a constant predictor.
pub fn train(dataset: &LabeledDataset, config: &TrainingConfig) -> Result<TrainedArtifacts> {
    let (passes, fails) = dataset.class_counts();
    if passes == 0 || fails == 0 {
        warn!(
            passes = passes,
            fails = fails,
            "Dataset has a single class; the classifier will predict it for every input"
        );
    }

    let scaler = StandardScaler::fit(&dataset.features).context("Failed to fit scaler")?;
    let scaled = dataset
        .features
        .iter()
        .map(|row| scaler.transform(row))
        .collect::<PredictResult<Vec<_>>>()
        .context("Failed to scale dataset")?;

    let split = stratified_split(&dataset.labels, config.test_fraction, config.seed);
    let (x_train, y_train) = split::select(&scaled, &dataset.labels, &split.train);
    let (x_test, y_test) = split::select(&scaled, &dataset.labels, &split.test);

    let (classifier, summary) = LogisticRegression::fit(&x_train, &y_train, &config.fit_options())
        .context("Failed to fit classifier")?;
    if !summary.converged {
        warn!(
            iterations = summary.iterations,
            "Classifier did not converge within max_iter"
        );
    }

    let report = TrainingReport {
        trained_at: Utc::now(),
        rows: dataset.len(),
        passes,
        fails,
        train_rows: x_train.len(),
        test_rows: x_test.len(),
        train_accuracy: classifier.accuracy(&x_train, &y_train)?,
        test_accuracy: classifier.accuracy(&x_test, &y_test)?,
        iterations: summary.iterations,
        converged: summary.converged,
        final_loss: summary.final_loss,
        seed: config.seed,
    };

    info!(
        rows = report.rows,
        train_rows = report.train_rows,
        test_rows = report.test_rows,
        train_accuracy = format!("{:.3}", report.train_accuracy),
        test_accuracy = format!("{:.3}", report.test_accuracy),
        iterations = report.iterations,
        "Classifier trained"
    );

    Ok(TrainedArtifacts {
        schema: dataset.schema.clone(),
        scaler,
        classifier,
        report,
    })
}

/// Read the dataset and train in one step
pub fn train_from_csv(path: &str, delimiter: u8, config: &TrainingConfig) -> Result<TrainedArtifacts> {
    info!(dataset = %path, "Training classifier from dataset");
    let dataset = LabeledDataset::from_csv_path(path, delimiter, config.pass_threshold)?;
    train(&dataset, config)
}
