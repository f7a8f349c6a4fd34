//! Artifact loader: reads, or trains and persists, the model bundle

use crate::config::{ArtifactsConfig, TrainingConfig};
use crate::feature_assembler::FeatureSchema;
use crate::models::classifier::{Classifier, LogisticRegression};
use crate::models::inference::ModelBundle;
use crate::models::scaler::StandardScaler;
use crate::training::{self, TrainedArtifacts};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name of the training report written next to the artifacts
pub const REPORT_FILE: &str = "training_report.json";

/// Loader for the classifier, scaler and feature list
pub struct ArtifactLoader {
    config: ArtifactsConfig,
}

impl ArtifactLoader {
    pub fn new(config: &ArtifactsConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Artifact files that do not exist yet
    pub fn missing_artifacts(&self) -> Vec<PathBuf> {
        [
            self.config.classifier_path(),
            self.config.scaler_path(),
            self.config.features_path(),
        ]
        .into_iter()
        .filter(|p| !p.exists())
        .collect()
    }

    /// Load all three artifacts. Any missing or malformed file is an error.
    pub fn load(&self) -> Result<ModelBundle> {
        let features_path = self.config.features_path();
        let schema: FeatureSchema = read_json(&features_path)?;
        let scaler: StandardScaler = read_json(&self.config.scaler_path())?;
        let classifier = self.load_classifier()?;

        info!(
            features = ?schema.names(),
            classifier = %classifier.name(),
            dir = %self.config.dir,
            "Artifacts loaded"
        );

        ModelBundle::new(schema, scaler, classifier).context(format!(
            "Artifacts in {} do not fit together",
            self.config.dir
        ))
    }

    /// Load the artifacts, training and persisting them first when any is
    /// missing and self-training is enabled.
    pub fn load_or_train(&self, training: &TrainingConfig) -> Result<ModelBundle> {
        let missing = self.missing_artifacts();
        if missing.is_empty() {
            return self.load();
        }

        if !self.config.train_if_missing {
            anyhow::bail!(
                "Missing model artifacts {:?} and train_if_missing is disabled",
                missing
            );
        }

        warn!(missing = ?missing, "Model artifacts missing, training from dataset");
        let artifacts = training::train_from_csv(
            &self.config.dataset_path,
            self.config.delimiter()?,
            training,
        )?;
        self.save(&artifacts)?;

        artifacts
            .into_bundle()
            .context("Trained artifacts do not fit together")
    }

    /// Persist trained artifacts and the training report.
    pub fn save(&self, artifacts: &TrainedArtifacts) -> Result<()> {
        if is_onnx(&self.config.classifier_path()) {
            anyhow::bail!(
                "Cannot save a trained classifier to ONNX file {:?}",
                self.config.classifier_path()
            );
        }

        fs::create_dir_all(&self.config.dir)
            .context(format!("Failed to create artifact directory {}", self.config.dir))?;

        write_json(&self.config.features_path(), &artifacts.schema)?;
        write_json(&self.config.scaler_path(), &artifacts.scaler)?;
        write_json(&self.config.classifier_path(), &artifacts.classifier)?;
        write_json(&Path::new(&self.config.dir).join(REPORT_FILE), &artifacts.report)?;

        info!(dir = %self.config.dir, "Artifacts saved");
        Ok(())
    }

    fn load_classifier(&self) -> Result<Box<dyn Classifier>> {
        let path = self.config.classifier_path();

        if is_onnx(&path) {
            return self.load_onnx(&path);
        }

        let model: LogisticRegression = read_json(&path)?;
        Ok(Box::new(model))
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(&self, path: &Path) -> Result<Box<dyn Classifier>> {
        let model = crate::models::onnx::OnnxClassifier::load(path, self.config.onnx_threads)?;
        Ok(Box::new(model))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(&self, path: &Path) -> Result<Box<dyn Classifier>> {
        anyhow::bail!(
            "Classifier {:?} is an ONNX model but the `onnx` feature is not enabled",
            path
        )
    }
}

fn is_onnx(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "onnx")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).context(format!("Failed to read artifact {:?}", path))?;
    serde_json::from_slice(&bytes).context(format!("Failed to parse artifact {:?}", path))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    fs::write(path, json).context(format!("Failed to write artifact {:?}", path))
}
