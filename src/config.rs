//! Configuration management for the student pass predictor

use crate::models::classifier::FitOptions;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    pub training: TrainingConfig,
    pub presentation: PresentationConfig,
    pub nats: NatsConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("Invalid server address")
    }
}

/// Where the fitted artifacts live and how to obtain them
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Directory holding the three artifacts
    pub dir: String,
    /// Classifier file (`.json` logistic regression or `.onnx`)
    pub classifier_file: String,
    /// Scaler file
    pub scaler_file: String,
    /// Ordered feature-name list
    pub features_file: String,
    /// Train from the dataset when any artifact is missing
    pub train_if_missing: bool,
    /// Labeled dataset used for training
    pub dataset_path: String,
    /// CSV field delimiter
    pub csv_delimiter: String,
    /// Intra-op threads for the ONNX backend
    pub onnx_threads: usize,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: "models".to_string(),
            classifier_file: "classifier.json".to_string(),
            scaler_file: "scaler.json".to_string(),
            features_file: "features.json".to_string(),
            train_if_missing: true,
            dataset_path: "data/student_data.csv".to_string(),
            csv_delimiter: ",".to_string(),
            onnx_threads: 1,
        }
    }
}

impl ArtifactsConfig {
    pub fn classifier_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.classifier_file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.scaler_file)
    }

    pub fn features_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.features_file)
    }

    /// Delimiter as a single byte
    pub fn delimiter(&self) -> Result<u8> {
        match self.csv_delimiter.as_bytes() {
            [b] => Ok(*b),
            _ => anyhow::bail!(
                "csv_delimiter must be a single ASCII character, got {:?}",
                self.csv_delimiter
            ),
        }
    }
}

/// Self-training parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Final grade (G3) at or above which a student passes
    pub pass_threshold: f64,
    /// Fraction of rows held out for evaluation
    pub test_fraction: f64,
    /// Seed for the stratified split
    pub seed: u64,
    /// Gradient descent iteration cap
    pub max_iter: usize,
    pub learning_rate: f64,
    /// Inverse L2 regularization strength
    pub c: f64,
    pub tolerance: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 10.0,
            test_fraction: 0.2,
            seed: 42,
            max_iter: 1000,
            learning_rate: 0.5,
            c: 1.0,
            tolerance: 1e-6,
        }
    }
}

impl TrainingConfig {
    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            c: self.c,
            learning_rate: self.learning_rate,
            max_iter: self.max_iter,
            tolerance: self.tolerance,
        }
    }
}

/// Form behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Reject submissions with an empty name or class
    pub require_identity: bool,
    /// Upper bound accepted for the absences field
    pub max_absences: u32,
    /// Page title
    pub title: String,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            require_identity: true,
            max_absences: 100,
            title: "Prediksi Kelulusan Siswa".to_string(),
        }
    }
}

/// NATS request/reply surface
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NatsConfig {
    pub enabled: bool,
    /// NATS server URL
    pub url: String,
    /// Subject prediction requests arrive on
    pub request_subject: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "nats://localhost:4222".to_string(),
            request_subject: "students.predict".to_string(),
        }
    }
}

/// Metrics reporting
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Seconds between summaries; 0 disables the periodic reporter
    pub report_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 60,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path, with `PREDICTOR__*`
    /// environment variables taking precedence.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("PREDICTOR").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        let training = &self.training;
        if !(training.test_fraction > 0.0 && training.test_fraction < 1.0) {
            anyhow::bail!("training.test_fraction must be in (0, 1), got {}", training.test_fraction);
        }
        if training.max_iter == 0 {
            anyhow::bail!("training.max_iter must be positive");
        }
        if training.c <= 0.0 {
            anyhow::bail!("training.c must be positive, got {}", training.c);
        }
        self.artifacts.delimiter()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.training.pass_threshold, 10.0);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.training.test_fraction, 0.2);
        assert!(config.presentation.require_identity);
        assert!(!config.nats.enabled);
        assert!(config.artifacts.train_if_missing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_matches_shipped_file() {
        let shipped = AppConfig::load_from_path(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("config/config.toml"),
        )
        .unwrap();
        let defaults = AppConfig::default();

        assert_eq!(shipped.artifacts.train_if_missing, defaults.artifacts.train_if_missing);
        assert_eq!(shipped.artifacts.dir, defaults.artifacts.dir);
        assert_eq!(shipped.artifacts.dataset_path, defaults.artifacts.dataset_path);
        assert_eq!(shipped.server.port, defaults.server.port);
        assert_eq!(shipped.training.seed, defaults.training.seed);
        assert_eq!(shipped.presentation.max_absences, defaults.presentation.max_absences);
    }

    #[test]
    fn test_artifact_paths() {
        let artifacts = ArtifactsConfig::default();
        assert_eq!(artifacts.classifier_path(), Path::new("models/classifier.json"));
        assert_eq!(artifacts.features_path(), Path::new("models/features.json"));
        assert_eq!(artifacts.delimiter().unwrap(), b',');
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = 9000\n\n[training]\nseed = 7").unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.training.seed, 7);
        assert_eq!(config.training.max_iter, 1000);
    }

    #[test]
    fn test_invalid_test_fraction() {
        let mut config = AppConfig::default();
        config.training.test_fraction = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_delimiter() {
        let mut artifacts = ArtifactsConfig::default();
        artifacts.csv_delimiter = ";;".to_string();
        assert!(artifacts.delimiter().is_err());
    }
}
