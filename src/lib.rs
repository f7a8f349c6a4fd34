//! Student Pass Predictor Library
//!
//! Predicts whether a student will pass (graduate) from the number of
//! absences and sex, using a fitted scaler and logistic classifier
//! loaded once and shared by the web form and the NATS responder.

pub mod config;
pub mod error;
pub mod feature_assembler;
pub mod metrics;
pub mod models;
pub mod producer;
pub mod responder;
pub mod telemetry;
pub mod training;
pub mod types;
pub mod validation;
pub mod web;

pub use config::AppConfig;
pub use error::PredictError;
pub use feature_assembler::{FeatureAssembler, FeatureSchema};
pub use models::{ArtifactLoader, ModelBundle};
pub use responder::PredictionResponder;
pub use types::{prediction::PredictionResult, student::StudentInput};
