//! Error types for the prediction path

use thiserror::Error;

/// Errors raised while turning a student input into a prediction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    /// A user-supplied field has no column in the feature schema.
    #[error("feature schema has no column for required input `{0}`")]
    MissingFeature(String),

    /// A row does not have the column count a fitted artifact expects.
    #[error("shape mismatch in {stage}: expected {expected} columns, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The input was rejected before assembly.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The classifier backend failed.
    #[error("model error: {0}")]
    Model(String),
}

pub type PredictResult<T> = Result<T, PredictError>;
