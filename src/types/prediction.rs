//! Prediction results and the request/reply envelopes

use crate::types::student::StudentInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Probability at or above which a student is predicted to pass.
pub const PASS_PROBABILITY: f64 = 0.5;

/// Predicted graduation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
}

impl Outcome {
    /// Map a classifier label (1 = pass) to an outcome
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }

    pub fn is_pass(self) -> bool {
        self == Outcome::Pass
    }

    /// Label shown to the user
    pub fn display_label(self) -> &'static str {
        match self {
            Outcome::Pass => "Lulus",
            Outcome::Fail => "Tidak Lulus",
        }
    }
}

/// Result of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Pass or fail
    pub outcome: Outcome,
    /// Raw classifier label (0 or 1)
    pub label: u8,
    /// Positive-class probability (0.0 - 1.0)
    pub probability: f64,
    /// Positive-class probability as a percentage, two decimals
    pub probability_percent: f64,
}

impl PredictionResult {
    /// Build a result from the classifier label and positive-class probability.
    pub fn new(label: u8, probability: f64) -> Self {
        Self {
            outcome: Outcome::from_label(label),
            label,
            probability,
            probability_percent: to_percent(probability),
        }
    }
}

/// Convert a probability to a percentage rounded to two decimals.
pub fn to_percent(probability: f64) -> f64 {
    let percent = (probability.clamp(0.0, 1.0) * 100.0 * 100.0).round() / 100.0;
    percent.clamp(0.0, 100.0)
}

/// Prediction request received on the request subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Optional caller-chosen id; generated when absent
    #[serde(default)]
    pub request_id: Option<Uuid>,

    #[serde(flatten)]
    pub student: StudentInput,
}

/// Reply sent for each request. Prediction fields sit at the top level
/// next to the id and timestamp; a failed request carries `error` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub request_id: Uuid,
    pub predicted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub prediction: Option<PredictionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictResponse {
    pub fn success(request_id: Uuid, prediction: PredictionResult) -> Self {
        Self {
            request_id,
            predicted_at: Utc::now(),
            prediction: Some(prediction),
            error: None,
        }
    }

    pub fn failure(request_id: Uuid, error: impl Into<String>) -> Self {
        Self {
            request_id,
            predicted_at: Utc::now(),
            prediction: None,
            error: Some(error.into()),
        }
    }
}
