//! Type definitions for the student pass predictor

pub mod prediction;
pub mod student;

pub use prediction::{Outcome, PredictRequest, PredictResponse, PredictionResult};
pub use student::{Sex, StudentInput};
