//! ONNX Runtime backend for classifiers exported from a training notebook

use crate::error::{PredictError, PredictResult};
use crate::models::classifier::Classifier;
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Classifier backed by an ONNX session.
///
/// `Session::run` needs exclusive access, so the session sits behind a
/// mutex; requests against this backend are serialized.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxClassifier {
    /// Load a model file with the given number of intra-op threads.
    pub fn load<P: AsRef<Path>>(path: P, threads: usize) -> Result<Self> {
        let path = path.as_ref();
        ort::init().commit()?;

        info!(path = %path.display(), threads = threads, "Loading ONNX classifier");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(threads)?
            .commit_from_file(path)
            .context(format!("Failed to load ONNX classifier from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // sklearn exports name the probability output "probabilities"
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        info!(input = %input_name, output = %output_name, "ONNX classifier loaded");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    fn run(&self, row: &[f64]) -> Result<f64> {
        let features: Vec<f32> = row.iter().map(|&v| v as f32).collect();
        let shape = vec![1_i64, features.len() as i64];
        let input = Tensor::from_array((shape, features)).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input])?;

        pass_probability(&outputs, &self.output_name)
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        "onnx"
    }

    fn feature_count(&self) -> Option<usize> {
        None
    }

    fn predict_proba(&self, row: &[f64]) -> PredictResult<[f64; 2]> {
        let p_pass = self
            .run(row)
            .map_err(|e| PredictError::Model(e.to_string()))?;
        Ok([1.0 - p_pass, p_pass])
    }
}

/// Positive-class probability from either a `[1, 2]` tensor or the
/// `seq(map(int64, float))` produced by zipmap exports.
fn pass_probability(outputs: &SessionOutputs, output_name: &str) -> Result<f64> {
    let output = outputs
        .get(output_name)
        .ok_or_else(|| anyhow::anyhow!("Output `{}` missing from session", output_name))?;

    if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
        let classes = shape.iter().last().copied().unwrap_or(1);
        let prob = tensor_pass_probability(classes, data)
            .ok_or_else(|| anyhow::anyhow!("Output `{}` is empty", output_name))?;
        debug!(prob = prob, "Extracted from tensor");
        return Ok(f64::from(prob));
    }

    if DynSequenceValueType::can_downcast(&output.dtype()) {
        return from_sequence_map(output);
    }

    Err(anyhow::anyhow!("Unsupported output type for `{}`", output_name))
}

/// Pass probability from a flat tensor: column 1 of a two-class output,
/// otherwise the single value.
fn tensor_pass_probability(classes: i64, data: &[f32]) -> Option<f32> {
    let index = if classes >= 2 { 1 } else { 0 };
    data.get(index).copied()
}

fn from_sequence_map(output: &DynValue) -> Result<f64> {
    let allocator = Allocator::default();
    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;
    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
    let first = maps
        .first()
        .ok_or_else(|| anyhow::anyhow!("Empty probability sequence"))?;
    let pairs = first.try_extract_key_values::<i64, f32>()?;

    if let Some((_, prob)) = pairs.iter().find(|(class, _)| *class == 1) {
        return Ok(f64::from(*prob));
    }
    if let Some((_, prob)) = pairs.iter().find(|(class, _)| *class == 0) {
        return Ok(1.0 - f64::from(*prob));
    }

    Err(anyhow::anyhow!("No class probability found in map"))
}
