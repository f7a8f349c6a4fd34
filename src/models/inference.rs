//! The model bundle: schema, scaler and classifier behind one predict call

use crate::error::{PredictError, PredictResult};
use crate::feature_assembler::{FeatureAssembler, FeatureSchema};
use crate::models::classifier::Classifier;
use crate::models::scaler::StandardScaler;
use crate::types::prediction::{PredictionResult, PASS_PROBABILITY};
use crate::types::student::StudentInput;
use std::fmt;
use tracing::debug;

/// Immutable set of fitted artifacts, built once and shared by every
/// presentation surface.
pub struct ModelBundle {
    assembler: FeatureAssembler,
    scaler: StandardScaler,
    classifier: Box<dyn Classifier>,
}

impl ModelBundle {
    /// Assemble a bundle, checking that the three artifacts agree on the
    /// column layout and that the user inputs have a column to land in.
    pub fn new(
        schema: FeatureSchema,
        scaler: StandardScaler,
        classifier: Box<dyn Classifier>,
    ) -> PredictResult<Self> {
        scaler.validate()?;

        if scaler.feature_count() != schema.len() {
            return Err(PredictError::ShapeMismatch {
                stage: "scaler artifact",
                expected: schema.len(),
                actual: scaler.feature_count(),
            });
        }

        if let Some(n) = classifier.feature_count() {
            if n != schema.len() {
                return Err(PredictError::ShapeMismatch {
                    stage: "classifier artifact",
                    expected: schema.len(),
                    actual: n,
                });
            }
        }

        let assembler = FeatureAssembler::new(schema)?;

        Ok(Self {
            assembler,
            scaler,
            classifier,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.assembler.schema()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Assemble, scale and classify one student.
    pub fn predict(&self, input: &StudentInput) -> PredictResult<PredictionResult> {
        let row = self.assembler.assemble(input);
        let scaled = self.scaler.transform(&row)?;

        let [_, p_pass] = self.classifier.predict_proba(&scaled)?;

        if !p_pass.is_finite() {
            return Err(PredictError::Model(format!(
                "classifier returned non-finite probability {}",
                p_pass
            )));
        }

        let result = PredictionResult::new(u8::from(p_pass >= PASS_PROBABILITY), p_pass);

        debug!(
            classifier = %self.classifier.name(),
            absences = input.absences,
            sex = ?input.sex,
            probability = result.probability,
            outcome = ?result.outcome,
            "Prediction complete"
        );

        Ok(result)
    }
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle")
            .field("schema", self.schema())
            .field("scaler", &self.scaler)
            .field("classifier", &self.classifier.name())
            .finish()
    }
}
