//! Feature assembly for pass/fail model inference.
//!
//! The classifier and scaler were fitted on a fixed, ordered list of
//! columns. A request only carries the number of absences and the sex
//! choice, so the row is rebuilt by walking the schema in order and
//! zero-filling every column the user does not supply.

use crate::error::{PredictError, PredictResult};
use crate::types::student::StudentInput;
use serde::{Deserialize, Serialize};

/// Column holding the number of absences
pub const ABSENCES: &str = "absences";

/// One-hot column for male students (`sex_F` is the dropped reference level)
pub const SEX_MALE: &str = "sex_M";

/// Columns every schema must contain for user input to reach the model
pub const REQUIRED_FEATURES: [&str; 2] = [ABSENCES, SEX_MALE];

/// Ordered feature names the fitted artifacts expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of a column, if present
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Fail on the first required column the schema lacks.
    pub fn require_inputs(&self) -> PredictResult<()> {
        for name in REQUIRED_FEATURES {
            if self.position(name).is_none() {
                return Err(PredictError::MissingFeature(name.to_string()));
            }
        }
        Ok(())
    }
}

/// Builds model rows from student input in schema order.
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    schema: FeatureSchema,
    absences_idx: usize,
    sex_male_idx: usize,
}

impl FeatureAssembler {
    /// Create an assembler, rejecting schemas that cannot receive the
    /// user-supplied columns.
    pub fn new(schema: FeatureSchema) -> PredictResult<Self> {
        schema.require_inputs()?;

        let absences_idx = schema
            .position(ABSENCES)
            .ok_or_else(|| PredictError::MissingFeature(ABSENCES.to_string()))?;
        let sex_male_idx = schema
            .position(SEX_MALE)
            .ok_or_else(|| PredictError::MissingFeature(SEX_MALE.to_string()))?;

        Ok(Self {
            schema,
            absences_idx,
            sex_male_idx,
        })
    }

    /// Assemble one row: absences and the male indicator at their schema
    /// positions, zero everywhere else.
    pub fn assemble(&self, input: &StudentInput) -> Vec<f64> {
        let mut row = vec![0.0; self.schema.len()];
        row[self.absences_idx] = f64::from(input.absences);
        row[self.sex_male_idx] = input.sex.male_indicator();
        row
    }

    /// Number of columns produced
    pub fn feature_count(&self) -> usize {
        self.schema.len()
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::student::Sex;

    fn wide_schema() -> FeatureSchema {
        FeatureSchema::new(["G1", "absences", "studytime", "sex_M", "failures"])
    }

    #[test]
    fn test_assemble_zero_fills_other_columns() {
        let assembler = FeatureAssembler::new(wide_schema()).unwrap();
        let input = StudentInput::new("Budi", "XI IPA 1", 7, Sex::Male);

        let row = assembler.assemble(&input);

        assert_eq!(row.len(), assembler.feature_count());
        assert_eq!(row, vec![0.0, 7.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_assemble_female() {
        let assembler = FeatureAssembler::new(wide_schema()).unwrap();
        let input = StudentInput::new("Sari", "XI IPA 1", 0, Sex::Female);

        assert_eq!(assembler.assemble(&input), vec![0.0; 5]);
    }

    #[test]
    fn test_follows_schema_order() {
        let schema = FeatureSchema::new(["sex_M", "absences"]);
        let assembler = FeatureAssembler::new(schema).unwrap();
        let input = StudentInput::new("", "", 3, Sex::Male);

        assert_eq!(assembler.assemble(&input), vec![1.0, 3.0]);
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let schema = FeatureSchema::new(["G1", "absences"]);
        let err = FeatureAssembler::new(schema).unwrap_err();

        assert_eq!(err, PredictError::MissingFeature("sex_M".to_string()));
    }

    #[test]
    fn test_schema_serializes_as_list() {
        let schema = FeatureSchema::new(["absences", "sex_M"]);
        let json = serde_json::to_string(&schema).unwrap();

        assert_eq!(json, r#"["absences","sex_M"]"#);
    }
}
