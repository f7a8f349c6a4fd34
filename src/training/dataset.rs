//! Labeled student dataset read from CSV

use crate::feature_assembler::{FeatureSchema, ABSENCES, SEX_MALE};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The columns training needs; any other column in the file is ignored.
#[derive(Debug, Clone, Deserialize)]
struct StudentRow {
    absences: f64,
    sex: String,
    #[serde(rename = "G3")]
    final_grade: f64,
}

/// Feature matrix and pass/fail labels derived from the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledDataset {
    pub schema: FeatureSchema,
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
}

impl LabeledDataset {
    /// Read a CSV file. A missing file is an error.
    pub fn from_csv_path<P: AsRef<Path>>(path: P, delimiter: u8, pass_threshold: f64) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).context(format!("Failed to open dataset {:?}", path))?;
        Self::from_reader(file, delimiter, pass_threshold)
            .context(format!("Failed to read dataset {:?}", path))
    }

    /// Read CSV with a header row. The target is 1 when `G3 >= pass_threshold`;
    /// features are `absences` and the `sex_M` one-hot column.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8, pass_threshold: f64) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut features = Vec::new();
        let mut labels = Vec::new();

        for (index, row) in csv.deserialize::<StudentRow>().enumerate() {
            // header is line 1
            let line = index + 2;
            let row = row.context(format!("Invalid row at line {}", line))?;

            let sex_male = match row.sex.as_str() {
                "M" => 1.0,
                "F" => 0.0,
                other => anyhow::bail!("Unknown sex value {:?} at line {}", other, line),
            };
            if row.absences < 0.0 {
                anyhow::bail!("Negative absences at line {}", line);
            }

            features.push(vec![row.absences, sex_male]);
            labels.push(u8::from(row.final_grade >= pass_threshold));
        }

        if features.is_empty() {
            anyhow::bail!("Dataset has no rows");
        }

        Ok(Self {
            schema: FeatureSchema::new([ABSENCES, SEX_MALE]),
            features,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(passes, fails)`
    pub fn class_counts(&self) -> (usize, usize) {
        let passes = self.labels.iter().filter(|&&l| l == 1).count();
        (passes, self.labels.len() - passes)
    }
}
