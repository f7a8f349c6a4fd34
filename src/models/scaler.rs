//! Standard scaler fitted once and applied read-only at serving time

use crate::error::{PredictError, PredictResult};
use serde::{Deserialize, Serialize};

/// Per-column standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Scaler that leaves rows of `n` columns unchanged.
    pub fn identity(n: usize) -> Self {
        Self {
            mean: vec![0.0; n],
            scale: vec![1.0; n],
        }
    }

    /// Fit on a row-major matrix. Columns with zero variance get a scale
    /// of 1 so they pass through centered.
    pub fn fit(rows: &[Vec<f64>]) -> PredictResult<Self> {
        let first = rows
            .first()
            .ok_or_else(|| PredictError::InvalidInput("cannot fit scaler on zero rows".into()))?;
        let n_features = first.len();
        let n = rows.len() as f64;

        let mut mean = vec![0.0; n_features];
        for row in rows {
            if row.len() != n_features {
                return Err(PredictError::ShapeMismatch {
                    stage: "scaler fit",
                    expected: n_features,
                    actual: row.len(),
                });
            }
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut variance = vec![0.0; n_features];
        for row in rows {
            for ((v, x), m) in variance.iter_mut().zip(row).zip(&mean) {
                *v += (x - m).powi(2);
            }
        }

        let scale = variance
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        Ok(Self { mean, scale })
    }

    pub fn feature_count(&self) -> usize {
        self.mean.len()
    }

    /// Transform one row.
    pub fn transform(&self, row: &[f64]) -> PredictResult<Vec<f64>> {
        if row.len() != self.mean.len() {
            return Err(PredictError::ShapeMismatch {
                stage: "scaler",
                expected: self.mean.len(),
                actual: row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    /// Check that mean and scale agree on the column count.
    pub fn validate(&self) -> PredictResult<()> {
        if self.mean.len() != self.scale.len() {
            return Err(PredictError::ShapeMismatch {
                stage: "scaler artifact",
                expected: self.mean.len(),
                actual: self.scale.len(),
            });
        }
        if self.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(PredictError::Model("scaler has a zero or non-finite scale".into()));
        }
        Ok(())
    }
}
