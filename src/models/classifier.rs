//! Binary classifiers behind a common predict/predict_proba contract

use crate::error::{PredictError, PredictResult};
use crate::types::prediction::PASS_PROBABILITY;
use serde::{Deserialize, Serialize};

/// A fitted binary classifier.
///
/// `predict` is derived from `predict_proba` so the label and the
/// probability shown to the user can never disagree.
pub trait Classifier: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Number of input columns, when the backend knows it up front
    fn feature_count(&self) -> Option<usize>;

    /// Class probabilities `[p_fail, p_pass]` for one scaled row
    fn predict_proba(&self, row: &[f64]) -> PredictResult<[f64; 2]>;

    /// Class label (1 = pass) for one scaled row
    fn predict(&self, row: &[f64]) -> PredictResult<u8> {
        let [_, p_pass] = self.predict_proba(row)?;
        Ok(u8::from(p_pass >= PASS_PROBABILITY))
    }
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Hyperparameters for fitting [`LogisticRegression`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Inverse L2 regularization strength
    pub c: f64,
    /// Gradient descent step size
    pub learning_rate: f64,
    /// Iteration cap
    pub max_iter: usize,
    /// Stop once every gradient component is below this
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            c: 1.0,
            learning_rate: 0.5,
            max_iter: 1000,
            tolerance: 1e-6,
        }
    }
}

/// Outcome of a fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSummary {
    pub iterations: usize,
    pub converged: bool,
    pub final_loss: f64,
}

/// Logistic regression over standardized features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    /// Linear score `w·x + b`
    pub fn decision_function(&self, row: &[f64]) -> PredictResult<f64> {
        if row.len() != self.coefficients.len() {
            return Err(PredictError::ShapeMismatch {
                stage: "classifier",
                expected: self.coefficients.len(),
                actual: row.len(),
            });
        }

        Ok(self
            .coefficients
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept)
    }

    /// Fit by batch gradient descent on the L2-regularized log loss
    /// `mean(logloss) + ||w||^2 / (2 * C * n)`. The intercept is not
    /// penalized. A single-class `y` is accepted; the intercept then
    /// drifts toward that class until the iteration cap.
    pub fn fit(x: &[Vec<f64>], y: &[u8], options: &FitOptions) -> PredictResult<(Self, FitSummary)> {
        if x.is_empty() {
            return Err(PredictError::InvalidInput("cannot fit classifier on zero rows".into()));
        }
        if x.len() != y.len() {
            return Err(PredictError::ShapeMismatch {
                stage: "classifier fit labels",
                expected: x.len(),
                actual: y.len(),
            });
        }
        if options.c <= 0.0 {
            return Err(PredictError::InvalidInput("regularization C must be positive".into()));
        }

        let n_features = x[0].len();
        let n = x.len() as f64;
        let mut model = Self::new(vec![0.0; n_features], 0.0);
        let mut summary = FitSummary {
            iterations: 0,
            converged: false,
            final_loss: f64::NAN,
        };

        for iteration in 1..=options.max_iter {
            let mut grad_w = vec![0.0; n_features];
            let mut grad_b = 0.0;

            for (row, &label) in x.iter().zip(y) {
                let p = sigmoid(model.decision_function(row)?);
                let residual = p - f64::from(label);
                for (g, v) in grad_w.iter_mut().zip(row) {
                    *g += residual * v;
                }
                grad_b += residual;
            }

            for (g, w) in grad_w.iter_mut().zip(&model.coefficients) {
                *g = *g / n + w / (options.c * n);
            }
            grad_b /= n;

            for (w, g) in model.coefficients.iter_mut().zip(&grad_w) {
                *w -= options.learning_rate * g;
            }
            model.intercept -= options.learning_rate * grad_b;

            summary.iterations = iteration;
            let max_grad = grad_w.iter().fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if max_grad < options.tolerance {
                summary.converged = true;
                break;
            }
        }

        summary.final_loss = model.log_loss(x, y)?;
        Ok((model, summary))
    }

    /// Mean binary cross-entropy over a dataset
    pub fn log_loss(&self, x: &[Vec<f64>], y: &[u8]) -> PredictResult<f64> {
        let eps = 1e-15;
        let mut total = 0.0;
        for (row, &label) in x.iter().zip(y) {
            let p = sigmoid(self.decision_function(row)?).clamp(eps, 1.0 - eps);
            total -= if label == 1 { p.ln() } else { (1.0 - p).ln() };
        }
        Ok(total / x.len().max(1) as f64)
    }

    /// Fraction of rows whose predicted label matches `y`
    pub fn accuracy(&self, x: &[Vec<f64>], y: &[u8]) -> PredictResult<f64> {
        if x.is_empty() {
            return Ok(0.0);
        }
        let mut correct = 0usize;
        for (row, &label) in x.iter().zip(y) {
            if self.predict(row)? == label {
                correct += 1;
            }
        }
        Ok(correct as f64 / x.len() as f64)
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &str {
        "logistic_regression"
    }

    fn feature_count(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn predict_proba(&self, row: &[f64]) -> PredictResult<[f64; 2]> {
        let p_pass = sigmoid(self.decision_function(row)?);
        Ok([1.0 - p_pass, p_pass])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(6.0) - 0.997_527_376).abs() < 1e-9);
        assert!((sigmoid(-6.0) - 0.002_472_623).abs() < 1e-9);
        assert!(sigmoid(-800.0) >= 0.0);
    }

    #[test]
    fn test_predict_matches_proba() {
        let model = LogisticRegression::new(vec![0.1, 0.5], -1.0);

        // z = 0.5 + 0.5 - 1.0 = 0 -> exactly on the boundary, counts as pass
        let proba = model.predict_proba(&[5.0, 1.0]).unwrap();
        assert_eq!(proba, [0.5, 0.5]);
        assert_eq!(model.predict(&[5.0, 1.0]).unwrap(), 1);

        // z = 0.1 - 1.0 < 0 -> fail
        assert_eq!(model.predict(&[1.0, 0.0]).unwrap(), 0);
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let model = LogisticRegression::new(vec![1.0, 1.0], 0.0);
        assert!(matches!(
            model.predict_proba(&[1.0]),
            Err(PredictError::ShapeMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_fit_separable_data() {
        let x = vec![vec![-2.0], vec![-1.5], vec![-1.0], vec![1.0], vec![1.5], vec![2.0]];
        let y = vec![0, 0, 0, 1, 1, 1];

        let (model, summary) = LogisticRegression::fit(&x, &y, &FitOptions::default()).unwrap();

        assert!(summary.iterations > 0);
        assert!(model.coefficients[0] > 0.0);
        assert_eq!(model.accuracy(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_fit_single_class_does_not_error() {
        let x = vec![vec![0.0], vec![1.0], vec![-1.0]];
        let y = vec![0, 0, 0];

        let (model, _) = LogisticRegression::fit(&x, &y, &FitOptions::default()).unwrap();

        assert!(model.intercept < 0.0);
        for row in &x {
            assert_eq!(model.predict(row).unwrap(), 0);
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let x = vec![vec![0.5, 1.0], vec![-0.5, 0.0], vec![1.5, 1.0], vec![-1.5, 0.0]];
        let y = vec![1, 0, 1, 0];

        let (a, _) = LogisticRegression::fit(&x, &y, &FitOptions::default()).unwrap();
        let (b, _) = LogisticRegression::fit(&x, &y, &FitOptions::default()).unwrap();

        assert_eq!(a, b);
    }
}
