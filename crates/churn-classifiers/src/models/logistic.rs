//! Logistic regression classifier.
//!
//! A single-configuration linear model: per-column standardization
//! followed by batch gradient descent on the log-loss with a fixed step
//! size and an iteration cap. Hitting the cap without reaching the
//! gradient tolerance is not an error; it is recorded on the fitted model
//! and only affects output quality.
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::models::classifier_trait::ClassifierModel;
use crate::preprocessing::{fit_scaler, transform_all, Scaler};

/// Solver configuration for the linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    pub learning_rate: f64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        LogisticParams {
            learning_rate: 0.1,
            // generous cap so the solver does not give up on slow problems
            max_iter: 3000,
            tol: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogisticFit {
    scaler: Scaler,
    weights: Vec<f64>,
    intercept: f64,
    converged: bool,
    n_iter: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    params: LogisticParams,
    fitted: Option<LogisticFit>,
}

impl LogisticRegression {
    pub fn new(params: LogisticParams) -> Self {
        LogisticRegression {
            params,
            fitted: None,
        }
    }

    pub fn params(&self) -> &LogisticParams {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Whether the solver reached the gradient tolerance before the
    /// iteration cap. Diagnostic only; predictions work either way.
    pub fn converged(&self) -> bool {
        self.fitted.as_ref().expect("model not fitted").converged
    }

    pub fn n_iter(&self) -> usize {
        self.fitted.as_ref().expect("model not fitted").n_iter
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl ClassifierModel for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &[i32]) {
        assert_eq!(x.nrows(), y.len(), "feature matrix and labels must be row-aligned");
        let scaler = fit_scaler(x);
        let xs = transform_all(x, &scaler);
        let yf = Array1::from_iter(y.iter().map(|&v| v as f64));
        let n = xs.nrows() as f64;

        let mut weights = Array1::<f64>::zeros(xs.ncols());
        let mut intercept = 0.0f64;
        let mut converged = false;
        let mut n_iter = 0usize;

        for iter in 0..self.params.max_iter {
            n_iter = iter + 1;
            let z = xs.dot(&weights).mapv(|v| v + intercept);
            let errors = z.mapv(sigmoid) - &yf;
            let grad_w = xs.t().dot(&errors) / n;
            let grad_b = errors.sum() / n;

            let grad_norm = grad_w
                .iter()
                .map(|g| g * g)
                .sum::<f64>()
                .sqrt()
                .max(grad_b.abs());

            weights = weights - grad_w * self.params.learning_rate;
            intercept -= grad_b * self.params.learning_rate;

            if grad_norm < self.params.tol {
                converged = true;
                break;
            }
        }

        if !converged {
            // tolerated: the run proceeds with the cap-limited coefficients
            log::debug!(
                "logistic solver stopped at the {}-iteration cap without reaching tol={}",
                self.params.max_iter,
                self.params.tol
            );
        }

        self.fitted = Some(LogisticFit {
            scaler,
            weights: weights.to_vec(),
            intercept,
            converged,
            n_iter,
        });
    }

    fn predict(&self, x: &Array2<f64>) -> Vec<i32> {
        self.predict_proba(x)
            .into_iter()
            .map(|p| if p >= 0.5 { 1 } else { 0 })
            .collect()
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Vec<f64> {
        let fit = self.fitted.as_ref().expect("model not fitted");
        let xs = transform_all(x, &fit.scaler);
        let weights = Array1::from_vec(fit.weights.clone());
        xs.dot(&weights)
            .iter()
            .map(|z| sigmoid(z + fit.intercept))
            .collect()
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn separable_data() -> (Array2<f64>, Vec<i32>) {
        let mut values = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            let signal = if i % 2 == 0 { 2.0 } else { -2.0 };
            values.extend_from_slice(&[signal, 7.0]);
            labels.push(if i % 2 == 0 { 1 } else { 0 });
        }
        (Array2::from_shape_vec((30, 2), values).unwrap(), labels)
    }

    #[test]
    fn learns_a_separable_signal() {
        let (x, y) = separable_data();
        let mut model = LogisticRegression::new(LogisticParams::default());
        model.fit(&x, &y);
        assert_eq!(model.predict(&x), y);
        for (p, &label) in model.predict_proba(&x).iter().zip(y.iter()) {
            if label == 1 {
                assert!(*p > 0.5);
            } else {
                assert!(*p < 0.5);
            }
        }
    }

    #[test]
    fn hitting_the_iteration_cap_is_not_an_error() {
        let (x, y) = separable_data();
        let mut model = LogisticRegression::new(LogisticParams {
            max_iter: 1,
            ..LogisticParams::default()
        });
        model.fit(&x, &y);
        assert!(!model.converged());
        assert_eq!(model.n_iter(), 1);
        // predictions still come out
        assert_eq!(model.predict_proba(&x).len(), y.len());
    }

    #[test]
    fn probabilities_are_bounded() {
        let (x, y) = separable_data();
        let mut model = LogisticRegression::new(LogisticParams::default());
        model.fit(&x, &y);
        for p in model.predict_proba(&x) {
            assert!((0.0..=1.0).contains(&p));
        }
    }
}
