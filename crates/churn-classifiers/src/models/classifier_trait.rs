use ndarray::Array2;

/// A small trait abstraction over the two classifier families so the
/// evaluation and persistence stages can treat them uniformly. This
/// centralizes the contract in the `models` module so implementations can
/// live next to model code.
pub trait ClassifierModel {
    /// Fit the model. `y` uses the crate convention (1 for churned, 0 for
    /// existing customers).
    fn fit(&mut self, x: &Array2<f64>, y: &[i32]);

    /// Predict hard 0/1 labels.
    fn predict(&self, x: &Array2<f64>) -> Vec<i32>;

    /// Predict churn probabilities (0..1).
    fn predict_proba(&self, x: &Array2<f64>) -> Vec<f64>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
