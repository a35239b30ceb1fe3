//! Small preprocessing utilities shared by the models.
//!
//! Provides a per-column mean/std standard scaler. The logistic solver
//! standardizes its inputs before gradient descent; the scaler is stored on
//! the fitted model so predictions see the same transform.
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-9;
}

/// Fit a `Scaler` from an `Array2<f64>` where rows are samples and columns
/// are features.
pub fn fit_scaler(x: &Array2<f64>) -> Scaler {
    let (nrows, ncols) = x.dim();
    assert!(nrows > 0 && ncols > 0, "fit_scaler requires non-empty matrix");

    let nrows_f = nrows as f64;
    let mut mean = vec![0.0f64; ncols];
    for row in x.rows() {
        for (c, v) in row.iter().enumerate() {
            mean[c] += v;
        }
    }
    for v in mean.iter_mut() {
        *v /= nrows_f;
    }

    let mut std = vec![0.0f64; ncols];
    for row in x.rows() {
        for (c, v) in row.iter().enumerate() {
            let d = v - mean[c];
            std[c] += d * d;
        }
    }
    for v in std.iter_mut() {
        *v = (*v / nrows_f).sqrt().max(Scaler::MIN_STD);
    }

    Scaler { mean, std }
}

/// Transform all rows using the provided `Scaler` into a new matrix.
pub fn transform_all(x: &Array2<f64>, sc: &Scaler) -> Array2<f64> {
    let (nrows, ncols) = x.dim();
    let mut out = Vec::with_capacity(nrows * ncols);
    for row in x.rows() {
        for (c, v) in row.iter().enumerate() {
            out.push((v - sc.mean[c]) / sc.std[c]);
        }
    }
    Array2::from_shape_vec((nrows, ncols), out).expect("transform_all: shape mismatch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn scaler_centers_and_scales() {
        let x = array![[1.0, 10.0], [3.0, 30.0], [5.0, 50.0]];
        let sc = fit_scaler(&x);
        assert_eq!(sc.mean, vec![3.0, 30.0]);
        let t = transform_all(&x, &sc);
        for c in 0..2 {
            let col_mean: f64 = (0..3).map(|r| t[[r, c]]).sum::<f64>() / 3.0;
            assert!(col_mean.abs() < 1e-12);
        }
        // column order preserved, extremes symmetric
        assert!((t[[0, 0]] + t[[2, 0]]).abs() < 1e-12);
    }

    #[test]
    fn constant_column_does_not_divide_by_zero() {
        let x = array![[2.0], [2.0], [2.0]];
        let sc = fit_scaler(&x);
        let t = transform_all(&x, &sc);
        assert!(t.iter().all(|v| v.is_finite()));
    }
}
