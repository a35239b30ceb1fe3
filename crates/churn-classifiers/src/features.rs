//! Feature selection and train/test splitting.
//!
//! The feature matrix is assembled from a fixed allow-list of 19 columns
//! (14 raw numeric fields + 5 target-encoded fields) in declared order.
//! Splitting returns a single paired [`SplitData`] value so a row's
//! features and label always land on the same side of the partition.
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::{Column, Dataset};
use crate::error::ChurnError;

const STAGE: &str = "feature selection";

/// The columns of the feature matrix, in matrix order.
pub const FEATURE_COLUMNS: [Column; 19] = [
    Column::CustomerAge,
    Column::DependentCount,
    Column::MonthsOnBook,
    Column::TotalRelationshipCount,
    Column::MonthsInactive12Mon,
    Column::ContactsCount12Mon,
    Column::CreditLimit,
    Column::TotalRevolvingBal,
    Column::AvgOpenToBuy,
    Column::TotalAmtChngQ4Q1,
    Column::TotalTransAmt,
    Column::TotalTransCt,
    Column::TotalCtChngQ4Q1,
    Column::AvgUtilizationRatio,
    Column::GenderChurnRate,
    Column::EducationLevelChurnRate,
    Column::MaritalStatusChurnRate,
    Column::IncomeCategoryChurnRate,
    Column::CardCategoryChurnRate,
];

/// Header names of the feature columns, in matrix order.
pub fn feature_names() -> Vec<&'static str> {
    FEATURE_COLUMNS.iter().map(|c| c.name()).collect()
}

/// A train/test partition of the feature matrix and label vector.
///
/// Row `i` of `x_train` and `y_train[i]` come from the same source row
/// (`train_indices[i]`); likewise for the test side. The index sets are
/// disjoint and together cover every source row exactly once.
#[derive(Debug, Clone)]
pub struct SplitData {
    pub x_train: Array2<f64>,
    pub y_train: Vec<i32>,
    pub x_test: Array2<f64>,
    pub y_test: Vec<i32>,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

impl SplitData {
    pub fn n_rows(&self) -> usize {
        self.train_indices.len() + self.test_indices.len()
    }
}

/// Build the feature matrix from the allow-listed columns, in order.
///
/// Fails with `MissingColumn` naming the first absent column, so a dataset
/// that skipped encoding is rejected before any training happens.
pub fn build_feature_matrix(data: &Dataset) -> Result<Array2<f64>, ChurnError> {
    let n_rows = data.n_rows();
    let mut columns = Vec::with_capacity(FEATURE_COLUMNS.len());
    for &column in FEATURE_COLUMNS.iter() {
        columns.push(data.require_numeric(column, STAGE)?);
    }

    let mut values = Vec::with_capacity(n_rows * columns.len());
    for row in 0..n_rows {
        for column in &columns {
            values.push(column[row]);
        }
    }
    Ok(Array2::from_shape_vec((n_rows, columns.len()), values)
        .expect("feature matrix shape mismatch"))
}

/// Extract the binary label vector from the churn column.
pub fn label_vector(data: &Dataset) -> Result<Vec<i32>, ChurnError> {
    let churn = data.require_numeric(Column::Churn, STAGE)?;
    Ok(churn.iter().map(|&v| if v >= 0.5 { 1 } else { 0 }).collect())
}

/// Partition rows into a seeded train/test split.
///
/// `|test| = round(test_fraction * N)` and `|train| = N - |test|`; the same
/// seed always produces the same partition.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &[i32],
    test_fraction: f64,
    seed: u64,
) -> SplitData {
    assert_eq!(x.nrows(), y.len(), "feature matrix and labels must be row-aligned");
    let n = x.nrows();
    let n_test = (test_fraction * n as f64).round() as usize;

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_indices = indices[..n_test].to_vec();
    let train_indices = indices[n_test..].to_vec();

    SplitData {
        x_train: x.select(Axis(0), &train_indices),
        y_train: train_indices.iter().map(|&i| y[i]).collect(),
        x_test: x.select(Axis(0), &test_indices),
        y_test: test_indices.iter().map(|&i| y[i]).collect(),
        train_indices,
        test_indices,
    }
}

/// Select the allow-listed features and split with the fixed ratio/seed.
pub fn select_and_split(
    data: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> Result<SplitData, ChurnError> {
    let x = build_feature_matrix(data)?;
    let y = label_vector(data)?;
    let split = train_test_split(&x, &y, test_fraction, seed);
    log::info!(
        "split {} rows into {} train / {} test (test fraction {})",
        split.n_rows(),
        split.train_indices.len(),
        split.test_indices.len(),
        test_fraction
    );
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use std::collections::HashSet;

    #[test]
    fn split_sizes_match_rounded_fraction() {
        let x = Array2::<f64>::zeros((1000, 3));
        let y = vec![0i32; 1000];
        let split = train_test_split(&x, &y, 0.3, 42);
        assert_eq!(split.test_indices.len(), 300);
        assert_eq!(split.train_indices.len(), 700);
        assert_eq!(split.x_test.nrows(), 300);
        assert_eq!(split.x_train.nrows(), 700);
        assert_eq!(split.y_test.len(), 300);
        assert_eq!(split.y_train.len(), 700);
    }

    #[test]
    fn split_is_an_exact_partition() {
        let x = Array2::<f64>::zeros((101, 2));
        let y = vec![0i32; 101];
        let split = train_test_split(&x, &y, 0.3, 7);
        let train: HashSet<_> = split.train_indices.iter().copied().collect();
        let test: HashSet<_> = split.test_indices.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 101);
        assert_eq!(split.n_rows(), 101);
    }

    #[test]
    fn split_is_deterministic_for_a_seed() {
        let x = Array2::<f64>::zeros((50, 2));
        let y = vec![0i32; 50];
        let a = train_test_split(&x, &y, 0.3, 42);
        let b = train_test_split(&x, &y, 0.3, 42);
        assert_eq!(a.train_indices, b.train_indices);
        assert_eq!(a.test_indices, b.test_indices);
    }

    #[test]
    fn rows_move_as_whole_tuples() {
        // feature value encodes the row index so alignment is checkable
        let n = 40;
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let x = Array2::from_shape_vec((n, 1), values).unwrap();
        let y: Vec<i32> = (0..n as i32).collect();
        let split = train_test_split(&x, &y, 0.25, 3);
        for (pos, &idx) in split.test_indices.iter().enumerate() {
            assert_eq!(split.x_test[[pos, 0]], idx as f64);
            assert_eq!(split.y_test[pos], idx as i32);
        }
        for (pos, &idx) in split.train_indices.iter().enumerate() {
            assert_eq!(split.x_train[[pos, 0]], idx as f64);
            assert_eq!(split.y_train[pos], idx as i32);
        }
    }

    #[test]
    fn missing_feature_column_is_rejected() {
        use crate::data::Dataset;
        let mut data = Dataset::new(2);
        data.insert_numeric(Column::Churn, vec![0.0, 1.0]);
        // only one of the 19 allow-listed columns present
        data.insert_numeric(Column::CustomerAge, vec![40.0, 50.0]);
        let err = build_feature_matrix(&data).unwrap_err();
        assert!(matches!(err, ChurnError::MissingColumn { .. }));
    }

    #[test]
    fn feature_names_are_the_allow_list_in_order() {
        let names = feature_names();
        assert_eq!(names.len(), 19);
        assert_eq!(names[0], "Customer_Age");
        assert_eq!(names[14], "Gender_ChurnRate");
        assert_eq!(names[18], "Card_Category_ChurnRate");
    }
}
