//! Hyperparameter grid search with k-fold cross-validation.
//!
//! The grid is enumerated in a fixed nested order
//! (`n_estimators` → `max_features` → `max_depth` → `criterion`).
//! Candidate scoring may fan out across rayon workers, but the winner is
//! chosen by a sequential reduction over the enumeration order that only
//! replaces on a strictly greater score, so equal-scoring candidates
//! resolve to the earliest index regardless of completion order.
use ndarray::{Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ChurnError;
use crate::metrics::accuracy;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::forest::{ForestParams, MaxFeatures, RandomForestClassifier, SplitCriterion};

/// The search space for the forest, one axis per hyperparameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestGrid {
    pub n_estimators: Vec<usize>,
    pub max_features: Vec<MaxFeatures>,
    pub max_depth: Vec<usize>,
    pub criterion: Vec<SplitCriterion>,
}

impl Default for ForestGrid {
    fn default() -> Self {
        ForestGrid {
            n_estimators: vec![200, 500],
            max_features: vec![MaxFeatures::Auto, MaxFeatures::Sqrt],
            max_depth: vec![4, 5, 100],
            criterion: vec![SplitCriterion::Gini, SplitCriterion::Entropy],
        }
    }
}

impl ForestGrid {
    /// Expand the grid into concrete candidates, in enumeration order.
    pub fn candidates(&self, seed: u64) -> Vec<ForestParams> {
        let mut out = Vec::with_capacity(
            self.n_estimators.len()
                * self.max_features.len()
                * self.max_depth.len()
                * self.criterion.len(),
        );
        for &n_estimators in &self.n_estimators {
            for &max_features in &self.max_features {
                for &max_depth in &self.max_depth {
                    for &criterion in &self.criterion {
                        out.push(ForestParams {
                            n_estimators,
                            max_features,
                            max_depth,
                            criterion,
                            seed,
                        });
                    }
                }
            }
        }
        out
    }
}

/// Outcome of a completed grid search: the refit winner and its scores.
#[derive(Debug)]
pub struct ForestSearchOutcome {
    /// The winning configuration refit on the full training split.
    pub model: RandomForestClassifier,
    pub best_params: ForestParams,
    pub best_index: usize,
    pub best_score: f64,
    /// Mean cross-validation score per candidate, in enumeration order.
    pub cv_scores: Vec<f64>,
}

/// Deterministic k-fold partition of `0..n_samples` into (train, validation)
/// index pairs. Folds are contiguous and near-equal; together the
/// validation sides cover every index exactly once.
pub fn kfold_indices(n_samples: usize, k: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
    assert!(k >= 2, "cross-validation needs at least 2 folds");
    let base = n_samples / k;
    let remainder = n_samples % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0usize;
    for fold in 0..k {
        let len = base + usize::from(fold < remainder);
        let end = start + len;
        let validation: Vec<usize> = (start..end).collect();
        let train: Vec<usize> = (0..start).chain(end..n_samples).collect();
        folds.push((train, validation));
        start = end;
    }
    folds
}

/// Mean validation accuracy of one candidate across the folds.
///
/// Returns NaN when any fold is degenerate (empty train or validation
/// side), which the best-candidate reduction then ignores.
pub fn cross_val_score(
    params: &ForestParams,
    x: &Array2<f64>,
    y: &[i32],
    folds: &[(Vec<usize>, Vec<usize>)],
) -> f64 {
    let mut total = 0.0f64;
    for (train, validation) in folds {
        if train.is_empty() || validation.is_empty() {
            return f64::NAN;
        }
        let x_train = x.select(Axis(0), train);
        let y_train: Vec<i32> = train.iter().map(|&i| y[i]).collect();
        let x_val = x.select(Axis(0), validation);
        let y_val: Vec<i32> = validation.iter().map(|&i| y[i]).collect();

        let mut model = RandomForestClassifier::new(params.clone());
        model.fit(&x_train, &y_train);
        total += accuracy(&y_val, &model.predict(&x_val));
    }
    total / folds.len() as f64
}

/// Pure reduction over candidate scores: highest finite score wins, ties
/// keep the earliest enumeration index.
pub fn select_best(scores: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if !score.is_finite() {
            continue;
        }
        match best {
            None => best = Some((index, score)),
            Some((_, best_score)) if score > best_score => best = Some((index, score)),
            _ => {}
        }
    }
    best
}

/// Exhaustive cross-validated search over the grid, refitting the winner
/// on the full training split.
pub fn grid_search_forest(
    grid: &ForestGrid,
    x: &Array2<f64>,
    y: &[i32],
    cv_folds: usize,
    seed: u64,
) -> Result<ForestSearchOutcome, ChurnError> {
    let candidates = grid.candidates(seed);
    let folds = kfold_indices(x.nrows(), cv_folds);
    log::info!(
        "grid search: {} candidates x {} folds on {} rows",
        candidates.len(),
        cv_folds,
        x.nrows()
    );

    let cv_scores: Vec<f64> = candidates
        .par_iter()
        .map(|params| cross_val_score(params, x, y, &folds))
        .collect();

    let (best_index, best_score) =
        select_best(&cv_scores).ok_or(ChurnError::SearchExhausted {
            candidates: candidates.len(),
        })?;
    let best_params = candidates[best_index].clone();
    log::info!(
        "grid search winner #{}: {:?} (mean cv accuracy {:.4})",
        best_index,
        best_params,
        best_score
    );

    let mut model = RandomForestClassifier::new(best_params.clone());
    model.fit(x, y);

    Ok(ForestSearchOutcome {
        model,
        best_params,
        best_index,
        best_score,
        cv_scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_grid_has_24_candidates_in_nested_order() {
        let grid = ForestGrid::default();
        let candidates = grid.candidates(42);
        assert_eq!(candidates.len(), 24);
        // first candidate: all leading axis values
        assert_eq!(candidates[0].n_estimators, 200);
        assert_eq!(candidates[0].max_features, MaxFeatures::Auto);
        assert_eq!(candidates[0].max_depth, 4);
        assert_eq!(candidates[0].criterion, SplitCriterion::Gini);
        // criterion varies fastest
        assert_eq!(candidates[1].criterion, SplitCriterion::Entropy);
        assert_eq!(candidates[1].max_depth, 4);
        // then max_depth
        assert_eq!(candidates[2].max_depth, 5);
        // last candidate: all trailing axis values
        let last = &candidates[23];
        assert_eq!(last.n_estimators, 500);
        assert_eq!(last.max_features, MaxFeatures::Sqrt);
        assert_eq!(last.max_depth, 100);
        assert_eq!(last.criterion, SplitCriterion::Entropy);
    }

    #[test]
    fn equal_scores_resolve_to_the_earliest_index() {
        let mut scores = vec![0.5; 10];
        scores[3] = 0.85;
        scores[7] = 0.85;
        let (index, score) = select_best(&scores).unwrap();
        assert_eq!(index, 3);
        assert_eq!(score, 0.85);
    }

    #[test]
    fn non_finite_scores_are_skipped() {
        assert_eq!(select_best(&[f64::NAN, 0.2, 0.9]), Some((2, 0.9)));
        assert_eq!(select_best(&[f64::NAN, f64::NAN]), None);
        assert_eq!(select_best(&[]), None);
    }

    #[test]
    fn kfold_is_a_partition() {
        let folds = kfold_indices(23, 5);
        assert_eq!(folds.len(), 5);
        let mut seen = HashSet::new();
        for (train, validation) in &folds {
            assert_eq!(train.len() + validation.len(), 23);
            let train_set: HashSet<_> = train.iter().copied().collect();
            for idx in validation {
                assert!(!train_set.contains(idx));
                assert!(seen.insert(*idx), "validation index {idx} seen twice");
            }
        }
        assert_eq!(seen.len(), 23);
    }

    #[test]
    fn search_exhausted_when_no_candidate_scores() {
        // 3 rows cannot fill 5 folds: every candidate scores NaN
        let grid = ForestGrid {
            n_estimators: vec![5],
            max_features: vec![MaxFeatures::Sqrt],
            max_depth: vec![2],
            criterion: vec![SplitCriterion::Gini],
        };
        let x = Array2::<f64>::zeros((3, 2));
        let y = vec![0, 1, 0];
        let err = grid_search_forest(&grid, &x, &y, 5, 42).unwrap_err();
        assert!(matches!(err, ChurnError::SearchExhausted { candidates: 1 }));
    }

    #[test]
    fn search_picks_a_candidate_and_refits() {
        let grid = ForestGrid {
            n_estimators: vec![5, 10],
            max_features: vec![MaxFeatures::Sqrt],
            max_depth: vec![3],
            criterion: vec![SplitCriterion::Gini, SplitCriterion::Entropy],
        };
        // separable toy problem
        let mut values = Vec::new();
        let mut y = Vec::new();
        for i in 0..30 {
            let signal = if i % 2 == 0 { 1.0 } else { -1.0 };
            values.extend_from_slice(&[signal, 0.5]);
            y.push(if i % 2 == 0 { 1 } else { 0 });
        }
        let x = Array2::from_shape_vec((30, 2), values).unwrap();
        let outcome = grid_search_forest(&grid, &x, &y, 5, 42).unwrap();
        assert_eq!(outcome.cv_scores.len(), 4);
        assert!(outcome.model.is_fitted());
        assert_eq!(outcome.best_params, grid.candidates(42)[outcome.best_index]);
        assert!(outcome.best_score > 0.9);
    }
}
