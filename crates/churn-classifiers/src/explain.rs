//! Model explainability: importance ranking and global attribution.
use ndarray::Array2;
use serde::Serialize;

use crate::models::forest::RandomForestClassifier;

/// Feature names paired with scores, sorted for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFeatures {
    pub names: Vec<&'static str>,
    pub scores: Vec<f64>,
}

/// Sort features by score, descending; equal scores keep their original
/// allow-list order so re-running on the same model yields an identical
/// ranking.
pub fn rank_features(names: &[&'static str], scores: &[f64]) -> RankedFeatures {
    assert_eq!(names.len(), scores.len(), "names and scores must be aligned");
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    RankedFeatures {
        names: order.iter().map(|&i| names[i]).collect(),
        scores: order.iter().map(|&i| scores[i]).collect(),
    }
}

/// Global attribution summary for the forest over a set of rows.
///
/// Per-row decision contributions are averaged as absolute values across
/// rows, giving a single non-negative magnitude per feature; the result is
/// sorted descending with the same tie rule as the importance ranking.
pub fn attribution_summary(
    model: &RandomForestClassifier,
    x: &Array2<f64>,
    names: &[&'static str],
) -> RankedFeatures {
    let contributions = attribution_magnitudes(model, x);
    rank_features(names, &contributions)
}

/// Mean absolute per-feature contribution across rows, in matrix order.
pub fn attribution_magnitudes(model: &RandomForestClassifier, x: &Array2<f64>) -> Vec<f64> {
    let contributions = model.decision_contributions(x);
    let n_rows = contributions.nrows().max(1) as f64;
    (0..contributions.ncols())
        .map(|j| contributions.column(j).iter().map(|v| v.abs()).sum::<f64>() / n_rows)
        .collect()
}
