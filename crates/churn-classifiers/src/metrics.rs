//! Classification metrics: accuracy, per-class reports and ROC curves.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fraction of predictions matching the true labels.
pub fn accuracy(y_true: &[i32], y_pred: &[i32]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len(), "label vectors must be aligned");
    if y_true.is_empty() {
        return f64::NAN;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Precision/recall/F1/support for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: i32,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics with the usual aggregate rows.
///
/// `Display` renders the familiar monospace table so the report pages can
/// embed it verbatim in a `<pre>` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: (f64, f64, f64),
    pub weighted_avg: (f64, f64, f64),
    pub total_support: usize,
}

/// Compute a two-class classification report over 0/1 labels.
pub fn classification_report(y_true: &[i32], y_pred: &[i32]) -> ClassificationReport {
    assert_eq!(y_true.len(), y_pred.len(), "label vectors must be aligned");
    let total = y_true.len();

    let mut classes = Vec::with_capacity(2);
    for label in [0, 1] {
        let tp = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(&t, &p)| t == label && p == label)
            .count();
        let predicted = y_pred.iter().filter(|&&p| p == label).count();
        let actual = y_true.iter().filter(|&&t| t == label).count();

        let precision = if predicted > 0 {
            tp as f64 / predicted as f64
        } else {
            0.0
        };
        let recall = if actual > 0 { tp as f64 / actual as f64 } else { 0.0 };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        classes.push(ClassMetrics {
            label,
            precision,
            recall,
            f1,
            support: actual,
        });
    }

    let k = classes.len() as f64;
    let macro_avg = (
        classes.iter().map(|c| c.precision).sum::<f64>() / k,
        classes.iter().map(|c| c.recall).sum::<f64>() / k,
        classes.iter().map(|c| c.f1).sum::<f64>() / k,
    );
    let weighted = |f: fn(&ClassMetrics) -> f64| {
        classes
            .iter()
            .map(|c| f(c) * c.support as f64)
            .sum::<f64>()
            / total.max(1) as f64
    };
    let weighted_avg = (
        weighted(|c| c.precision),
        weighted(|c| c.recall),
        weighted(|c| c.f1),
    );

    ClassificationReport {
        accuracy: accuracy(y_true, y_pred),
        classes,
        macro_avg,
        weighted_avg,
        total_support: total,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.total_support
        )?;
        writeln!(
            f,
            "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "macro avg", self.macro_avg.0, self.macro_avg.1, self.macro_avg.2, self.total_support
        )?;
        writeln!(
            f,
            "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "weighted avg",
            self.weighted_avg.0,
            self.weighted_avg.1,
            self.weighted_avg.2,
            self.total_support
        )
    }
}

/// A receiver-operating-characteristic curve with its trapezoid AUC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
    pub auc: f64,
}

/// Sweep the observed score thresholds from high to low, collecting
/// (false-positive rate, true-positive rate) points.
pub fn roc_curve(y_true: &[i32], scores: &[f64]) -> RocCurve {
    assert_eq!(y_true.len(), scores.len(), "labels and scores must be aligned");
    let n_pos = y_true.iter().filter(|&&t| t == 1).count();
    let n_neg = y_true.len() - n_pos;

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut thresholds = vec![f64::INFINITY];

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut i = 0usize;
    while i < order.len() {
        let threshold = scores[order[i]];
        // consume every row tied at this threshold before emitting a point
        while i < order.len() && scores[order[i]] == threshold {
            if y_true[order[i]] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        fpr.push(if n_neg > 0 { fp as f64 / n_neg as f64 } else { 0.0 });
        tpr.push(if n_pos > 0 { tp as f64 / n_pos as f64 } else { 0.0 });
        thresholds.push(threshold);
    }

    let mut auc = 0.0;
    for w in 1..fpr.len() {
        auc += (fpr[w] - fpr[w - 1]) * (tpr[w] + tpr[w - 1]) / 2.0;
    }

    RocCurve {
        fpr,
        tpr,
        thresholds,
        auc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_counts_matches() {
        assert_eq!(accuracy(&[0, 1, 1, 0], &[0, 1, 0, 0]), 0.75);
        assert_eq!(accuracy(&[1], &[1]), 1.0);
    }

    #[test]
    fn report_matches_hand_computed_values() {
        // confusion: class 1 -> tp=2, fn=1; class 0 -> tn=3, fp=1
        let y_true = vec![1, 1, 1, 0, 0, 0, 0];
        let y_pred = vec![1, 1, 0, 0, 0, 0, 1];
        let report = classification_report(&y_true, &y_pred);

        let positive = &report.classes[1];
        assert_eq!(positive.support, 3);
        assert!((positive.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((positive.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((positive.f1 - 2.0 / 3.0).abs() < 1e-12);

        let negative = &report.classes[0];
        assert_eq!(negative.support, 4);
        assert!((negative.precision - 0.75).abs() < 1e-12);
        assert!((negative.recall - 0.75).abs() < 1e-12);

        assert!((report.accuracy - 5.0 / 7.0).abs() < 1e-12);
        assert_eq!(report.total_support, 7);
    }

    #[test]
    fn degenerate_predictions_do_not_divide_by_zero() {
        let report = classification_report(&[0, 0, 1], &[0, 0, 0]);
        let positive = &report.classes[1];
        assert_eq!(positive.precision, 0.0);
        assert_eq!(positive.recall, 0.0);
        assert_eq!(positive.f1, 0.0);
    }

    #[test]
    fn report_renders_a_monospace_table() {
        let text = classification_report(&[0, 1], &[0, 1]).to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("macro avg"));
        assert!(text.contains("weighted avg"));
    }

    #[test]
    fn perfect_classifier_has_auc_one() {
        let y_true = vec![0, 0, 1, 1];
        let scores = vec![0.1, 0.2, 0.8, 0.9];
        let roc = roc_curve(&y_true, &scores);
        assert!((roc.auc - 1.0).abs() < 1e-12);
        assert_eq!(*roc.fpr.first().unwrap(), 0.0);
        assert_eq!(*roc.tpr.first().unwrap(), 0.0);
        assert_eq!(*roc.fpr.last().unwrap(), 1.0);
        assert_eq!(*roc.tpr.last().unwrap(), 1.0);
    }

    #[test]
    fn random_scores_give_half_auc_on_symmetric_ties() {
        // all scores tied: single step from (0,0) to (1,1)
        let roc = roc_curve(&[0, 1, 0, 1], &[0.5, 0.5, 0.5, 0.5]);
        assert!((roc.auc - 0.5).abs() < 1e-12);
        assert_eq!(roc.fpr.len(), 2);
    }

    #[test]
    fn curve_is_monotone() {
        let y_true = vec![0, 1, 1, 0, 1, 0, 0, 1];
        let scores = vec![0.3, 0.9, 0.4, 0.6, 0.8, 0.2, 0.55, 0.7];
        let roc = roc_curve(&y_true, &scores);
        for w in 1..roc.fpr.len() {
            assert!(roc.fpr[w] >= roc.fpr[w - 1]);
            assert!(roc.tpr[w] >= roc.tpr[w - 1]);
        }
    }
}
