//! Plotly figures for the evaluation artifacts.
use plotly::common::{DashType, Line, Mode};
use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot, Scatter};

use crate::explain::RankedFeatures;
use crate::metrics::RocCurve;

/// ROC curves for one or more models, with the chance diagonal as a dashed
/// reference line.
pub fn plot_roc_curves(curves: &[(&str, &RocCurve)], title: &str) -> Plot {
    let mut plot = Plot::new();

    for (name, curve) in curves {
        let label = format!("{} (AUC {:.3})", name, curve.auc);
        plot.add_trace(
            Scatter::new(curve.fpr.clone(), curve.tpr.clone())
                .mode(Mode::Lines)
                .name(&label),
        );
    }

    let reference_line = Scatter::new(vec![0.0, 1.0], vec![0.0, 1.0])
        .mode(Mode::Lines)
        .name("Chance")
        .line(Line::new().color("red").dash(DashType::Dash));
    plot.add_trace(reference_line);

    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("False positive rate"))
            .y_axis(Axis::new().title("True positive rate")),
    );
    plot
}

/// Bar chart of ranked feature scores, feature names on the x-axis in
/// ranked order.
pub fn plot_ranked_bars(ranked: &RankedFeatures, title: &str, y_title: &str) -> Plot {
    let names: Vec<String> = ranked.names.iter().map(|n| n.to_string()).collect();
    let mut plot = Plot::new();
    plot.add_trace(Bar::new(names, ranked.scores.clone()));
    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("Feature"))
            .y_axis(Axis::new().title(y_title)),
    );
    plot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::roc_curve;

    #[test]
    fn roc_figure_renders_every_model_plus_reference() {
        let curve = roc_curve(&[0, 1, 0, 1], &[0.2, 0.9, 0.4, 0.8]);
        let plot = plot_roc_curves(
            &[("Logistic Regression", &curve), ("Random Forest", &curve)],
            "ROC",
        );
        let html = plot.to_html();
        assert!(html.contains("Logistic Regression"));
        assert!(html.contains("Random Forest"));
        assert!(html.contains("Chance"));
    }

    #[test]
    fn bar_figure_keeps_ranked_order() {
        let ranked = RankedFeatures {
            names: vec!["Total_Trans_Ct", "Customer_Age"],
            scores: vec![0.6, 0.4],
        };
        let html = plot_ranked_bars(&ranked, "Feature importance", "Importance").to_html();
        assert!(html.contains("Total_Trans_Ct"));
        assert!(html.contains("Customer_Age"));
    }
}
