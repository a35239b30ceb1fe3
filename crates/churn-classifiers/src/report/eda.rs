//! Exploratory artifacts: distribution plots and a correlation heatmap.
//!
//! Descriptive side effects only; the pipeline's invariants do not depend
//! on anything here beyond "artifact exists after the call".
use std::collections::BTreeMap;

use plotly::layout::{Axis, Layout};
use plotly::{Bar, HeatMap, Histogram, Plot};

use crate::data::{Column, Dataset};
use crate::error::ChurnError;
use crate::sink::ArtifactSink;

const STAGE: &str = "exploratory plotting";

pub const CHURN_DISTRIBUTION_PAGE: &str = "eda/churn_distribution.html";
pub const AGE_DISTRIBUTION_PAGE: &str = "eda/customer_age_distribution.html";
pub const MARITAL_STATUS_PAGE: &str = "eda/marital_status_distribution.html";
pub const TRANSACTION_DISTRIBUTION_PAGE: &str = "eda/total_transaction_distribution.html";
pub const CORRELATION_HEATMAP_PAGE: &str = "eda/correlation_heatmap.html";

/// Write the five exploratory artifacts for the labeled dataset.
pub fn write_eda_artifacts(
    data: &Dataset,
    sink: &mut dyn ArtifactSink,
) -> Result<(), ChurnError> {
    let churn = data.require_numeric(Column::Churn, STAGE)?;
    sink.write_page(
        CHURN_DISTRIBUTION_PAGE,
        &histogram(churn, "Churn distribution", "Churn").to_html(),
    )?;

    let age = data.require_numeric(Column::CustomerAge, STAGE)?;
    sink.write_page(
        AGE_DISTRIBUTION_PAGE,
        &histogram(age, "Customer age distribution", "Customer_Age").to_html(),
    )?;

    let marital = data.require_categorical(Column::MaritalStatus, STAGE)?;
    sink.write_page(
        MARITAL_STATUS_PAGE,
        &category_frequencies(marital, "Marital status distribution").to_html(),
    )?;

    let transactions = data.require_numeric(Column::TotalTransCt, STAGE)?;
    sink.write_page(
        TRANSACTION_DISTRIBUTION_PAGE,
        &histogram(
            transactions,
            "Total transaction count distribution",
            "Total_Trans_Ct",
        )
        .to_html(),
    )?;

    sink.write_page(
        CORRELATION_HEATMAP_PAGE,
        &correlation_heatmap(data).to_html(),
    )?;

    log::info!("wrote exploratory artifacts");
    Ok(())
}

fn histogram(values: &[f64], title: &str, x_title: &str) -> Plot {
    let mut plot = Plot::new();
    plot.add_trace(Histogram::new(values.to_vec()).name(x_title));
    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title(x_title))
            .y_axis(Axis::new().title("Count")),
    );
    plot
}

/// Relative frequency of each category value, as a bar chart.
fn category_frequencies(values: &[String], title: &str) -> Plot {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }
    let n = values.len().max(1) as f64;
    let categories: Vec<String> = counts.keys().map(|k| k.to_string()).collect();
    let proportions: Vec<f64> = counts.values().map(|&c| c as f64 / n).collect();

    let mut plot = Plot::new();
    plot.add_trace(Bar::new(categories, proportions));
    plot.set_layout(
        Layout::new()
            .title(title)
            .y_axis(Axis::new().title("Proportion")),
    );
    plot
}

/// Pairwise Pearson correlation over every numeric column present.
fn correlation_heatmap(data: &Dataset) -> Plot {
    let columns: Vec<(Column, &[f64])> = data.numeric_columns().collect();
    let names: Vec<String> = columns.iter().map(|(c, _)| c.name().to_string()).collect();

    let mut z = Vec::with_capacity(columns.len());
    for (_, a) in &columns {
        let mut row = Vec::with_capacity(columns.len());
        for (_, b) in &columns {
            row.push(pearson(a, b));
        }
        z.push(row);
    }

    let mut plot = Plot::new();
    plot.add_trace(HeatMap::new(names.clone(), names, z));
    plot.set_layout(Layout::new().title("Correlation heatmap"));
    plot
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn eda_dataset() -> Dataset {
        let mut data = Dataset::new(4);
        data.insert_numeric(Column::Churn, vec![0.0, 1.0, 0.0, 1.0]);
        data.insert_numeric(Column::CustomerAge, vec![25.0, 40.0, 55.0, 62.0]);
        data.insert_numeric(Column::TotalTransCt, vec![10.0, 50.0, 30.0, 70.0]);
        data.insert_categorical(
            Column::MaritalStatus,
            vec!["Married".into(), "Single".into(), "Married".into(), "Unknown".into()],
        );
        data
    }

    #[test]
    fn eda_writes_all_five_artifacts() {
        let data = eda_dataset();
        let mut sink = MemorySink::new();
        write_eda_artifacts(&data, &mut sink).unwrap();
        for name in [
            CHURN_DISTRIBUTION_PAGE,
            AGE_DISTRIBUTION_PAGE,
            MARITAL_STATUS_PAGE,
            TRANSACTION_DISTRIBUTION_PAGE,
            CORRELATION_HEATMAP_PAGE,
        ] {
            assert!(sink.pages.contains_key(name), "missing artifact {name}");
        }
    }

    #[test]
    fn eda_requires_the_label_column() {
        let mut data = eda_dataset();
        data.remove_column(Column::Churn);
        let mut sink = MemorySink::new();
        let err = write_eda_artifacts(&data, &mut sink).unwrap_err();
        assert!(matches!(err, ChurnError::MissingColumn { column: "Churn", .. }));
    }

    #[test]
    fn pearson_of_a_column_with_itself_is_one() {
        let v = [1.0, 2.0, 4.0, 8.0];
        assert!((pearson(&v, &v) - 1.0).abs() < 1e-12);
        let negated: Vec<f64> = v.iter().map(|x| -x).collect();
        assert!((pearson(&v, &negated) + 1.0).abs() < 1e-12);
    }
}
