//! The end-to-end training pipeline.
//!
//! Batch, synchronous orchestration: exploratory plots, target encoding,
//! feature selection and splitting, the two model fits, evaluation
//! artifacts, the run record, and the persistence round-trip that
//! regenerates the ROC artifact from the reloaded models.
//!
//! The logistic branch runs before the grid search so its artifacts exist
//! even when the search fails with `SearchExhausted`; the two models are
//! trained independently.
use serde::Serialize;

use crate::data::{Dataset, CATEGORICAL_COLUMNS};
use crate::encoding::encode_churn_rates;
use crate::error::ChurnError;
use crate::explain::{attribution_summary, rank_features};
use crate::features::{feature_names, select_and_split, SplitData};
use crate::metrics::{accuracy, classification_report, roc_curve};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::forest::ForestParams;
use crate::models::logistic::{LogisticParams, LogisticRegression};
use crate::persist::{persist_models, reload_models};
use crate::report::{eda, pages, plots};
use crate::search::{grid_search_forest, ForestGrid};
use crate::sink::ArtifactSink;

pub const RF_RESULTS_PAGE: &str = "results/rf_results.html";
pub const LOGISTIC_RESULTS_PAGE: &str = "results/logistic_results.html";
pub const ROC_CURVE_PAGE: &str = "results/roc_curve_result.html";
pub const FEATURE_IMPORTANCE_PAGE: &str = "results/feature_importance.html";
pub const ATTRIBUTION_SUMMARY_PAGE: &str = "results/attribution_summary.html";
pub const RUN_RECORD_FILE: &str = "run_config.json";

/// Everything the pipeline needs beyond the dataset and the sink.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub test_fraction: f64,
    pub split_seed: u64,
    pub cv_folds: usize,
    pub forest_seed: u64,
    pub grid: ForestGrid,
    pub logistic: LogisticParams,
    /// Whether to write the exploratory artifacts before training.
    pub eda: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            test_fraction: 0.3,
            split_seed: 42,
            cv_folds: 5,
            forest_seed: 42,
            grid: ForestGrid::default(),
            logistic: LogisticParams::default(),
            eda: true,
        }
    }
}

/// Headline numbers from a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub n_rows: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub best_forest_params: ForestParams,
    pub best_forest_index: usize,
    pub best_cv_score: f64,
    pub forest_test_accuracy: f64,
    pub logistic_test_accuracy: f64,
    pub logistic_converged: bool,
}

#[derive(Serialize)]
struct RunRecord<'a> {
    generated: String,
    config: &'a PipelineConfig,
    summary: &'a RunSummary,
}

/// Run the full pipeline against a labeled dataset.
///
/// The dataset is mutated once, by the encoder; every artifact goes
/// through the sink at a fixed name and re-running overwrites it.
pub fn run(
    data: &mut Dataset,
    config: &PipelineConfig,
    sink: &mut dyn ArtifactSink,
) -> Result<RunSummary, ChurnError> {
    if config.eda {
        eda::write_eda_artifacts(data, sink)?;
    }

    log::info!("encoding categorical churn rates");
    encode_churn_rates(data, &CATEGORICAL_COLUMNS)?;

    let split = select_and_split(data, config.test_fraction, config.split_seed)?;

    // Linear branch first: it trains independently of the grid search and
    // its artifacts must survive a SearchExhausted failure.
    log::info!("training logistic regression");
    let mut logistic = LogisticRegression::new(config.logistic.clone());
    logistic.fit(&split.x_train, &split.y_train);
    write_model_report(&logistic, "Logistic Regression", LOGISTIC_RESULTS_PAGE, &split, sink)?;

    let logistic_roc = roc_curve(&split.y_test, &logistic.predict_proba(&split.x_test));
    sink.write_page(
        ROC_CURVE_PAGE,
        &plots::plot_roc_curves(
            &[("Logistic Regression", &logistic_roc)],
            "ROC curve (test split)",
        )
        .to_html(),
    )?;

    log::info!("training random forest (grid search)");
    let outcome = grid_search_forest(
        &config.grid,
        &split.x_train,
        &split.y_train,
        config.cv_folds,
        config.forest_seed,
    )?;
    let forest = outcome.model;
    write_model_report(&forest, "Random Forest", RF_RESULTS_PAGE, &split, sink)?;

    let names = feature_names();
    let importance = rank_features(&names, forest.feature_importances());
    sink.write_page(
        FEATURE_IMPORTANCE_PAGE,
        &plots::plot_ranked_bars(&importance, "Feature importance", "Importance").to_html(),
    )?;

    let attribution = attribution_summary(&forest, &split.x_test, &names);
    sink.write_page(
        ATTRIBUTION_SUMMARY_PAGE,
        &plots::plot_ranked_bars(
            &attribution,
            "Mean |contribution| across test rows",
            "Mean |contribution|",
        )
        .to_html(),
    )?;

    let summary = RunSummary {
        n_rows: split.n_rows(),
        n_train: split.train_indices.len(),
        n_test: split.test_indices.len(),
        best_forest_params: outcome.best_params,
        best_forest_index: outcome.best_index,
        best_cv_score: outcome.best_score,
        forest_test_accuracy: accuracy(&split.y_test, &forest.predict(&split.x_test)),
        logistic_test_accuracy: accuracy(&split.y_test, &logistic.predict(&split.x_test)),
        logistic_converged: logistic.converged(),
    };

    let record = RunRecord {
        generated: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        config,
        summary: &summary,
    };
    let json = serde_json::to_string_pretty(&record).map_err(|e| {
        ChurnError::PersistenceFailure {
            artifact: RUN_RECORD_FILE.to_string(),
            reason: e.to_string(),
        }
    })?;
    sink.write_record(RUN_RECORD_FILE, &json)?;

    // Persistence self-check: reload both models and rebuild the ROC
    // artifact from the reloaded handles.
    persist_models(sink, &forest, &logistic)?;
    let (reloaded_forest, reloaded_logistic) = reload_models(sink)?;

    let reloaded_logistic_roc =
        roc_curve(&split.y_test, &reloaded_logistic.predict_proba(&split.x_test));
    let reloaded_forest_roc =
        roc_curve(&split.y_test, &reloaded_forest.predict_proba(&split.x_test));
    sink.write_page(
        ROC_CURVE_PAGE,
        &plots::plot_roc_curves(
            &[
                ("Logistic Regression", &reloaded_logistic_roc),
                ("Random Forest", &reloaded_forest_roc),
            ],
            "ROC curve (test split, reloaded models)",
        )
        .to_html(),
    )?;

    log::info!(
        "run complete: forest test accuracy {:.4}, logistic test accuracy {:.4}",
        summary.forest_test_accuracy,
        summary.logistic_test_accuracy
    );
    Ok(summary)
}

fn write_model_report(
    model: &dyn ClassifierModel,
    display_name: &str,
    page: &str,
    split: &SplitData,
    sink: &mut dyn ArtifactSink,
) -> Result<(), ChurnError> {
    let train_report = classification_report(&split.y_train, &model.predict(&split.x_train));
    let test_report = classification_report(&split.y_test, &model.predict(&split.x_test));
    log::debug!(
        "{} train accuracy {:.4}, test accuracy {:.4}",
        display_name,
        train_report.accuracy,
        test_report.accuracy
    );
    sink.write_page(
        page,
        &pages::classification_report_page(display_name, &train_report, &test_report),
    )
}
