//! Model persistence: serialize both fitted models through the sink and
//! reload them into fresh handles.
//!
//! There is no partial-success state: either both models round-trip or the
//! run surfaces `PersistenceFailure`. Evaluation artifacts written before
//! this stage stay on disk, which is how a caller observes partial
//! completion.
use crate::error::ChurnError;
use crate::models::forest::RandomForestClassifier;
use crate::models::logistic::LogisticRegression;
use crate::sink::ArtifactSink;

pub const FOREST_MODEL_FILE: &str = "rfc_model.json";
pub const LOGISTIC_MODEL_FILE: &str = "logistic_model.json";

fn persistence_failure(artifact: &str, reason: impl ToString) -> ChurnError {
    ChurnError::PersistenceFailure {
        artifact: artifact.to_string(),
        reason: reason.to_string(),
    }
}

/// Serialize both fitted models to their fixed blob names.
pub fn persist_models(
    sink: &mut dyn ArtifactSink,
    forest: &RandomForestClassifier,
    logistic: &LogisticRegression,
) -> Result<(), ChurnError> {
    let forest_bytes = serde_json::to_vec_pretty(forest)
        .map_err(|e| persistence_failure(FOREST_MODEL_FILE, e))?;
    sink.persist_model(FOREST_MODEL_FILE, &forest_bytes)?;

    let logistic_bytes = serde_json::to_vec_pretty(logistic)
        .map_err(|e| persistence_failure(LOGISTIC_MODEL_FILE, e))?;
    sink.persist_model(LOGISTIC_MODEL_FILE, &logistic_bytes)?;

    log::info!(
        "persisted models to '{}' and '{}'",
        FOREST_MODEL_FILE,
        LOGISTIC_MODEL_FILE
    );
    Ok(())
}

/// Reload both models from their fixed blob names into fresh handles.
pub fn reload_models(
    sink: &dyn ArtifactSink,
) -> Result<(RandomForestClassifier, LogisticRegression), ChurnError> {
    let forest_bytes = sink.load_model(FOREST_MODEL_FILE)?;
    let forest: RandomForestClassifier = serde_json::from_slice(&forest_bytes)
        .map_err(|e| persistence_failure(FOREST_MODEL_FILE, e))?;

    let logistic_bytes = sink.load_model(LOGISTIC_MODEL_FILE)?;
    let logistic: LogisticRegression = serde_json::from_slice(&logistic_bytes)
        .map_err(|e| persistence_failure(LOGISTIC_MODEL_FILE, e))?;

    Ok((forest, logistic))
}
