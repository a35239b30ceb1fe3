use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Fatal error kinds surfaced by the training pipeline.
///
/// Every variant carries enough context (stage, column or artifact name) to
/// diagnose a failed run without re-running it. Non-convergence of the
/// logistic solver is deliberately not represented here; it is recorded on
/// the fitted model instead.
#[derive(Debug)]
pub enum ChurnError {
    /// The data source is absent or contains no rows.
    DataNotFound { path: PathBuf },
    /// A required column is missing from the dataset at the named stage.
    MissingColumn {
        column: &'static str,
        stage: &'static str,
    },
    /// The hyperparameter grid search produced no valid configuration.
    SearchExhausted { candidates: usize },
    /// A model or artifact failed to serialize, write, read or deserialize.
    PersistenceFailure { artifact: String, reason: String },
}

impl fmt::Display for ChurnError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChurnError::DataNotFound { path } => {
                write!(f, "no data found at '{}'", path.display())
            }
            ChurnError::MissingColumn { column, stage } => {
                write!(f, "missing required column '{}' during {}", column, stage)
            }
            ChurnError::SearchExhausted { candidates } => write!(
                f,
                "grid search over {} candidates produced no valid configuration",
                candidates
            ),
            ChurnError::PersistenceFailure { artifact, reason } => {
                write!(f, "failed to persist or reload '{}': {}", artifact, reason)
            }
        }
    }
}

impl Error for ChurnError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_column_and_stage() {
        let err = ChurnError::MissingColumn {
            column: "Income_Category",
            stage: "feature selection",
        };
        let text = err.to_string();
        assert!(text.contains("Income_Category"));
        assert!(text.contains("feature selection"));
    }

    #[test]
    fn display_carries_path() {
        let err = ChurnError::DataNotFound {
            path: PathBuf::from("./data/bank_data.csv"),
        };
        assert!(err.to_string().contains("bank_data.csv"));
    }
}
