use serde::{Deserialize, Serialize};

use crate::models::classifier_trait::ClassifierModel;
use crate::models::forest::{ForestParams, RandomForestClassifier};
use crate::models::logistic::{LogisticParams, LogisticRegression};

/// Configuration for one of the two supported model families.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelSpec {
    Forest(ForestParams),
    Logistic(LogisticParams),
}

/// Build a boxed classifier model from a `ModelSpec`.
/// Currently this is a thin factory implemented as a single function.
pub fn build_model(spec: ModelSpec) -> Box<dyn ClassifierModel> {
    match spec {
        ModelSpec::Forest(params) => Box::new(RandomForestClassifier::new(params)),
        ModelSpec::Logistic(params) => Box::new(LogisticRegression::new(params)),
    }
}
