pub mod classifier_trait;
pub mod factory;
pub mod forest;
pub mod logistic;

pub use classifier_trait::ClassifierModel;
pub use forest::{ForestParams, MaxFeatures, RandomForestClassifier, SplitCriterion};
pub use logistic::{LogisticParams, LogisticRegression};
