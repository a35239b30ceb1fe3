use ndarray::Array2;

use churn_classifiers::models::factory::{build_model, ModelSpec};
use churn_classifiers::models::forest::ForestParams;
use churn_classifiers::models::logistic::LogisticParams;

#[test]
fn factory_builds_and_predicts() {
    // tiny dataset
    let x = Array2::from_shape_vec(
        (6, 2),
        vec![
            1.0, 0.0, // class 1
            0.0, 1.0, // class 0
            1.0, 0.1, // class 1
            0.0, 0.9, // class 0
            1.1, 0.0, // class 1
            0.0, 1.2, // class 0
        ],
    )
    .expect("failed to create feature matrix");
    let y = vec![1, 0, 1, 0, 1, 0];

    let specs = [
        ModelSpec::Forest(ForestParams {
            n_estimators: 5,
            max_depth: 3,
            ..ForestParams::default()
        }),
        ModelSpec::Logistic(LogisticParams::default()),
    ];

    for spec in specs {
        let mut model = build_model(spec);
        model.fit(&x, &y);
        let probs = model.predict_proba(&x);
        assert_eq!(probs.len(), x.nrows());
        let labels = model.predict(&x);
        assert!(labels.iter().all(|&l| l == 0 || l == 1));
    }
}

#[test]
fn factory_models_report_their_names() {
    let forest = build_model(ModelSpec::Forest(ForestParams::default()));
    let logistic = build_model(ModelSpec::Logistic(LogisticParams::default()));
    assert_eq!(forest.name(), "random_forest");
    assert_eq!(logistic.name(), "logistic_regression");
}
