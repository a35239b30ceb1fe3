//! Random forest classifier.
//!
//! Bagged CART trees with configurable depth, split criterion and
//! per-split feature subsampling. Trees are trained in parallel with
//! rayon; every tree derives its own rng from the forest seed, so the
//! fitted model is identical regardless of scheduling. Nodes live in a
//! flat arena indexed by `usize`, which keeps serialized trees shallow no
//! matter how deep they grow. The fitted forest exposes impurity-decrease
//! feature importances and per-row path contributions for the attribution
//! summary.
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::classifier_trait::ClassifierModel;

/// Impurity measure used to score candidate splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitCriterion {
    Gini,
    Entropy,
}

impl SplitCriterion {
    /// Impurity of a node with the given positive-class fraction.
    pub fn impurity(self, pos_fraction: f64) -> f64 {
        let p = pos_fraction;
        let q = 1.0 - p;
        match self {
            SplitCriterion::Gini => 1.0 - p * p - q * q,
            SplitCriterion::Entropy => {
                let term = |v: f64| if v > 0.0 { -v * v.log2() } else { 0.0 };
                term(p) + term(q)
            }
        }
    }
}

/// Number of features considered at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    Auto,
    Sqrt,
}

impl MaxFeatures {
    /// Resolve to a concrete feature count. For classification the `Auto`
    /// heuristic is the same square-root rule as `Sqrt`.
    pub fn resolve(self, n_features: usize) -> usize {
        match self {
            MaxFeatures::Auto | MaxFeatures::Sqrt => {
                ((n_features as f64).sqrt().floor() as usize).clamp(1, n_features)
            }
        }
    }
}

/// Hyperparameters for one forest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_features: MaxFeatures,
    pub max_depth: usize,
    pub criterion: SplitCriterion,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        ForestParams {
            n_estimators: 100,
            max_features: MaxFeatures::Auto,
            max_depth: 5,
            criterion: SplitCriterion::Gini,
            seed: 42,
        }
    }
}

/// One node of a fitted tree; children are arena indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        value: f64,
        left: usize,
        right: usize,
    },
}

impl Node {
    /// Mean label of the training rows that reached this node.
    fn value(&self) -> f64 {
        match self {
            Node::Leaf { value } => *value,
            Node::Split { value, .. } => *value,
        }
    }
}

/// A fitted tree: its node arena, rooted at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn leaf_value(&self, row: ArrayView1<f64>) -> f64 {
        let mut index = 0usize;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => break *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Walk the row's path, attributing each split's change in node mean
    /// to the split feature.
    fn path_contributions(&self, row: ArrayView1<f64>, out: &mut [f64]) {
        let mut index = 0usize;
        while let Node::Split {
            feature,
            threshold,
            value,
            left,
            right,
        } = &self.nodes[index]
        {
            let child = if row[*feature] <= *threshold { *left } else { *right };
            out[*feature] += self.nodes[child].value() - *value;
            index = child;
        }
    }

    fn root_value(&self) -> f64 {
        self.nodes[0].value()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ForestFit {
    n_features: usize,
    trees: Vec<Tree>,
    importances: Vec<f64>,
}

/// Bagged tree ensemble for binary classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    params: ForestParams,
    fitted: Option<ForestFit>,
}

impl RandomForestClassifier {
    pub fn new(params: ForestParams) -> Self {
        RandomForestClassifier {
            params,
            fitted: None,
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Normalized mean impurity-decrease per feature, in matrix order.
    pub fn feature_importances(&self) -> &[f64] {
        &self.fitted.as_ref().expect("model not fitted").importances
    }

    /// Mean root value across trees: the forest's output on an average row.
    pub fn expected_value(&self) -> f64 {
        let fit = self.fitted.as_ref().expect("model not fitted");
        fit.trees.iter().map(Tree::root_value).sum::<f64>() / fit.trees.len() as f64
    }

    /// Per-row, per-feature decision contributions, averaged over trees.
    ///
    /// For every row, `expected_value() + contributions.row(i).sum()`
    /// equals the predicted probability.
    pub fn decision_contributions(&self, x: &Array2<f64>) -> Array2<f64> {
        let fit = self.fitted.as_ref().expect("model not fitted");
        let n_trees = fit.trees.len() as f64;
        let mut out = Array2::<f64>::zeros((x.nrows(), fit.n_features));
        for (i, row) in x.rows().into_iter().enumerate() {
            let mut contrib = vec![0.0f64; fit.n_features];
            for tree in &fit.trees {
                tree.path_contributions(row, &mut contrib);
            }
            for (j, c) in contrib.iter().enumerate() {
                out[[i, j]] = c / n_trees;
            }
        }
        out
    }
}

impl ClassifierModel for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[i32]) {
        assert_eq!(x.nrows(), y.len(), "feature matrix and labels must be row-aligned");
        let n = x.nrows();
        let n_features = x.ncols();
        let m = self.params.max_features.resolve(n_features);
        let params = &self.params;

        let grown: Vec<(Tree, Vec<f64>)> = (0..params.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng =
                    StdRng::seed_from_u64(params.seed.wrapping_add(tree_idx as u64));
                let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let mut builder = TreeBuilder {
                    x,
                    y,
                    max_depth: params.max_depth,
                    criterion: params.criterion,
                    max_features: m,
                    n_total: n as f64,
                    rng,
                    nodes: Vec::new(),
                    importances: vec![0.0f64; n_features],
                };
                builder.grow(rows, 0);
                (Tree { nodes: builder.nodes }, builder.importances)
            })
            .collect();

        let mut importances = vec![0.0f64; n_features];
        let mut trees = Vec::with_capacity(grown.len());
        for (tree, tree_importances) in grown {
            for (total, part) in importances.iter_mut().zip(tree_importances.iter()) {
                *total += part;
            }
            trees.push(tree);
        }
        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for v in importances.iter_mut() {
                *v /= sum;
            }
        }

        log::debug!(
            "fitted random forest: {} trees, depth {}, {:?}/{:?}",
            trees.len(),
            params.max_depth,
            params.criterion,
            params.max_features
        );

        self.fitted = Some(ForestFit {
            n_features,
            trees,
            importances,
        });
    }

    fn predict(&self, x: &Array2<f64>) -> Vec<i32> {
        self.predict_proba(x)
            .into_iter()
            .map(|p| if p >= 0.5 { 1 } else { 0 })
            .collect()
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Vec<f64> {
        let fit = self.fitted.as_ref().expect("model not fitted");
        let n_trees = fit.trees.len() as f64;
        x.rows()
            .into_iter()
            .map(|row| {
                fit.trees.iter().map(|tree| tree.leaf_value(row)).sum::<f64>() / n_trees
            })
            .collect()
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}

/// Scratch state for growing one tree. `grow` returns the arena index of
/// the node it created, so recursion depth matches tree depth while the
/// stored tree stays flat.
struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    y: &'a [i32],
    max_depth: usize,
    criterion: SplitCriterion,
    max_features: usize,
    n_total: f64,
    rng: StdRng,
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

impl TreeBuilder<'_> {
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let n = rows.len();
        let n_pos = rows.iter().filter(|&&r| self.y[r] == 1).count();
        let value = n_pos as f64 / n as f64;

        if depth >= self.max_depth || n_pos == 0 || n_pos == n || n < 2 {
            return self.push(Node::Leaf { value });
        }

        let Some((feature, threshold, decrease)) = self.best_split(&rows, n_pos, value) else {
            // no candidate threshold improves on the parent impurity
            return self.push(Node::Leaf { value });
        };

        self.importances[feature] += (n as f64 / self.n_total) * decrease;

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| self.x[[r, feature]] <= threshold);

        // reserve the slot before growing children so the root stays at 0
        let index = self.push(Node::Leaf { value });
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[index] = Node::Split {
            feature,
            threshold,
            value,
            left,
            right,
        };
        index
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn best_split(
        &mut self,
        rows: &[usize],
        n_pos: usize,
        value: f64,
    ) -> Option<(usize, f64, f64)> {
        let n = rows.len();
        let parent_impurity = self.criterion.impurity(value);
        // Shuffled feature order; constant features do not count against
        // the max_features budget, so a node only becomes a leaf when
        // every feature is constant on its rows.
        let feature_order =
            rand::seq::index::sample(&mut self.rng, self.x.ncols(), self.x.ncols());

        let mut best: Option<(usize, f64, f64)> = None;
        let mut examined = 0usize;
        for feature in feature_order {
            if examined >= self.max_features {
                break;
            }
            let mut pairs: Vec<(f64, i32)> = rows
                .iter()
                .map(|&r| (self.x[[r, feature]], self.y[r]))
                .collect();
            pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut left_pos = 0usize;
            let mut had_threshold = false;
            for i in 1..n {
                if pairs[i - 1].1 == 1 {
                    left_pos += 1;
                }
                // a threshold only exists between two distinct values
                if pairs[i].0 <= pairs[i - 1].0 {
                    continue;
                }
                had_threshold = true;
                let n_left = i;
                let n_right = n - i;
                let right_pos = n_pos - left_pos;
                let weighted = (n_left as f64
                    * self.criterion.impurity(left_pos as f64 / n_left as f64)
                    + n_right as f64
                        * self.criterion.impurity(right_pos as f64 / n_right as f64))
                    / n as f64;
                let decrease = parent_impurity - weighted;
                let replaces = match best {
                    None => decrease > 0.0,
                    Some((_, _, best_decrease)) => decrease > best_decrease,
                };
                if replaces {
                    best = Some((feature, (pairs[i - 1].0 + pairs[i].0) / 2.0, decrease));
                }
            }
            if had_threshold {
                examined += 1;
            }
        }
        best
    }
}
