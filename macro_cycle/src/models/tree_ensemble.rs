//! Bagged regression trees

use crate::error::{MacroError, Result};
use crate::features::FeatureRow;
use crate::models::{check_training_set, ForecastModel, TrainedForecastModel};
use cycle_math::EPSILON;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

pub(crate) const NAME: &str = "tree_ensemble";

/// Regression tree ensemble fitted on bootstrap samples
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: usize,
    max_depth: usize,
    min_samples_leaf: usize,
    seed: u64,
}

/// Trained tree ensemble; predicts the mean of its members
#[derive(Debug, Clone)]
pub struct TrainedTreeEnsemble {
    trees: Vec<Node>,
    features: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, x: &[f64]) -> f64 {
        match self {
            Node::Leaf(value) => *value,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if x[*feature] <= *threshold {
                    left.predict(x)
                } else {
                    right.predict(x)
                }
            }
        }
    }
}

struct SplitChoice {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl TreeEnsemble {
    /// Create a new ensemble; member `i` is grown from seed `seed + i`
    pub fn new(trees: usize, max_depth: usize, min_samples_leaf: usize, seed: u64) -> Result<Self> {
        if trees == 0 {
            return Err(MacroError::InvalidParameter(
                "Tree ensemble needs at least one tree".to_string(),
            ));
        }
        if max_depth == 0 || min_samples_leaf == 0 {
            return Err(MacroError::InvalidParameter(
                "max_depth and min_samples_leaf must be positive".to_string(),
            ));
        }
        Ok(Self {
            trees,
            max_depth,
            min_samples_leaf,
            seed,
        })
    }

    fn grow(&self, x: &[&[f64]], y: &[f64], indices: Vec<usize>, depth: usize) -> Node {
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;
        if depth >= self.max_depth || indices.len() < 2 * self.min_samples_leaf {
            return Node::Leaf(mean);
        }

        match self.best_split(x, y, &indices) {
            Some(split) => Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left: Box::new(self.grow(x, y, split.left, depth + 1)),
                right: Box::new(self.grow(x, y, split.right, depth + 1)),
            },
            None => Node::Leaf(mean),
        }
    }

    /// Lowest squared-error split with both sides at least `min_samples_leaf`
    fn best_split(&self, x: &[&[f64]], y: &[f64], indices: &[usize]) -> Option<SplitChoice> {
        let n = indices.len();
        let total: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let parent_sse = total_sq - total * total / n as f64;

        let mut best: Option<(f64, usize, f64)> = None;
        for feature in 0..x[0].len() {
            let mut order = indices.to_vec();
            order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 0..n - 1 {
                let yi = y[order[k]];
                left_sum += yi;
                left_sq += yi * yi;

                let left_n = k + 1;
                let right_n = n - left_n;
                if left_n < self.min_samples_leaf || right_n < self.min_samples_leaf {
                    continue;
                }
                let here = x[order[k]][feature];
                let next = x[order[k + 1]][feature];
                if next - here <= EPSILON {
                    continue;
                }

                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / left_n as f64)
                    + (right_sq - right_sum * right_sum / right_n as f64);
                if best.map_or(true, |(b, _, _)| sse < b) {
                    best = Some((sse, feature, (here + next) / 2.0));
                }
            }
        }

        let (sse, feature, threshold) = best?;
        if parent_sse - sse <= EPSILON {
            return None;
        }
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[i][feature] <= threshold);
        Some(SplitChoice {
            feature,
            threshold,
            left,
            right,
        })
    }
}

impl ForecastModel for TreeEnsemble {
    type Trained = TrainedTreeEnsemble;

    fn train(&self, rows: &[FeatureRow], targets: &[f64]) -> Result<Self::Trained> {
        check_training_set(NAME, rows, targets)?;
        let x: Vec<&[f64]> = rows.iter().map(|r| r.values()).collect();
        let features = x[0].len();
        if features == 0 {
            return Err(MacroError::ModelFit(format!("{}: rows have no features", NAME)));
        }
        let n = x.len();

        let trees: Vec<Node> = (0..self.trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(i as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                self.grow(&x, targets, sample, 0)
            })
            .collect();

        Ok(TrainedTreeEnsemble { trees, features })
    }

    fn name(&self) -> &str {
        NAME
    }
}

impl TrainedTreeEnsemble {
    /// Number of fitted members
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

impl TrainedForecastModel for TrainedTreeEnsemble {
    fn predict(&self, row: &FeatureRow) -> Result<f64> {
        let x = row.values();
        if x.len() != self.features {
            return Err(MacroError::ModelFit(format!(
                "{}: expected {} features, got {}",
                NAME,
                self.features,
                x.len()
            )));
        }
        let total: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        Ok(total / self.trees.len() as f64)
    }

    fn name(&self) -> &str {
        NAME
    }
}
