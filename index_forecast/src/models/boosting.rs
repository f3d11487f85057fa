//! Gradient-boosted regression trees
//!
//! Squared-error boosting: start from the target mean, then fit each tree
//! to the current residuals and add it with a shrinkage factor. The same
//! implementation backs both boosting candidates; their configurations
//! differ in how trees grow (depth-limited vs. leaf-limited).

use crate::config::BoostingConfig;
use crate::error::{ForecastError, Result};
use crate::models::tree::{RegressionTree, Row, TreeParams};
use crate::models::{check_training_data, ForecastModel, ModelInput, ModelKind, TrainedForecastModel};
use index_math::stats::mean;

/// Gradient boosting candidate
#[derive(Debug, Clone)]
pub struct GradientBoosting {
    kind: ModelKind,
    config: BoostingConfig,
}

/// Trained boosting ensemble
#[derive(Debug, Clone)]
pub struct TrainedGradientBoosting {
    kind: ModelKind,
    base: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoosting {
    /// Create a boosting candidate reported under `kind`
    pub fn new(kind: ModelKind, config: BoostingConfig) -> Self {
        Self { kind, config }
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.config.max_depth,
            max_leaves: self.config.max_leaves,
            min_samples_split: 2,
            min_samples_leaf: self.config.min_samples_leaf,
            l2_regularization: self.config.l2_regularization,
        }
    }
}

impl ForecastModel for GradientBoosting {
    fn fit(&self, input: &ModelInput<'_>, targets: &[f64]) -> Result<Box<dyn TrainedForecastModel>> {
        check_training_data(self.kind, input, targets)?;

        let x = input.feature_matrix();
        let rows: Vec<usize> = (0..x.len()).collect();
        let params = self.tree_params();
        let base = mean(targets);
        let mut fitted = vec![base; targets.len()];
        let mut trees = Vec::with_capacity(self.config.n_estimators);

        for _ in 0..self.config.n_estimators {
            let residuals: Vec<f64> = targets.iter().zip(&fitted).map(|(y, f)| y - f).collect();
            let tree = RegressionTree::fit(&x, &residuals, &rows, &params);
            for (f, row) in fitted.iter_mut().zip(&x) {
                *f += self.config.learning_rate * tree.predict_row(row);
            }
            trees.push(tree);
        }

        if fitted.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::candidate(self.kind, "boosting diverged"));
        }

        Ok(Box::new(TrainedGradientBoosting {
            kind: self.kind,
            base,
            learning_rate: self.config.learning_rate,
            trees,
        }))
    }

    fn kind(&self) -> ModelKind {
        self.kind
    }
}

impl TrainedGradientBoosting {
    fn predict_row(&self, row: &Row) -> f64 {
        self.base
            + self.learning_rate * self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>()
    }
}

impl TrainedForecastModel for TrainedGradientBoosting {
    fn predict(&self, input: &ModelInput<'_>) -> Result<Vec<f64>> {
        Ok(input
            .feature_matrix()
            .iter()
            .map(|row| self.predict_row(row))
            .collect())
    }

    fn kind(&self) -> ModelKind {
        self.kind
    }
}
