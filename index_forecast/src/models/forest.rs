//! Bagged regression trees (random forest over the calendar features)

use crate::config::ForestConfig;
use crate::error::Result;
use crate::models::tree::{RegressionTree, Row, TreeParams};
use crate::models::{check_training_data, ForecastModel, ModelInput, ModelKind, TrainedForecastModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bootstrap-aggregated, fully grown regression trees
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
}

/// Trained forest
#[derive(Debug, Clone)]
pub struct TrainedRandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Create a new forest from its configuration
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }
}

impl ForecastModel for RandomForest {
    fn fit(&self, input: &ModelInput<'_>, targets: &[f64]) -> Result<Box<dyn TrainedForecastModel>> {
        check_training_data(self.kind(), input, targets)?;

        let x = input.feature_matrix();
        let n = x.len();
        let params = TreeParams {
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            ..TreeParams::default()
        };

        // One generator for the whole ensemble keeps fits reproducible
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let trees = (0..self.config.n_estimators)
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(&x, targets, &sample, &params)
            })
            .collect();

        Ok(Box::new(TrainedRandomForest { trees }))
    }

    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }
}

impl TrainedRandomForest {
    fn predict_row(&self, row: &Row) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        sum / self.trees.len() as f64
    }
}

impl TrainedForecastModel for TrainedRandomForest {
    fn predict(&self, input: &ModelInput<'_>) -> Result<Vec<f64>> {
        Ok(input
            .feature_matrix()
            .iter()
            .map(|row| self.predict_row(row))
            .collect())
    }

    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }
}
