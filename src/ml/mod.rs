//! Regression and classification components fitted by the trainer

pub mod logistic;
pub mod metrics;
pub mod training;
pub mod tree;

use crate::models::FeatureVector;

pub use logistic::{CompatibilityClassifier, LogisticParams, LogisticRegression, StandardScaler};
pub use metrics::{accuracy, mean_squared_error, r2_score, train_test_split, TrainingMetrics};
pub use training::{train, TrainedModels, TrainingConfig};
pub use tree::{DecisionTreeRegressor, TreeParams};

/// A fitted model mapping a feature vector to a raw compatibility score
///
/// Implementations must be safe to share read-only across request workers.
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> f64;

    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Regressor for F
where
    F: Fn(&FeatureVector) -> f64 + Send + Sync,
{
    fn predict(&self, features: &FeatureVector) -> f64 {
        self(features)
    }
}
