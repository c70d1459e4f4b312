use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::core::synthetic::LabeledSample;
use crate::error::TrainingError;
use crate::ml::logistic::{CompatibilityClassifier, LogisticParams};
use crate::ml::metrics::{
    accuracy, mean_squared_error, r2_score, train_test_split, ClassificationMetrics,
    RegressionMetrics, TrainingMetrics,
};
use crate::ml::tree::{DecisionTreeRegressor, TreeParams};
use crate::models::{FeatureVector, FEATURE_NAMES};

/// Scores at or above this are labeled high compatibility for the classifier
pub const HIGH_COMPATIBILITY_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Copy)]
pub struct TrainingConfig {
    pub test_size: f64,
    pub split_seed: u64,
    pub tree: TreeParams,
    pub logistic: LogisticParams,
    pub high_compatibility_threshold: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            split_seed: 42,
            tree: TreeParams::default(),
            logistic: LogisticParams::default(),
            high_compatibility_threshold: HIGH_COMPATIBILITY_THRESHOLD,
        }
    }
}

/// Output of a training run
#[derive(Debug, Clone)]
pub struct TrainedModels {
    pub regressor: DecisionTreeRegressor,
    pub classifier: CompatibilityClassifier,
    pub metrics: TrainingMetrics,
    pub train_samples: usize,
    pub test_samples: usize,
}

/// Score range of a generated dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Fit the regression tree and the auxiliary classifier, then evaluate
/// both on a held-out split
pub fn train(dataset: &[LabeledSample], config: &TrainingConfig) -> Result<TrainedModels, TrainingError> {
    if dataset.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }

    let (train_set, test_set) = train_test_split(dataset, config.test_size, config.split_seed)?;
    let (x_train, y_train) = unzip(&train_set);
    let (x_test, y_test) = unzip(&test_set);

    tracing::info!(
        "Training decision tree on {} samples (max_depth={}, min_samples_split={})",
        x_train.len(),
        config.tree.max_depth,
        config.tree.min_samples_split
    );
    let regressor = DecisionTreeRegressor::fit(&x_train, &y_train, config.tree)?;
    let predictions = regressor.predict_many(&x_test);
    let decision_tree = RegressionMetrics {
        mse: mean_squared_error(&y_test, &predictions),
        r2_score: r2_score(&y_test, &predictions),
    };
    tracing::info!(
        "Decision tree - MSE: {:.2}, R2: {:.4}",
        decision_tree.mse,
        decision_tree.r2_score
    );

    tracing::info!("Training logistic regression (high compatibility >= {})", config.high_compatibility_threshold);
    let classifier = CompatibilityClassifier::fit(
        &x_train,
        &y_train,
        config.high_compatibility_threshold,
        config.logistic,
    )?;
    let actual: Vec<bool> = y_test
        .iter()
        .map(|&s| s >= config.high_compatibility_threshold)
        .collect();
    let predicted: Vec<bool> = x_test
        .iter()
        .map(|x| classifier.is_high_compatibility(x))
        .collect();
    let logistic_regression = ClassificationMetrics {
        accuracy: accuracy(&actual, &predicted),
    };
    tracing::info!("Logistic regression - Accuracy: {:.4}", logistic_regression.accuracy);

    Ok(TrainedModels {
        regressor,
        classifier,
        metrics: TrainingMetrics {
            decision_tree,
            logistic_regression,
        },
        train_samples: x_train.len(),
        test_samples: x_test.len(),
    })
}

pub fn summarize(dataset: &[LabeledSample]) -> Option<DatasetSummary> {
    if dataset.is_empty() {
        return None;
    }

    let scores = dataset.iter().map(|s| s.compatibility_score);
    let (min, max, sum) = scores.fold((f64::INFINITY, f64::NEG_INFINITY, 0.0), |(lo, hi, sum), s| {
        (lo.min(s), hi.max(s), sum + s)
    });

    Some(DatasetSummary {
        count: dataset.len(),
        min,
        max,
        mean: sum / dataset.len() as f64,
    })
}

/// Write the dataset as CSV: the feature columns then `compatibility_score`
pub fn write_training_csv(path: &Path, dataset: &[LabeledSample]) -> Result<(), TrainingError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{},compatibility_score", FEATURE_NAMES.join(","))?;

    for sample in dataset {
        let row: Vec<String> = sample
            .features
            .as_slice()
            .iter()
            .map(|x| x.to_string())
            .collect();
        writeln!(writer, "{},{}", row.join(","), sample.compatibility_score)?;
    }

    writer.flush()?;
    Ok(())
}

fn unzip(samples: &[LabeledSample]) -> (Vec<FeatureVector>, Vec<f64>) {
    samples
        .iter()
        .map(|s| (s.features, s.compatibility_score))
        .unzip()
}
