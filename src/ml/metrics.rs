use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;

/// Held-out evaluation of the fitted models
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub decision_tree: RegressionMetrics,
    pub logistic_regression: ClassificationMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub r2_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum::<f64>()
        / actual.len() as f64
}

/// Coefficient of determination; 1.0 for a perfect fit
///
/// A constant `actual` gives 1.0 when predicted exactly and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

pub fn accuracy(actual: &[bool], predicted: &[bool]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let correct = actual.iter().zip(predicted).filter(|(a, p)| a == p).count();
    correct as f64 / actual.len() as f64
}

/// Shuffle with a fixed seed and split off `test_size` of the items
///
/// The test share is rounded to the nearest count, keeping both halves
/// non-empty.
pub fn train_test_split<T: Clone>(
    items: &[T],
    test_size: f64,
    seed: u64,
) -> Result<(Vec<T>, Vec<T>), TrainingError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainingError::InvalidSplit(format!(
            "test size must be between 0 and 1, got {}",
            test_size
        )));
    }
    if items.len() < 2 {
        return Err(TrainingError::InvalidSplit(format!(
            "need at least 2 samples to split, got {}",
            items.len()
        )));
    }

    let n_test = ((items.len() as f64 * test_size).round() as usize).clamp(1, items.len() - 1);

    let mut shuffled = items.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = shuffled.split_off(n_test);

    Ok((train, shuffled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mse() {
        assert_eq!(mean_squared_error(&[1.0, 2.0, 3.0], &[1.0, 2.0, 5.0]), 4.0 / 3.0);
    }

    #[test]
    fn test_r2_perfect_and_mean() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(r2_score(&actual, &actual), 1.0);
        assert_eq!(r2_score(&actual, &[2.5; 4]), 0.0);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[true, false, true, true], &[true, true, true, false]), 0.5);
    }

    #[test]
    fn test_split_sizes() {
        let items: Vec<u32> = (0..100).collect();
        let (train, test) = train_test_split(&items, 0.2, 42).unwrap();

        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);

        let mut all: Vec<_> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, items);
    }

    #[test]
    fn test_split_is_seeded() {
        let items: Vec<u32> = (0..50).collect();
        assert_eq!(
            train_test_split(&items, 0.3, 7).unwrap(),
            train_test_split(&items, 0.3, 7).unwrap()
        );
    }

    #[test]
    fn test_split_rejects_bad_ratio() {
        assert!(train_test_split(&[1, 2, 3], 1.5, 0).is_err());
        assert!(train_test_split(&[1], 0.5, 0).is_err());
    }
}
