use serde::{Deserialize, Serialize};

use crate::error::TrainingError;
use crate::models::{FeatureVector, FEATURE_COUNT};

/// Per-feature standardization: `(x - mean) / std`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Learn means and standard deviations; constant features get scale 1
    pub fn fit(rows: &[FeatureVector]) -> Result<Self, TrainingError> {
        if rows.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }

        let n = rows.len() as f64;
        let mut mean = [0.0; FEATURE_COUNT];
        let mut scale = [0.0; FEATURE_COUNT];

        for row in rows {
            for (m, x) in mean.iter_mut().zip(row.as_slice()) {
                *m += x / n;
            }
        }

        for row in rows {
            for ((s, m), x) in scale.iter_mut().zip(&mean).zip(row.as_slice()) {
                *s += (x - m) * (x - m) / n;
            }
        }

        for s in scale.iter_mut() {
            *s = if *s > 0.0 { s.sqrt() } else { 1.0 };
        }

        Ok(Self { mean, scale })
    }

    /// Means must be finite and scales finite and positive
    pub fn validate(&self) -> Result<(), String> {
        if let Some(i) = self.mean.iter().position(|m| !m.is_finite()) {
            return Err(format!("scaler mean {} is not finite", i));
        }
        if let Some(i) = self.scale.iter().position(|s| !s.is_finite() || *s <= 0.0) {
            return Err(format!("scaler scale {} is not a positive finite number", i));
        }
        Ok(())
    }

    pub fn transform(&self, features: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, o) in out.iter_mut().enumerate() {
            *o = (features.get(i) - self.mean[i]) / self.scale[i];
        }
        out
    }
}

/// Gradient descent settings for the logistic model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    pub max_iter: usize,
    pub learning_rate: f64,
    /// Inverse regularization strength, as in the usual `C` parameter
    pub c: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            learning_rate: 0.1,
            c: 1.0,
        }
    }
}

/// Binary logistic regression on standardized features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: [f64; FEATURE_COUNT],
    intercept: f64,
}

impl LogisticRegression {
    /// Full-batch gradient descent on the L2-penalized log loss
    pub fn fit(
        rows: &[[f64; FEATURE_COUNT]],
        labels: &[bool],
        params: LogisticParams,
    ) -> Result<Self, TrainingError> {
        if rows.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }
        if rows.len() != labels.len() {
            return Err(TrainingError::ShapeMismatch {
                rows: rows.len(),
                targets: labels.len(),
            });
        }

        let n = rows.len() as f64;
        let penalty = 1.0 / (params.c * n);
        let mut model = Self {
            weights: [0.0; FEATURE_COUNT],
            intercept: 0.0,
        };

        for _ in 0..params.max_iter {
            let mut grad_w = [0.0; FEATURE_COUNT];
            let mut grad_b = 0.0;

            for (x, &y) in rows.iter().zip(labels) {
                let err = model.probability(x) - if y { 1.0 } else { 0.0 };
                for (g, xi) in grad_w.iter_mut().zip(x) {
                    *g += err * xi / n;
                }
                grad_b += err / n;
            }

            for (w, g) in model.weights.iter_mut().zip(&grad_w) {
                *w -= params.learning_rate * (g + penalty * *w);
            }
            model.intercept -= params.learning_rate * grad_b;
        }

        Ok(model)
    }

    pub fn weights(&self) -> &[f64; FEATURE_COUNT] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Probability of the positive class
    pub fn probability(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let z = self.intercept
            + self
                .weights
                .iter()
                .zip(x)
                .map(|(w, xi)| w * xi)
                .sum::<f64>();
        sigmoid(z)
    }
}

/// Auxiliary classifier: is a pair "high compatibility"?
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityClassifier {
    scaler: StandardScaler,
    model: LogisticRegression,
    /// Scores at or above this count as high compatibility
    threshold: f64,
}

impl CompatibilityClassifier {
    pub fn fit(
        rows: &[FeatureVector],
        scores: &[f64],
        threshold: f64,
        params: LogisticParams,
    ) -> Result<Self, TrainingError> {
        let scaler = StandardScaler::fit(rows)?;
        let scaled: Vec<_> = rows.iter().map(|r| scaler.transform(r)).collect();
        let labels: Vec<bool> = scores.iter().map(|&s| s >= threshold).collect();
        let model = LogisticRegression::fit(&scaled, &labels, params)?;

        Ok(Self {
            scaler,
            model,
            threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Check a classifier read from disk
    pub fn validate(&self) -> Result<(), String> {
        self.scaler.validate()?;

        let weights = self.model.weights();
        if let Some(i) = weights.iter().position(|w| !w.is_finite()) {
            return Err(format!("classifier weight {} is not finite", i));
        }
        if !self.model.intercept().is_finite() {
            return Err("classifier intercept is not finite".to_string());
        }
        if !self.threshold.is_finite() {
            return Err("classifier threshold is not finite".to_string());
        }
        Ok(())
    }

    pub fn probability(&self, features: &FeatureVector) -> f64 {
        self.model.probability(&self.scaler.transform(features))
    }

    pub fn is_high_compatibility(&self, features: &FeatureVector) -> bool {
        self.probability(features) >= 0.5
    }
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
