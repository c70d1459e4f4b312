use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::ml::{
    CompatibilityClassifier, DecisionTreeRegressor, Regressor, TrainedModels, TrainingMetrics,
};
use crate::models::{FeatureVector, ModelInfoResponse, FEATURE_NAMES};

/// Errors that can occur while loading or saving the model artifact
///
/// Any of these at startup means the model is unavailable and the service
/// must not start.
#[derive(Debug, Error)]
pub enum ModelStoreError {
    #[error("Model artifact not found at {0}; run petmatch-train first")]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Feature mismatch: artifact expects {found:?}, encoder produces {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Corrupt model artifact: {0}")]
    Corrupt(String),
}

/// Everything the trainer produces, as persisted on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub regressor: DecisionTreeRegressor,
    pub classifier: CompatibilityClassifier,
    pub metrics: TrainingMetrics,
}

impl ModelArtifact {
    pub fn new(trained: TrainedModels) -> Self {
        Self {
            model_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            feature_names: expected_feature_names(),
            regressor: trained.regressor,
            classifier: trained.classifier,
            metrics: trained.metrics,
        }
    }

    /// Check the artifact against the encoder's feature order
    pub fn validate(&self) -> Result<(), ModelStoreError> {
        let expected = expected_feature_names();
        if self.feature_names != expected {
            return Err(ModelStoreError::FeatureMismatch {
                expected,
                found: self.feature_names.clone(),
            });
        }

        self.regressor.validate().map_err(ModelStoreError::Corrupt)?;
        self.classifier.validate().map_err(ModelStoreError::Corrupt)
    }

    pub fn info(&self) -> ModelInfoResponse {
        ModelInfoResponse {
            model_id: self.model_id,
            trained_at: self.trained_at,
            feature_names: self.feature_names.clone(),
            metrics: self.metrics,
        }
    }
}

impl Regressor for ModelArtifact {
    fn predict(&self, features: &FeatureVector) -> f64 {
        self.regressor.predict_one(features)
    }

    fn name(&self) -> &str {
        self.regressor.name()
    }
}

fn expected_feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

/// Reads and writes the model artifact as JSON
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the artifact
    pub async fn load(&self) -> Result<ModelArtifact, ModelStoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ModelStoreError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
        artifact.validate()?;

        tracing::info!(
            "Loaded model {} (trained {}, {} tree nodes) from {}",
            artifact.model_id,
            artifact.trained_at,
            artifact.regressor.node_count(),
            self.path.display()
        );

        Ok(artifact)
    }

    /// Write the artifact, creating parent directories as needed
    pub fn save(&self, artifact: &ModelArtifact) -> Result<(), ModelStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec_pretty(artifact)?;
        std::fs::write(&self.path, json)?;

        tracing::info!("Saved model {} to {}", artifact.model_id, self.path.display());
        Ok(())
    }
}
