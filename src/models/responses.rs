use serde::{Deserialize, Serialize};

use crate::models::domain::ScoredAnimal;
use crate::ml::TrainingMetrics;

/// Response for the batch prediction endpoint, best match first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictResponse {
    pub predictions: Vec<ScoredAnimal>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Metadata about the loaded model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub model_id: uuid::Uuid,
    pub trained_at: chrono::DateTime<chrono::Utc>,
    pub feature_names: Vec<String>,
    pub metrics: TrainingMetrics,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
