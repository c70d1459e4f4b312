use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use crate::config::ScoringSettings;
use crate::core::Scorer;
use crate::error::ScoringError;
use crate::models::{
    BatchPredictRequest, BatchPredictResponse, ErrorResponse, HealthResponse, PredictRequest,
};
use crate::services::ModelArtifact;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub scorer: Scorer,
    pub model: Arc<ModelArtifact>,
}

impl AppState {
    /// Build the state around a loaded artifact; the scorer shares it
    pub fn new(model: Arc<ModelArtifact>, scoring: &ScoringSettings) -> Self {
        let scorer = Scorer::new(model.clone())
            .with_policy(scoring.batch_policy)
            .with_max_batch_size(scoring.max_batch_size);
        Self { scorer, model }
    }
}

/// Configure all prediction routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/model", web::get().to(model_info))
        .route("/predict", web::post().to(predict))
        .route("/predict/batch", web::post().to(predict_batch));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        model: state.scorer.model_name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Metadata of the loaded model
///
/// GET /model
async fn model_info(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.model.info())
}

/// Single prediction endpoint
///
/// POST /predict
///
/// Request body:
/// ```json
/// {
///   "user": {
///     "housing_type": "apartment | house_small | house_large",
///     "available_time": 4,
///     "experience": "none | some | expert",
///     "has_children": true,
///     "has_other_pets": false
///   },
///   "animal": {
///     "species": "cat | dog | other",
///     "age": 3,
///     "size": "small | medium | large",
///     "energy_level": 5,
///     "good_with_children": true,
///     "good_with_pets": true
///   }
/// }
/// ```
async fn predict(state: web::Data<AppState>, req: web::Json<PredictRequest>) -> impl Responder {
    let (user, animal) = match req.into_inner().into_parts() {
        Ok(parts) => parts,
        Err(e) => return error_response(&e),
    };

    match state.scorer.score_json(&user, &animal) {
        Ok(result) => {
            tracing::info!(
                "Scored pair: {} ({})",
                result.compatibility_score,
                result.recommendation
            );
            HttpResponse::Ok().json(result)
        }
        Err(e) => error_response(&e),
    }
}

/// Batch prediction endpoint, best match first
///
/// POST /predict/batch
///
/// Request body:
/// ```json
/// {
///   "user": { ... },
///   "animals": [ { "id": "1", ... }, { "id": "2", ... } ]
/// }
/// ```
async fn predict_batch(
    state: web::Data<AppState>,
    req: web::Json<BatchPredictRequest>,
) -> impl Responder {
    let (user, animals) = match req.into_inner().into_parts() {
        Ok(parts) => parts,
        Err(e) => return error_response(&e),
    };

    match state.scorer.score_batch_json(&user, &animals) {
        Ok(predictions) => {
            tracing::info!(
                "Returning {} predictions (from {} animals)",
                predictions.len(),
                animals.len()
            );
            HttpResponse::Ok().json(BatchPredictResponse { predictions })
        }
        Err(e) => error_response(&e),
    }
}

/// Validation failures are the caller's fault (400); everything else is 500
fn error_response(err: &ScoringError) -> HttpResponse {
    if err.is_client_error() {
        tracing::info!("Rejected request: {}", err);
        HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid input format".to_string(),
            message: err.to_string(),
            status_code: 400,
        })
    } else {
        tracing::error!("Scoring failed: {}", err);
        HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Scoring failed".to_string(),
            message: err.to_string(),
            status_code: 500,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoringError;

    #[test]
    fn test_error_status_codes() {
        let bad_request = error_response(&ScoringError::Validation("missing user".to_string()));
        assert_eq!(bad_request.status(), 400);

        let server_error = error_response(&ScoringError::NonFiniteScore(f64::INFINITY));
        assert_eq!(server_error.status(), 500);
    }
}
