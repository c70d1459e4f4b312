// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AnimalProfile, Category, Experience, FeatureVector, HousingType, Recommendation, ScoreResult,
    ScoredAnimal, Size, Species, UserProfile, FEATURE_COUNT, FEATURE_NAMES,
};
pub use requests::{BatchPredictRequest, PredictRequest};
pub use responses::{BatchPredictResponse, ErrorResponse, HealthResponse, ModelInfoResponse};
