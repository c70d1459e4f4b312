//! PetMatch - adopter/animal compatibility scoring
//!
//! Encodes a (user, animal) pair into a fixed feature vector, runs it through
//! a trained regression model and turns the output into a 0-100 score with a
//! recommendation band. Also ships the synthetic-data trainer that produces
//! the model.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod ml;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{classify, encode, normalize, BatchPolicy, Scorer};
pub use error::{ScoringError, TrainingError};
pub use ml::Regressor;
pub use models::{AnimalProfile, FeatureVector, Recommendation, ScoreResult, ScoredAnimal, UserProfile};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let v = encode(&UserProfile::default(), &AnimalProfile::default());
        assert_eq!(v.as_slice().len(), models::FEATURE_COUNT);
        assert_eq!(classify(normalize(150.0)), Recommendation::Excellent);
    }
}
