use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::ScoringError;

/// Request to score one (user, animal) pair
///
/// Profiles are kept as raw JSON until the request passes validation, so a
/// missing key is reported separately from a malformed profile.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(required)]
    #[serde(default)]
    pub user: Option<Value>,
    #[validate(required)]
    #[serde(default)]
    pub animal: Option<Value>,
}

/// Request to score and rank several animals for one user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BatchPredictRequest {
    #[validate(required)]
    #[serde(default)]
    pub user: Option<Value>,
    #[validate(required)]
    #[serde(default)]
    pub animals: Option<Value>,
}

impl PredictRequest {
    /// Check required keys and hand back the raw profiles
    pub fn into_parts(self) -> Result<(Value, Value), ScoringError> {
        self.validate()
            .map_err(|e| ScoringError::Validation(format!("Invalid input format: {}", e)))?;
        match (self.user, self.animal) {
            (Some(user), Some(animal)) => Ok((user, animal)),
            _ => Err(missing_keys()),
        }
    }
}

impl BatchPredictRequest {
    /// Check required keys and hand back the user and the list of animals
    pub fn into_parts(self) -> Result<(Value, Vec<Value>), ScoringError> {
        self.validate()
            .map_err(|e| ScoringError::Validation(format!("Invalid input format: {}", e)))?;
        match (self.user, self.animals) {
            (Some(user), Some(Value::Array(animals))) => Ok((user, animals)),
            (Some(_), Some(_)) => Err(ScoringError::Validation(
                "animals must be a JSON array".to_string(),
            )),
            _ => Err(missing_keys()),
        }
    }
}

fn missing_keys() -> ScoringError {
    ScoringError::Validation("Invalid input format".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_animal_fails_validation() {
        let req: PredictRequest = serde_json::from_value(json!({ "user": {} })).unwrap();
        let err = req.into_parts().unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_empty_profiles_pass_validation() {
        let req: PredictRequest = serde_json::from_value(json!({ "user": {}, "animal": {} })).unwrap();
        assert!(req.into_parts().is_ok());
    }

    #[test]
    fn test_batch_requires_array() {
        let req: BatchPredictRequest =
            serde_json::from_value(json!({ "user": {}, "animals": { "id": 1 } })).unwrap();
        assert!(req.into_parts().unwrap_err().is_client_error());
    }

    #[test]
    fn test_batch_parts() {
        let req: BatchPredictRequest =
            serde_json::from_value(json!({ "user": {}, "animals": [{ "id": 1 }, { "id": 2 }] })).unwrap();
        let (_, animals) = req.into_parts().unwrap();
        assert_eq!(animals.len(), 2);
    }
}
