use thiserror::Error;

/// Errors raised while turning a request into a compatibility score
#[derive(Debug, Error)]
pub enum ScoringError {
    /// A required top-level field is missing or has the wrong shape
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A profile field could not be encoded into the feature vector
    #[error("Cannot encode {entity}.{field}: {reason}")]
    Encoding {
        entity: &'static str,
        field: &'static str,
        reason: String,
    },

    /// The regression model produced NaN or an infinite value
    #[error("Model produced a non-finite score: {0}")]
    NonFiniteScore(f64),

    /// One animal of a batch failed to score
    #[error("Batch item {index} (animal_id: {}) failed: {source}", display_id(.animal_id))]
    BatchItem {
        index: usize,
        animal_id: Option<serde_json::Value>,
        #[source]
        source: Box<ScoringError>,
    },
}

impl ScoringError {
    /// Whether the caller sent a malformed request, as opposed to a failure
    /// while processing a well-formed one
    pub fn is_client_error(&self) -> bool {
        matches!(self, ScoringError::Validation(_))
    }
}

fn display_id(id: &Option<serde_json::Value>) -> String {
    match id {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "none".to_string(),
    }
}

/// Errors raised by the offline trainer
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Training set is empty")]
    EmptyDataset,

    #[error("Got {rows} feature rows but {targets} targets")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("Invalid train/test split: {0}")]
    InvalidSplit(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_item_message_names_animal() {
        let err = ScoringError::BatchItem {
            index: 2,
            animal_id: Some(serde_json::json!("rex")),
            source: Box::new(ScoringError::Encoding {
                entity: "animal",
                field: "age",
                reason: "expected a real number, found \"old\"".to_string(),
            }),
        };

        let msg = err.to_string();
        assert!(msg.contains("Batch item 2"));
        assert!(msg.contains("rex"));
        assert!(msg.contains("animal.age"));
    }

    #[test]
    fn test_only_validation_is_client_error() {
        assert!(ScoringError::Validation("missing user".to_string()).is_client_error());
        assert!(!ScoringError::NonFiniteScore(f64::NAN).is_client_error());
    }
}
