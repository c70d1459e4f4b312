use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::core::{encoder::encode, scoring::to_score_result};
use crate::error::ScoringError;
use crate::ml::Regressor;
use crate::models::{AnimalProfile, ScoreResult, ScoredAnimal, UserProfile};

/// What a batch does when one of its animals fails to score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Abort the whole batch on the first failed item
    #[default]
    FailFast,
    /// Drop failed items and rank the rest
    SkipInvalid,
}

/// Default upper bound on animals per batch request
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// Scoring pipeline: encode -> predict -> normalize -> classify
///
/// Holds a read-only handle to the regression model. Cloning is cheap and
/// every clone shares the same model.
#[derive(Clone)]
pub struct Scorer {
    model: Arc<dyn Regressor>,
    policy: BatchPolicy,
    max_batch_size: usize,
}

impl Scorer {
    pub fn new(model: Arc<dyn Regressor>) -> Self {
        Self {
            model,
            policy: BatchPolicy::default(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Score one (user, animal) pair
    pub fn score_pair(
        &self,
        user: &UserProfile,
        animal: &AnimalProfile,
    ) -> Result<ScoreResult, ScoringError> {
        let features = encode(user, animal);
        let raw = self.model.predict(&features);

        if !raw.is_finite() {
            return Err(ScoringError::NonFiniteScore(raw));
        }

        Ok(to_score_result(raw))
    }

    /// Parse raw JSON profiles and score them
    pub fn score_json(&self, user: &Value, animal: &Value) -> Result<ScoreResult, ScoringError> {
        let user = UserProfile::try_from(user.clone())?;
        let animal = AnimalProfile::try_from(animal.clone())?;
        self.score_pair(&user, &animal)
    }

    /// Score every animal for one user, keeping each outcome separately
    ///
    /// Results are in input order.
    pub fn score_items(
        &self,
        user: &UserProfile,
        animals: &[AnimalProfile],
    ) -> Vec<Result<ScoredAnimal, ScoringError>> {
        animals
            .iter()
            .enumerate()
            .map(|(index, animal)| {
                self.score_pair(user, animal)
                    .map(|result| scored(animal.id.clone(), result))
                    .map_err(|e| batch_item_error(index, animal.id.clone(), e))
            })
            .collect()
    }

    /// Score and rank animals for one user, best match first
    ///
    /// Items with equal scores keep their input order. Failed items are
    /// handled according to the configured `BatchPolicy`.
    pub fn score_batch(
        &self,
        user: &UserProfile,
        animals: &[AnimalProfile],
    ) -> Result<Vec<ScoredAnimal>, ScoringError> {
        self.check_batch_size(animals.len())?;
        self.rank(self.score_items(user, animals))
    }

    /// Parse and score a batch of raw JSON animals for one raw JSON user
    ///
    /// A malformed user fails the whole request regardless of policy; a
    /// malformed animal is a batch item failure.
    pub fn score_batch_json(
        &self,
        user: &Value,
        animals: &[Value],
    ) -> Result<Vec<ScoredAnimal>, ScoringError> {
        self.check_batch_size(animals.len())?;
        let user = UserProfile::try_from(user.clone())?;

        let outcomes: Vec<Result<ScoredAnimal, ScoringError>> = animals
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let animal = AnimalProfile::try_from(raw.clone())
                    .map_err(|e| batch_item_error(index, raw_id(raw), e))?;
                self.score_pair(&user, &animal)
                    .map(|result| scored(animal.id.clone(), result))
                    .map_err(|e| batch_item_error(index, animal.id.clone(), e))
            })
            .collect();

        self.rank(outcomes)
    }

    fn check_batch_size(&self, len: usize) -> Result<(), ScoringError> {
        if len > self.max_batch_size {
            return Err(ScoringError::Validation(format!(
                "Batch of {} animals exceeds the limit of {}",
                len, self.max_batch_size
            )));
        }
        Ok(())
    }

    fn rank(
        &self,
        outcomes: Vec<Result<ScoredAnimal, ScoringError>>,
    ) -> Result<Vec<ScoredAnimal>, ScoringError> {
        let mut ranked = Vec::with_capacity(outcomes.len());

        for outcome in outcomes {
            match (outcome, self.policy) {
                (Ok(item), _) => ranked.push(item),
                (Err(e), BatchPolicy::FailFast) => return Err(e),
                (Err(e), BatchPolicy::SkipInvalid) => {
                    tracing::warn!("Skipping batch item: {}", e);
                }
            }
        }

        // Stable sort keeps encounter order for equal scores
        ranked.sort_by(|a, b| b.compatibility_score.total_cmp(&a.compatibility_score));

        tracing::debug!("Ranked {} animals", ranked.len());
        Ok(ranked)
    }
}

impl fmt::Debug for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scorer")
            .field("model", &self.model.name())
            .field("policy", &self.policy)
            .field("max_batch_size", &self.max_batch_size)
            .finish()
    }
}

fn scored(animal_id: Option<Value>, result: ScoreResult) -> ScoredAnimal {
    ScoredAnimal {
        animal_id,
        compatibility_score: result.compatibility_score,
        recommendation: result.recommendation,
    }
}

fn batch_item_error(index: usize, animal_id: Option<Value>, source: ScoringError) -> ScoringError {
    ScoringError::BatchItem {
        index,
        animal_id,
        source: Box::new(source),
    }
}

fn raw_id(raw: &Value) -> Option<Value> {
    raw.get("id").filter(|v| !v.is_null()).cloned()
}
