use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::analytics::{summarize, DashboardSummary};
use crate::estimation::{
    health_score, FormulaScorer, PredictionInput, PredictionKind, PremiumEstimate, PremiumScorer,
    RawPredictionRequest, ScorerError, ValidationError,
};
use crate::storage::{
    OwnerId, PredictionRecord, PredictionRepository, RecordId, RepositoryError, HISTORY_LIMIT,
};

/// Service composing validation, the premium scorer, and prediction history.
pub struct PremiumService<R> {
    repository: Arc<R>,
    scorer: Arc<dyn PremiumScorer>,
}

/// Result of a scoring call. `record_id` is `None` when the record could not be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub input: PredictionInput,
    pub estimate: PremiumEstimate,
    pub kind: PredictionKind,
    pub health_score: u32,
    pub record_id: Option<RecordId>,
}

impl PredictionOutcome {
    pub fn premium(&self) -> i64 {
        self.estimate.premium
    }
}

impl<R> PremiumService<R>
where
    R: PredictionRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_scorer(repository, Arc::new(FormulaScorer))
    }

    pub fn with_scorer(repository: Arc<R>, scorer: Arc<dyn PremiumScorer>) -> Self {
        Self { repository, scorer }
    }

    /// Validate, score, and record a prediction for `owner`.
    pub fn predict(
        &self,
        owner: &OwnerId,
        request: &RawPredictionRequest,
    ) -> Result<PredictionOutcome, PredictionError> {
        self.predict_at(owner, request, Utc::now())
    }

    /// A failed save is logged and reported through `record_id`, never as an error.
    pub fn predict_at(
        &self,
        owner: &OwnerId,
        request: &RawPredictionRequest,
        now: DateTime<Utc>,
    ) -> Result<PredictionOutcome, PredictionError> {
        let input = request.validate()?;
        let estimate = self.scorer.estimate(&input)?;
        let kind = self.scorer.kind();

        let record =
            PredictionRecord::new(owner.clone(), input.clone(), estimate.premium, kind, now);
        let record_id = match self.repository.insert(record) {
            Ok(id) => {
                info!(owner = %owner, record_id = %id, premium = estimate.premium, "prediction recorded");
                Some(id)
            }
            Err(err) => {
                warn!(
                    owner = %owner,
                    premium = estimate.premium,
                    error = %err,
                    "prediction scored but not saved"
                );
                None
            }
        };

        Ok(PredictionOutcome {
            health_score: health_score(&input),
            input,
            estimate,
            kind,
            record_id,
        })
    }

    /// Newest-first history for `owner`, capped at [`HISTORY_LIMIT`] records.
    pub fn history(&self, owner: &OwnerId) -> Result<Vec<PredictionRecord>, RepositoryError> {
        self.repository.list_by_owner(owner, Some(HISTORY_LIMIT))
    }

    pub fn dashboard(
        &self,
        owner: &OwnerId,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary, RepositoryError> {
        let history = self.repository.list_by_owner(owner, None)?;
        Ok(summarize(&history, now))
    }
}

/// Error raised before a prediction could be scored.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Scorer(#[from] ScorerError),
}
