use std::sync::Arc;

use chrono::NaiveDate;

use challenge_core::model::StreakState;
use storage::repository::{
    DAILY_STREAK_KEY, KeyValueRepository, LAST_COMPLETION_DATE_KEY, StorageError, StreakRecord,
};

/// Owns the persisted daily streak.
///
/// The only component that reads or writes the streak keys.
#[derive(Clone)]
pub struct StreakStore {
    repo: Arc<dyn KeyValueRepository>,
}

impl StreakStore {
    #[must_use]
    pub fn new(repo: Arc<dyn KeyValueRepository>) -> Self {
        Self { repo }
    }

    /// Load the persisted streak, or defaults if nothing usable is stored.
    ///
    /// Read failures and unparsable values are logged and treated as absent.
    pub async fn load(&self) -> StreakState {
        let record = StreakRecord {
            daily_streak: self.read(DAILY_STREAK_KEY).await,
            last_completion_date: self.read(LAST_COMPLETION_DATE_KEY).await,
        };
        let state = record.into_state();
        tracing::debug!(
            streak = state.streak_count(),
            last_completion = ?state.last_completion_date(),
            "loaded streak"
        );
        state
    }

    /// Count a completed challenge on `today`.
    ///
    /// Returns `state` unchanged, without writing, if `today` is already
    /// counted. Otherwise persists and returns the advanced state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the advanced state cannot be persisted.
    pub async fn record_completion(
        &self,
        state: StreakState,
        today: NaiveDate,
    ) -> Result<StreakState, StorageError> {
        let Some(next) = state.advanced(today) else {
            tracing::debug!(%today, "completion already counted today");
            return Ok(state);
        };

        let record = StreakRecord::from_state(&next);
        self.repo.set_many(&record.entries()).await?;

        tracing::info!(streak = next.streak_count(), %today, "streak advanced");
        Ok(next)
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.repo.get(key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read streak value, using default");
                None
            }
        }
    }
}
