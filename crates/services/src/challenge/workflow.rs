use challenge_core::model::{AnswerOutcome, Question, QuizError, QuizSession, StreakState};

use super::state::DailyChallenge;
use crate::Clock;
use crate::error::ChallengeError;
use crate::streak_store::StreakStore;

/// Result of answering a single question in a daily challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub outcome: AnswerOutcome,
    pub streak: StreakState,
    pub streak_advanced: bool,
}

/// Orchestrates a quiz run and the streak bookkeeping on completion.
#[derive(Clone)]
pub struct DailyChallengeService {
    clock: Clock,
    streaks: StreakStore,
}

impl DailyChallengeService {
    #[must_use]
    pub fn new(clock: Clock, streaks: StreakStore) -> Self {
        Self { clock, streaks }
    }

    /// Persisted streak, for display before a challenge is started.
    pub async fn current_streak(&self) -> StreakState {
        self.streaks.load().await
    }

    /// Start a challenge over `questions`.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeError::Quiz` if `questions` is empty.
    pub async fn start(&self, questions: Vec<Question>) -> Result<DailyChallenge, ChallengeError> {
        let session = QuizSession::start(questions)?;
        let streak = self.streaks.load().await;
        tracing::debug!(
            questions = session.total_questions(),
            streak = streak.streak_count(),
            "daily challenge started"
        );
        Ok(DailyChallenge::new(session, streak))
    }

    /// Answer the current question and record the streak when this completes the run.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeError::Quiz` if the challenge is already complete.
    /// Returns `ChallengeError::Storage` if the completion cannot be persisted;
    /// the run stays complete and `finalize_streak` can retry the write.
    pub async fn submit_answer(
        &self,
        challenge: &mut DailyChallenge,
        selected: impl Into<String>,
    ) -> Result<AnswerResult, ChallengeError> {
        let before = challenge.streak;
        let outcome = challenge.session.submit_answer(selected)?;

        if outcome.is_complete {
            tracing::info!(
                score = challenge.session.score(),
                total = challenge.session.total_questions(),
                "daily challenge completed"
            );
            self.finalize_streak(challenge).await?;
        }

        Ok(AnswerResult {
            outcome,
            streak: challenge.streak,
            streak_advanced: challenge.streak != before,
        })
    }

    /// Record the streak for a completed challenge if it has not been recorded yet.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeError::Quiz` if the challenge is not complete.
    /// Returns `ChallengeError::Storage` if persistence fails.
    pub async fn finalize_streak(
        &self,
        challenge: &mut DailyChallenge,
    ) -> Result<StreakState, ChallengeError> {
        if challenge.streak_recorded {
            return Ok(challenge.streak);
        }
        if !challenge.is_complete() {
            return Err(QuizError::NotCompleted.into());
        }

        let today = self.clock.today();
        challenge.streak = self
            .streaks
            .record_completion(challenge.streak, today)
            .await?;
        challenge.streak_recorded = true;
        Ok(challenge.streak)
    }

    /// Restart the quiz from the first question. The streak is left alone.
    pub fn reset(&self, challenge: &mut DailyChallenge) {
        challenge.session.reset();
        challenge.streak_recorded = false;
    }
}
