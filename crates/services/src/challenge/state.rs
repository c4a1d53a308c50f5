use challenge_core::model::{QuizSession, StreakState};

/// A quiz run together with the streak it will advance.
///
/// The streak snapshot is loaded once when the challenge starts and replaced
/// by whatever `StreakStore` returns on completion.
#[derive(Debug, Clone)]
pub struct DailyChallenge {
    pub(crate) session: QuizSession,
    pub(crate) streak: StreakState,
    pub(crate) streak_recorded: bool,
}

impl DailyChallenge {
    pub(crate) fn new(session: QuizSession, streak: StreakState) -> Self {
        Self {
            session,
            streak,
            streak_recorded: false,
        }
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn streak(&self) -> StreakState {
        self.streak
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    /// True once this run's completion has been written to the streak store.
    #[must_use]
    pub fn streak_recorded(&self) -> bool {
        self.streak_recorded
    }
}
