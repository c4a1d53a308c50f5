mod state;
mod workflow;

pub use state::DailyChallenge;
pub use workflow::{AnswerResult, DailyChallengeService};
