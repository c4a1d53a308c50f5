mod question;
mod quiz;
mod streak;

pub use question::{Question, QuestionDraft, QuestionError};
pub use quiz::{
    AnswerOutcome, AnswerReview, QuizError, QuizPhase, QuizProgress, QuizResults, QuizSession,
};
pub use streak::{StreakState, format_completion_date, parse_completion_date};
