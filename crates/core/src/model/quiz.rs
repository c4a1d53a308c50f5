use thiserror::Error;

use crate::model::Question;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("a quiz needs at least one question")]
    NoQuestions,

    #[error("quiz already completed")]
    AlreadyCompleted,

    #[error("quiz is not completed yet")]
    NotCompleted,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    InProgress { current_index: usize },
    Completed,
}

/// Outcome of a single submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question_index: usize,
    pub is_correct: bool,
    pub is_complete: bool,
}

/// Progress through the quiz, shaped for a "Question n of m" bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    pub current: usize,
    pub total: usize,
    pub answered: usize,
    pub is_complete: bool,
}

/// One answered question, as shown on the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReview {
    pub prompt: String,
    pub selected: String,
    pub correct_option: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResults {
    pub score: usize,
    pub total: usize,
    pub reviews: Vec<AnswerReview>,
}

impl QuizResults {
    /// Score as a whole percentage of the question count, rounded down.
    #[must_use]
    pub fn percentage(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        self.score * 100 / self.total
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One run through a fixed, ordered list of questions.
///
/// `answers.len()` always equals the number of questions answered so far and
/// `score` never exceeds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    questions: Vec<Question>,
    current: usize,
    answers: Vec<String>,
    score: usize,
}

impl QuizSession {
    /// Start a session at the first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` if `questions` is empty.
    pub fn start(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }

        Ok(Self {
            questions,
            current: 0,
            answers: Vec::new(),
            score: 0,
        })
    }

    /// Record `selected` for the current question and advance.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadyCompleted` if every question has been
    /// answered. The session is left untouched in that case.
    pub fn submit_answer(&mut self, selected: impl Into<String>) -> Result<AnswerOutcome, QuizError> {
        let Some(question) = self.current_question() else {
            return Err(QuizError::AlreadyCompleted);
        };

        let selected = selected.into();
        let is_correct = question.is_correct(&selected);
        let question_index = self.current;

        self.answers.push(selected);
        if is_correct {
            self.score += 1;
        }
        self.current += 1;

        Ok(AnswerOutcome {
            question_index,
            is_correct,
            is_complete: self.is_complete(),
        })
    }

    /// Return to the first question, dropping answers and score.
    pub fn reset(&mut self) {
        self.current = 0;
        self.answers.clear();
        self.score = 0;
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        if self.is_complete() {
            QuizPhase::Completed
        } else {
            QuizPhase::InProgress {
                current_index: self.current,
            }
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current >= self.questions.len()
    }

    /// True before the first answer of a run, i.e. right after start or reset.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.answers.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.total_questions();
        QuizProgress {
            current: (self.current + 1).min(total),
            total,
            answered: self.answers.len(),
            is_complete: self.is_complete(),
        }
    }

    /// Per-question review of everything answered so far.
    #[must_use]
    pub fn results(&self) -> QuizResults {
        let reviews = self
            .questions
            .iter()
            .zip(&self.answers)
            .map(|(question, selected)| AnswerReview {
                prompt: question.prompt().to_owned(),
                selected: selected.clone(),
                correct_option: question.correct_option().to_owned(),
                is_correct: question.is_correct(selected),
            })
            .collect();

        QuizResults {
            score: self.score,
            total: self.total_questions(),
            reviews,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<Question> {
        vec![
            Question::new("Q1", ["a", "b", "c", "d"], "a").unwrap(),
            Question::new("Q2", ["a", "b", "c", "d"], "b").unwrap(),
            Question::new("Q3", ["a", "b", "c", "d"], "c").unwrap(),
        ]
    }

    fn assert_counters_consistent(session: &QuizSession) {
        if !session.is_complete() {
            assert_eq!(session.answers().len(), session.current_index());
        }
        assert!(session.score() <= session.current_index());
    }

    #[test]
    fn start_rejects_empty_question_list() {
        assert_eq!(QuizSession::start(Vec::new()), Err(QuizError::NoQuestions));
    }

    #[test]
    fn all_correct_scores_full_marks() {
        let mut session = QuizSession::start(questions()).unwrap();
        assert_eq!(session.phase(), QuizPhase::InProgress { current_index: 0 });

        for answer in ["a", "b", "c"] {
            let outcome = session.submit_answer(answer).unwrap();
            assert!(outcome.is_correct);
            assert_counters_consistent(&session);
        }

        assert_eq!(session.score(), 3);
        assert_eq!(session.phase(), QuizPhase::Completed);
        assert_eq!(session.results().percentage(), 100);
    }

    #[test]
    fn mixed_answers_keep_order_and_score() {
        let mut session = QuizSession::start(questions()).unwrap();

        let first = session.submit_answer("a").unwrap();
        let second = session.submit_answer("d").unwrap();
        assert_counters_consistent(&session);
        let third = session.submit_answer("c").unwrap();

        assert_eq!((first.question_index, first.is_complete), (0, false));
        assert!(!second.is_correct);
        assert!(third.is_complete);
        assert_eq!(session.score(), 2);
        assert_eq!(session.answers(), ["a", "d", "c"]);

        let results = session.results();
        assert_eq!(results.percentage(), 66);
        assert_eq!(results.reviews[1].selected, "d");
        assert_eq!(results.reviews[1].correct_option, "b");
        assert!(!results.reviews[1].is_correct);
    }

    #[test]
    fn submit_after_completion_is_rejected_without_side_effects() {
        let mut session = QuizSession::start(questions()).unwrap();
        for answer in ["a", "b", "c"] {
            session.submit_answer(answer).unwrap();
        }
        let before = session.clone();

        assert_eq!(session.submit_answer("a"), Err(QuizError::AlreadyCompleted));
        assert_eq!(session, before);
    }

    #[test]
    fn reset_returns_to_first_question() {
        let mut session = QuizSession::start(questions()).unwrap();
        session.submit_answer("a").unwrap();
        session.submit_answer("b").unwrap();
        assert!(!session.is_fresh());

        session.reset();

        assert!(session.is_fresh());
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_question().map(Question::prompt), Some("Q1"));
        assert_eq!(
            session.progress(),
            QuizProgress {
                current: 1,
                total: 3,
                answered: 0,
                is_complete: false,
            }
        );
    }

    #[test]
    fn progress_caps_current_at_total() {
        let mut session = QuizSession::start(questions()).unwrap();
        for answer in ["x", "y", "z"] {
            session.submit_answer(answer).unwrap();
        }
        let progress = session.progress();
        assert_eq!(progress.current, 3);
        assert!(progress.is_complete);
        assert_eq!(session.results().percentage(), 0);
    }
}
