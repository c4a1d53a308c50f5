use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("a question needs at least {min} options, got {got}")]
    TooFewOptions { min: usize, got: usize },

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("option `{0}` appears more than once")]
    DuplicateOption(String),

    #[error("correct option `{0}` is not one of the options")]
    CorrectOptionMissing(String),
}

/// Unvalidated question as written in configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QuestionDraft {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: String,
}

/// A multiple-choice question. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct_option: String,
}

impl Question {
    pub const MIN_OPTIONS: usize = 2;

    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the draft fails validation.
    pub fn new(
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
        correct_option: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        QuestionDraft {
            prompt: prompt.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct_option: correct_option.into(),
        }
        .validate()
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    /// Exact comparison against the correct option.
    #[must_use]
    pub fn is_correct(&self, selected: &str) -> bool {
        self.correct_option == selected
    }
}

impl QuestionDraft {
    /// Trim and validate the draft into a `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is empty, there are fewer than
    /// two options, an option is empty or repeated, or the correct option is
    /// not among the options.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        if self.options.len() < Question::MIN_OPTIONS {
            return Err(QuestionError::TooFewOptions {
                min: Question::MIN_OPTIONS,
                got: self.options.len(),
            });
        }

        let mut options: Vec<String> = Vec::with_capacity(self.options.len());
        for (index, raw) in self.options.into_iter().enumerate() {
            let option = raw.trim().to_string();
            if option.is_empty() {
                return Err(QuestionError::EmptyOption { index });
            }
            if options.contains(&option) {
                return Err(QuestionError::DuplicateOption(option));
            }
            options.push(option);
        }

        let correct_option = self.correct_option.trim().to_string();
        if !options.contains(&correct_option) {
            return Err(QuestionError::CorrectOptionMissing(correct_option));
        }

        Ok(Question {
            prompt,
            options,
            correct_option,
        })
    }
}
