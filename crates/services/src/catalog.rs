use std::path::Path;

use serde::Deserialize;

use challenge_core::model::{Question, QuestionDraft};

use crate::error::CatalogError;

const BUILTIN_CATALOG: &str = include_str!("builtin_challenge.toml");

/// What the intro screen shows before the first question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeIntro {
    pub topic: String,
    pub duration: String,
}

/// The fixed question list for a daily challenge plus its intro text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeCatalog {
    intro: ChallengeIntro,
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    topic: String,
    duration: String,
    #[serde(default, rename = "question")]
    questions: Vec<QuestionDraft>,
}

impl ChallengeCatalog {
    /// The bundled real-estate challenge.
    ///
    /// # Panics
    ///
    /// Panics if the bundled catalog does not validate.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_CATALOG).expect("bundled catalog should be valid")
    }

    /// Parse a catalog from TOML.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed TOML,
    /// `CatalogError::InvalidQuestion` naming the first bad question (1-based),
    /// or `CatalogError::Empty` if there are no questions.
    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(raw)?;
        if file.questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let questions = file
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                draft.validate().map_err(|source| CatalogError::InvalidQuestion {
                    position: index + 1,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            intro: ChallengeIntro {
                topic: file.topic.trim().to_string(),
                duration: file.duration.trim().to_string(),
            },
            questions,
        })
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, otherwise the
    /// errors of `from_toml_str`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), questions = catalog.questions.len(), "loaded catalog");
        Ok(catalog)
    }

    #[must_use]
    pub fn intro(&self) -> &ChallengeIntro {
        &self.intro
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use challenge_core::model::QuestionError;

    #[test]
    fn builtin_has_three_questions() {
        let catalog = ChallengeCatalog::builtin();
        assert_eq!(catalog.intro().topic, "Dubai's real estate market");
        assert_eq!(catalog.intro().duration, "2-5 minutes");
        assert_eq!(catalog.questions().len(), 3);
        assert_eq!(catalog.questions()[1].correct_option(), "Downtown Dubai");
        assert!(catalog.questions().iter().all(|q| q.options().len() == 4));
    }

    #[test]
    fn invalid_question_is_reported_by_position() {
        let raw = r#"
            topic = "t"
            duration = "d"

            [[question]]
            prompt = "ok"
            options = ["a", "b"]
            correct_option = "a"

            [[question]]
            prompt = "broken"
            options = ["a", "b"]
            correct_option = "c"
        "#;

        let err = ChallengeCatalog::from_toml_str(raw).unwrap_err();
        match err {
            CatalogError::InvalidQuestion { position, source } => {
                assert_eq!(position, 2);
                assert_eq!(source, QuestionError::CorrectOptionMissing("c".into()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let err = ChallengeCatalog::from_toml_str("topic = \"t\"\nduration = \"d\"\n").unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = ChallengeCatalog::from_toml_str("topic = ").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ChallengeCatalog::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
