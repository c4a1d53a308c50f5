//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use challenge_core::model::{QuestionError, QuizError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `DailyChallengeService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChallengeError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while loading a question catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
    #[error("question {position}: {source}")]
    InvalidQuestion {
        position: usize,
        #[source]
        source: QuestionError,
    },
    #[error("catalog has no questions")]
    Empty,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
