use async_trait::async_trait;
use challenge_core::model::{StreakState, format_completion_date, parse_completion_date};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key holding the streak count as a decimal string.
pub const DAILY_STREAK_KEY: &str = "dailyStreak";

/// Key holding the last completion date as `YYYY-MM-DD`.
pub const LAST_COMPLETION_DATE_KEY: &str = "lastCompletionDate";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of the streak: the two raw string values.
///
/// Decoding is lenient. A value that cannot be parsed is treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakRecord {
    pub daily_streak: Option<String>,
    pub last_completion_date: Option<String>,
}

impl StreakRecord {
    #[must_use]
    pub fn from_state(state: &StreakState) -> Self {
        Self {
            daily_streak: Some(state.streak_count().to_string()),
            last_completion_date: state.last_completion_date().map(format_completion_date),
        }
    }

    /// Decode into a `StreakState`, falling back to defaults per field.
    #[must_use]
    pub fn into_state(self) -> StreakState {
        let streak_count = match self.daily_streak.as_deref() {
            None => 0,
            Some(raw) => raw.trim().parse::<u32>().unwrap_or_else(|_| {
                tracing::warn!(
                    key = DAILY_STREAK_KEY,
                    value = raw,
                    "discarding unparsable streak count"
                );
                0
            }),
        };

        let last_completion_date = self
            .last_completion_date
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| {
                let parsed = parse_completion_date(raw);
                if parsed.is_none() {
                    tracing::warn!(
                        key = LAST_COMPLETION_DATE_KEY,
                        value = raw,
                        "discarding unparsable completion date"
                    );
                }
                parsed
            });

        StreakState::new(streak_count, last_completion_date)
    }

    /// Key/value pairs to write. An absent date is stored as an empty string.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                DAILY_STREAK_KEY,
                self.daily_streak.clone().unwrap_or_else(|| "0".to_owned()),
            ),
            (
                LAST_COMPLETION_DATE_KEY,
                self.last_completion_date.clone().unwrap_or_default(),
            ),
        ]
    }
}

/// String key/value persistence, the shape of browser local storage.
#[async_trait]
pub trait KeyValueRepository: Send + Sync {
    /// Fetch the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store every entry, all-or-nothing where the backend supports it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the values cannot be stored.
    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueRepository for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for (key, value) in entries {
            guard.insert((*key).to_owned(), value.clone());
        }
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub key_values: Arc<dyn KeyValueRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let key_values: Arc<dyn KeyValueRepository> = Arc::new(InMemoryRepository::new());
        Self { key_values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn in_memory_overwrites_values() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get(DAILY_STREAK_KEY).await.unwrap(), None);

        repo.set_many(&[(DAILY_STREAK_KEY, "1".into())]).await.unwrap();
        repo.set_many(&[(DAILY_STREAK_KEY, "2".into())]).await.unwrap();

        assert_eq!(repo.get(DAILY_STREAK_KEY).await.unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn record_encodes_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let record = StreakRecord::from_state(&StreakState::new(3, Some(date)));
        assert_eq!(record.daily_streak.as_deref(), Some("3"));
        assert_eq!(record.last_completion_date.as_deref(), Some("2026-10-18"));
        assert_eq!(record.into_state(), StreakState::new(3, Some(date)));
    }

    #[test]
    fn garbage_fields_decode_independently() {
        let record = StreakRecord {
            daily_streak: Some("-4".into()),
            last_completion_date: Some("Sun Oct 18 2026".into()),
        };
        let state = record.into_state();
        assert_eq!(state.streak_count(), 0);
        assert_eq!(state.last_completion_date(), NaiveDate::from_ymd_opt(2026, 10, 18));

        let record = StreakRecord {
            daily_streak: Some("7".into()),
            last_completion_date: Some("yesterday".into()),
        };
        assert_eq!(record.into_state(), StreakState::new(7, None));
    }

    #[test]
    fn empty_record_is_default_state() {
        assert_eq!(StreakRecord::default().into_state(), StreakState::default());
    }
}
