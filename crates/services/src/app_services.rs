use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::catalog::ChallengeCatalog;
use crate::challenge::DailyChallengeService;
use crate::error::AppServicesError;
use crate::streak_store::StreakStore;

/// Assembles app-facing services around one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<ChallengeCatalog>,
    challenge: Arc<DailyChallengeService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: ChallengeCatalog,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, catalog))
    }

    /// Build services over volatile in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock, catalog: ChallengeCatalog) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, catalog)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, catalog: ChallengeCatalog) -> Self {
        let streaks = StreakStore::new(Arc::clone(&storage.key_values));
        let challenge = Arc::new(DailyChallengeService::new(clock, streaks));
        Self {
            catalog: Arc::new(catalog),
            challenge,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<ChallengeCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn challenge(&self) -> Arc<DailyChallengeService> {
        Arc::clone(&self.challenge)
    }
}
