#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod challenge;
pub mod error;
pub mod streak_store;

pub use challenge_core::Clock;

pub use app_services::AppServices;
pub use catalog::{ChallengeCatalog, ChallengeIntro};
pub use challenge::{AnswerResult, DailyChallenge, DailyChallengeService};
pub use error::{AppServicesError, CatalogError, ChallengeError};
pub use streak_store::StreakStore;
