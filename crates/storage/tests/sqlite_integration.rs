use challenge_core::model::StreakState;
use chrono::NaiveDate;
use storage::repository::{
    DAILY_STREAK_KEY, KeyValueRepository, LAST_COMPLETION_DATE_KEY, Storage, StreakRecord,
};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_roundtrips_streak_record() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_streak_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let record = StreakRecord::from_state(&StreakState::new(12, Some(date)));
    repo.set_many(&record.entries()).await.unwrap();

    assert_eq!(
        repo.get(DAILY_STREAK_KEY).await.unwrap().as_deref(),
        Some("12")
    );
    assert_eq!(
        repo.get(LAST_COMPLETION_DATE_KEY).await.unwrap().as_deref(),
        Some("2026-10-18")
    );

    let loaded = StreakRecord {
        daily_streak: repo.get(DAILY_STREAK_KEY).await.unwrap(),
        last_completion_date: repo.get(LAST_COMPLETION_DATE_KEY).await.unwrap(),
    };
    assert_eq!(loaded.into_state(), StreakState::new(12, Some(date)));
}

#[tokio::test]
async fn sqlite_upsert_replaces_existing_value() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.set_many(&[(DAILY_STREAK_KEY, "1".to_owned())])
        .await
        .unwrap();
    repo.set_many(&[(DAILY_STREAK_KEY, "2".to_owned())])
        .await
        .unwrap();

    assert_eq!(
        repo.get(DAILY_STREAK_KEY).await.unwrap().as_deref(),
        Some("2")
    );
    assert_eq!(repo.get("missing").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate_twice?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn storage_sqlite_exposes_key_values() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage_facade?mode=memory&cache=shared")
        .await
        .expect("storage");

    storage
        .key_values
        .set_many(&[(LAST_COMPLETION_DATE_KEY, "2026-10-17".to_owned())])
        .await
        .unwrap();

    assert_eq!(
        storage
            .key_values
            .get(LAST_COMPLETION_DATE_KEY)
            .await
            .unwrap()
            .as_deref(),
        Some("2026-10-17")
    );
}
