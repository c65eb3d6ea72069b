use sqlx::PgPool;
use std::sync::Arc;
use shortlink_api::domain::entities::NewUrlRecord;
use shortlink_api::domain::repositories::{StorageError, UrlRepository};
use shortlink_api::infrastructure::persistence::PgUrlRepository;

fn new_record(alias: &str, url: &str) -> NewUrlRecord {
    NewUrlRecord {
        original_url: url.to_string(),
        short_alias: alias.to_string(),
    }
}

#[sqlx::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_insert_record(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));

    let record = repo
        .insert(new_record("abc123", "https://example.com"))
        .await
        .unwrap();

    assert_eq!(record.short_alias, "abc123");
    assert_eq!(record.original_url, "https://example.com");
    assert_eq!(record.click_count, 0);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_find_by_alias_and_original_url(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    repo.insert(new_record("abc123", "https://example.com"))
        .await
        .unwrap();

    let by_alias = repo.find_by_alias("abc123").await.unwrap();
    assert_eq!(by_alias.unwrap().original_url, "https://example.com");

    let by_url = repo
        .find_by_original_url("https://example.com")
        .await
        .unwrap();
    assert_eq!(by_url.unwrap().short_alias, "abc123");

    assert!(repo.find_by_alias("missing").await.unwrap().is_none());
    assert!(
        repo.find_by_original_url("https://example.com/other")
            .await
            .unwrap()
            .is_none()
    );
}

#[sqlx::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_insert_duplicate_alias_conflicts(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    repo.insert(new_record("dup123", "https://one.example.com"))
        .await
        .unwrap();

    let err = repo
        .insert(new_record("dup123", "https://two.example.com"))
        .await
        .unwrap_err();

    assert!(err.is_alias_conflict());
    assert!(!err.is_transient());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_insert_duplicate_original_url_conflicts(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    repo.insert(new_record("first1", "https://example.com"))
        .await
        .unwrap();

    let err = repo
        .insert(new_record("second2", "https://example.com"))
        .await
        .unwrap_err();

    assert!(err.is_original_url_conflict());
    assert!(matches!(err, StorageError::Conflict { .. }));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_find_all_newest_first(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    repo.insert(new_record("older1", "https://example.com/1"))
        .await
        .unwrap();
    repo.insert(new_record("newer2", "https://example.com/2"))
        .await
        .unwrap();

    let records = repo.find_all().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].short_alias, "newer2");
    assert_eq!(records[1].short_alias, "older1");
    assert_eq!(repo.count().await.unwrap(), 2);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_delete_by_alias(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    repo.insert(new_record("todelete", "https://example.com"))
        .await
        .unwrap();

    assert!(repo.delete_by_alias("todelete").await.unwrap());
    assert!(!repo.delete_by_alias("todelete").await.unwrap());
    assert!(repo.find_by_alias("todelete").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn test_health_check(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));

    assert!(repo.health_check().await.is_ok());
}
