//! Unit tests for `ReminderRepo` upsert semantics.

use std::sync::Arc;

use revq::persistence::{db, reminder_repo::ReminderRepo};

#[tokio::test]
async fn upsert_preserves_created_at_on_overwrite() {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    let repo = ReminderRepo::new(database);

    let first = repo.upsert("C1", "0 9 * * *").await.expect("first");
    let second = repo.upsert("C1", "0 18 * * *").await.expect("second");

    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(second.schedule, "0 18 * * *");
    assert!(second.enabled);
}

#[tokio::test]
async fn set_enabled_reports_missing_rows() {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    let repo = ReminderRepo::new(database);

    assert!(!repo.set_enabled("C1", false).await.expect("missing"));

    repo.upsert("C1", "0 9 * * *").await.expect("upsert");
    assert!(repo.set_enabled("C1", false).await.expect("present"));

    let config = repo.get("C1").await.expect("get").expect("present");
    assert!(!config.enabled);
}

#[tokio::test]
async fn delete_reports_whether_a_row_existed() {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    let repo = ReminderRepo::new(database);

    assert!(!repo.delete("C1").await.expect("missing"));
    repo.upsert("C1", "0 9 * * *").await.expect("upsert");
    assert!(repo.delete("C1").await.expect("present"));
    assert!(repo.get("C1").await.expect("get").is_none());
}
