//! Unit tests for the reminder registry: validation, lifecycle, and the
//! implicit re-enable on set.

use std::sync::Arc;

use revq::locks::ChannelLocks;
use revq::persistence::db;
use revq::reminders::ReminderRegistry;
use revq::AppError;

async fn registry() -> ReminderRegistry {
    let database = db::connect_memory().await.expect("db");
    ReminderRegistry::new(Arc::new(database), ChannelLocks::new())
}

#[tokio::test]
async fn set_stores_an_enabled_configuration() {
    let registry = registry().await;
    let config = registry.set("C1", "0 9 * * *").await.expect("set");

    assert_eq!(config.channel_id, "C1");
    assert_eq!(config.schedule, "0 9 * * *");
    assert!(config.enabled);
}

#[tokio::test]
async fn set_rejects_invalid_expressions_without_storing() {
    let registry = registry().await;

    let err = registry
        .set("C1", "99 9 * * *")
        .await
        .expect_err("bad field");
    assert!(matches!(err, AppError::InvalidCronField(_)), "got {err}");

    let err = registry
        .set("C1", "not a cron")
        .await
        .expect_err("bad syntax");
    assert!(matches!(err, AppError::InvalidCronSyntax(_)), "got {err}");

    let err = registry.get("C1").await.expect_err("nothing stored");
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}

#[tokio::test]
async fn set_overwrites_the_previous_schedule() {
    let registry = registry().await;
    registry.set("C1", "0 9 * * *").await.expect("first");
    let config = registry.set("C1", "30 17 * * 5").await.expect("second");

    assert_eq!(config.schedule, "30 17 * * 5");
    assert!(config.enabled);
}

#[tokio::test]
async fn get_missing_is_not_found() {
    let registry = registry().await;
    let err = registry.get("C1").await.expect_err("must fail");
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}

#[tokio::test]
async fn disable_keeps_the_schedule() {
    let registry = registry().await;
    registry.set("C1", "0 9 * * *").await.expect("set");

    let config = registry.disable("C1").await.expect("disable");
    assert!(!config.enabled);
    assert_eq!(config.schedule, "0 9 * * *");

    // Still present, still disabled.
    let fetched = registry.get("C1").await.expect("get");
    assert!(!fetched.enabled);
}

#[tokio::test]
async fn disable_missing_is_not_found() {
    let registry = registry().await;
    let err = registry.disable("C1").await.expect_err("must fail");
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}

#[tokio::test]
async fn set_after_disable_re_enables() {
    let registry = registry().await;
    registry.set("C1", "0 9 * * *").await.expect("set");
    registry.disable("C1").await.expect("disable");

    let config = registry.set("C1", "0 9 * * *").await.expect("re-set");
    assert!(config.enabled);
}

#[tokio::test]
async fn remove_deletes_the_configuration() {
    let registry = registry().await;
    registry.set("C1", "0 9 * * *").await.expect("set");
    registry.remove("C1").await.expect("remove");

    let err = registry.get("C1").await.expect_err("gone");
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}

#[tokio::test]
async fn remove_missing_is_not_found() {
    let registry = registry().await;
    let err = registry.remove("C1").await.expect_err("must fail");
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}

#[tokio::test]
async fn list_enabled_excludes_disabled_channels() {
    let registry = registry().await;
    registry.set("C1", "0 9 * * *").await.expect("C1");
    registry.set("C2", "0 10 * * *").await.expect("C2");
    registry.disable("C2").await.expect("disable C2");

    let enabled = registry.list_enabled().await.expect("list");
    let channels: Vec<&str> = enabled.iter().map(|c| c.channel_id.as_str()).collect();
    assert_eq!(channels, ["C1"]);
}
