//! Unit tests for `TaskRepo` persistence: field round-trips, insertion
//! order, and transactional assignee replacement.

use std::sync::Arc;

use revq::models::task::ReviewTask;
use revq::persistence::{db, task_repo::TaskRepo};

fn sample(channel_id: &str, task_id: &str, assignees: &[&str]) -> ReviewTask {
    ReviewTask::new(
        channel_id.to_owned(),
        task_id.to_owned(),
        format!("https://github.com/owner/{task_id}"),
        assignees.iter().map(|h| (*h).to_owned()).collect(),
        "@sam".to_owned(),
    )
}

#[tokio::test]
async fn insert_round_trips_all_fields() {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(Arc::clone(&database));

    let task = sample("C1", "repo/pull/1", &["@alice"]);
    repo.insert(&task).await.expect("insert");

    let listed = repo.list("C1").await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], task);
}

#[tokio::test]
async fn list_preserves_insertion_order() {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(database);

    for task_id in ["z/pull/1", "a/pull/2", "m/pull/3"] {
        repo.insert(&sample("C1", task_id, &[]))
            .await
            .expect("insert");
    }

    let ids: Vec<String> = repo
        .list("C1")
        .await
        .expect("list")
        .into_iter()
        .map(|t| t.task_id)
        .collect();
    assert_eq!(ids, ["z/pull/1", "a/pull/2", "m/pull/3"]);
}

#[tokio::test]
async fn channels_are_isolated() {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(database);

    repo.insert(&sample("C1", "repo/pull/1", &[]))
        .await
        .expect("insert C1");
    repo.insert(&sample("C2", "repo/pull/1", &[]))
        .await
        .expect("insert C2");

    assert_eq!(repo.list("C1").await.expect("list C1").len(), 1);
    assert_eq!(repo.list("C2").await.expect("list C2").len(), 1);
    assert!(repo.list("C3").await.expect("list C3").is_empty());
}

#[tokio::test]
async fn exists_reports_per_channel_identity() {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(database);

    repo.insert(&sample("C1", "repo/pull/1", &[]))
        .await
        .expect("insert");

    assert!(repo.exists("C1", "repo/pull/1").await.expect("exists"));
    assert!(!repo
        .exists("C2", "repo/pull/1")
        .await
        .expect("other channel"));
    assert!(!repo.exists("C1", "repo/pull/2").await.expect("other task"));
}

#[tokio::test]
async fn replace_assignees_persists_the_new_set() {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(database);

    repo.insert(&sample("C1", "repo/pull/1", &["@old"]))
        .await
        .expect("insert");
    repo.replace_assignees("C1", "repo/pull/1", &["@alice".to_owned(), "@bob".to_owned()])
        .await
        .expect("replace");

    let found = repo
        .find("C1", "repo/pull/1")
        .await
        .expect("find")
        .expect("present");
    assert_eq!(found.assignees, ["@alice", "@bob"]);
}

#[tokio::test]
async fn delete_removes_task_and_assignee_rows() {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(Arc::clone(&database));

    repo.insert(&sample("C1", "repo/pull/1", &["@alice", "@bob"]))
        .await
        .expect("insert");
    repo.delete("C1", "repo/pull/1").await.expect("delete");

    assert!(repo
        .find("C1", "repo/pull/1")
        .await
        .expect("find")
        .is_none());

    let residue: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM task_assignee")
        .fetch_one(database.as_ref())
        .await
        .expect("count");
    assert_eq!(residue, 0);
}

#[tokio::test]
async fn has_any_tracks_channel_contents() {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(database);

    assert!(!repo.has_any("C1").await.expect("empty"));
    repo.insert(&sample("C1", "repo/pull/1", &[]))
        .await
        .expect("insert");
    assert!(repo.has_any("C1").await.expect("non-empty"));
}
