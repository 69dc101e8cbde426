//! Unit tests for the queue store: uniqueness, renumbering, reference
//! resolution, and assignee replacement.

use std::sync::Arc;

use revq::locks::ChannelLocks;
use revq::persistence::db;
use revq::queue::QueueStore;
use revq::AppError;

async fn store() -> QueueStore {
    let database = db::connect_memory().await.expect("db");
    QueueStore::new(Arc::new(database), ChannelLocks::new())
}

fn gh(repo: &str, n: u32) -> String {
    format!("https://github.com/owner/{repo}/pull/{n}")
}

fn handles(list: &[&str]) -> Vec<String> {
    list.iter().map(|h| (*h).to_owned()).collect()
}

#[tokio::test]
async fn add_returns_first_sequence_number() {
    let store = store().await;
    let queued = store
        .add(
            "C1",
            "http://gitlab.example.com/group/monorepo/-/merge_requests/120",
            vec![],
            "@sam",
        )
        .await
        .expect("add");

    assert_eq!(queued.seq_no, 1);
    assert_eq!(queued.task.task_id, "monorepo/merge_requests/120");
    assert_eq!(
        queued.task.source_url,
        "http://gitlab.example.com/group/monorepo/-/merge_requests/120"
    );
    assert_eq!(queued.task.created_by, "@sam");
    assert!(queued.task.assignees.is_empty());
}

#[tokio::test]
async fn duplicate_in_same_channel_is_rejected() {
    let store = store().await;
    store
        .add("C1", &gh("repo", 1), vec![], "@sam")
        .await
        .expect("first add");

    let err = store
        .add("C1", &gh("repo", 1), vec![], "@kim")
        .await
        .expect_err("second add must fail");
    assert!(matches!(err, AppError::DuplicateTask(_)), "got {err}");
}

#[tokio::test]
async fn same_task_in_another_channel_is_independent() {
    let store = store().await;
    store
        .add("C1", &gh("repo", 1), vec![], "@sam")
        .await
        .expect("add in C1");
    let queued = store
        .add("C2", &gh("repo", 1), vec![], "@sam")
        .await
        .expect("add in C2");
    assert_eq!(queued.seq_no, 1);
}

#[tokio::test]
async fn removal_renumbers_the_listing() {
    let store = store().await;
    store
        .add("C1", &gh("a", 1), vec![], "@sam")
        .await
        .expect("a");
    store
        .add("C1", &gh("b", 2), vec![], "@sam")
        .await
        .expect("b");
    store
        .add("C1", &gh("c", 3), vec![], "@sam")
        .await
        .expect("c");

    store.remove("C1", "2").await.expect("remove b");

    let tasks = store.list("C1").await.expect("list");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].seq_no, 1);
    assert_eq!(tasks[0].task.task_id, "a/pull/1");
    assert_eq!(tasks[1].seq_no, 2);
    assert_eq!(tasks[1].task.task_id, "c/pull/3");
}

#[tokio::test]
async fn bare_and_hash_references_resolve_identically() {
    let store = store().await;
    store
        .add("C1", &gh("a", 1), vec![], "@sam")
        .await
        .expect("a");
    store
        .add("C1", &gh("b", 2), vec![], "@sam")
        .await
        .expect("b");

    let bare = store.resolve_reference("C1", "2").await.expect("bare");
    let hashed = store.resolve_reference("C1", "#2").await.expect("hashed");
    assert_eq!(bare, hashed);
    assert_eq!(bare.task.task_id, "b/pull/2");
}

#[tokio::test]
async fn literal_task_id_reference_resolves() {
    let store = store().await;
    store
        .add("C1", &gh("a", 1), vec![], "@sam")
        .await
        .expect("a");
    store
        .add("C1", &gh("b", 2), vec![], "@sam")
        .await
        .expect("b");

    let queued = store
        .resolve_reference("C1", "b/pull/2")
        .await
        .expect("by id");
    assert_eq!(queued.seq_no, 2);
}

#[tokio::test]
async fn out_of_range_sequence_is_not_found() {
    let store = store().await;
    store
        .add("C1", &gh("a", 1), vec![], "@sam")
        .await
        .expect("a");

    for reference in ["0", "2", "#9"] {
        let err = store
            .resolve_reference("C1", reference)
            .await
            .expect_err("must fail");
        assert!(matches!(err, AppError::NotFound(_)), "{reference}: {err}");
    }
}

#[tokio::test]
async fn unknown_literal_id_is_not_found() {
    let store = store().await;
    let err = store
        .resolve_reference("C1", "ghost/pull/1")
        .await
        .expect_err("must fail");
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}

#[tokio::test]
async fn assign_replaces_the_whole_set() {
    let store = store().await;
    store
        .add("C1", &gh("a", 1), handles(&["@old"]), "@sam")
        .await
        .expect("add");

    let queued = store
        .assign("C1", "1", handles(&["@alice", "@bob"]))
        .await
        .expect("assign");
    assert_eq!(queued.task.assignees, handles(&["@alice", "@bob"]));

    let tasks = store.list("C1").await.expect("list");
    assert_eq!(tasks[0].task.assignees, handles(&["@alice", "@bob"]));
}

#[tokio::test]
async fn assign_empty_clears_all_assignees() {
    let store = store().await;
    store
        .add("C1", &gh("a", 1), handles(&["@alice", "@bob"]), "@sam")
        .await
        .expect("add");

    store.assign("C1", "1", vec![]).await.expect("clear");

    let tasks = store.list("C1").await.expect("list");
    assert!(tasks[0].task.assignees.is_empty());
}

#[tokio::test]
async fn assignees_are_sorted_and_deduplicated() {
    let store = store().await;
    let queued = store
        .add(
            "C1",
            &gh("a", 1),
            handles(&["@bob", "@alice", "@bob"]),
            "@sam",
        )
        .await
        .expect("add");
    assert_eq!(queued.task.assignees, handles(&["@alice", "@bob"]));
}

#[tokio::test]
async fn assign_bad_reference_is_not_found() {
    let store = store().await;
    let err = store
        .assign("C1", "1", handles(&["@alice"]))
        .await
        .expect_err("must fail");
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}

#[tokio::test]
async fn remove_returns_the_task_and_empties_the_queue() {
    let store = store().await;
    store
        .add("C1", &gh("a", 1), handles(&["@alice"]), "@sam")
        .await
        .expect("add");

    let removed = store.remove("C1", "#1").await.expect("remove");
    assert_eq!(removed.task.created_by, "@sam");
    assert_eq!(removed.seq_no, 1);

    assert!(store.list("C1").await.expect("list").is_empty());
    assert!(!store.has_pending("C1").await.expect("has_pending"));
}

#[tokio::test]
async fn has_pending_tracks_queue_contents() {
    let store = store().await;
    assert!(!store.has_pending("C1").await.expect("empty"));

    store
        .add("C1", &gh("a", 1), vec![], "@sam")
        .await
        .expect("add");
    assert!(store.has_pending("C1").await.expect("non-empty"));
    assert!(!store.has_pending("C2").await.expect("other channel"));
}

#[tokio::test]
async fn list_is_fresh_on_every_call() {
    let store = store().await;
    store
        .add("C1", &gh("a", 1), vec![], "@sam")
        .await
        .expect("a");

    let first = store.list("C1").await.expect("first");
    store
        .add("C1", &gh("b", 2), vec![], "@sam")
        .await
        .expect("b");
    let second = store.list("C1").await.expect("second");

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 2);
}
