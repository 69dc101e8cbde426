//! End-to-end dispatcher flows: parsed text commands through the core to
//! rendered replies.

use revq::slack::commands::{parse, Command};
use revq::slack::handlers::handle_command;

use super::test_helpers::test_state;

const MR_URL: &str = "http://gitlab.example.com/group/monorepo/-/merge_requests/120";

fn command(text: &str) -> Command {
    parse(text).expect("recognized").expect("well-formed")
}

#[tokio::test]
async fn add_assign_done_lifecycle() {
    let (state, _outbox) = test_state().await;

    // Queue with no assignee.
    let reply = handle_command(
        &state,
        "C1",
        "@sam",
        command(&format!("!wadd {MR_URL}")),
    )
    .await;
    assert!(reply.contains("[#1]"), "{reply}");
    assert!(reply.contains("monorepo/merge_requests/120"), "{reply}");
    assert!(reply.contains("(by @sam)"), "{reply}");

    // Replace assignees by sequence number.
    let reply = handle_command(&state, "C1", "@sam", command("!wassign 1 @alice @bob")).await;
    assert!(reply.contains("@alice @bob"), "{reply}");

    let tasks = state.queue.list("C1").await.expect("list");
    assert_eq!(tasks[0].task.assignees, ["@alice", "@bob"]);

    // Remove by hash reference; submitter is preserved in the reply.
    let reply = handle_command(&state, "C1", "@kim", command("!wdone #1")).await;
    assert!(reply.contains("Removed"), "{reply}");
    assert!(reply.contains("(added by @sam)"), "{reply}");

    assert!(!state.queue.has_pending("C1").await.expect("has_pending"));
    let reply = handle_command(&state, "C1", "@kim", command("!w")).await;
    assert_eq!(reply, "No tasks in the queue.");
}

#[tokio::test]
async fn duplicate_add_reports_the_reason() {
    let (state, _outbox) = test_state().await;

    handle_command(&state, "C1", "@sam", command(&format!("!wadd {MR_URL}"))).await;
    let reply = handle_command(&state, "C1", "@kim", command(&format!("!wadd {MR_URL}"))).await;
    assert!(reply.contains("already queued"), "{reply}");

    // The same request is fine in another channel.
    let reply = handle_command(&state, "C2", "@kim", command(&format!("!wadd {MR_URL}"))).await;
    assert!(reply.contains("[#1]"), "{reply}");
}

#[tokio::test]
async fn bad_url_reports_guidance() {
    let (state, _outbox) = test_state().await;
    let reply = handle_command(
        &state,
        "C1",
        "@sam",
        command("!wadd https://example.com/not/a/review"),
    )
    .await;
    assert!(reply.contains("Invalid URL"), "{reply}");
}

#[tokio::test]
async fn done_with_unknown_reference_reports_not_found() {
    let (state, _outbox) = test_state().await;
    let reply = handle_command(&state, "C1", "@sam", command("!wdone 3")).await;
    assert!(reply.contains("no task at position 3"), "{reply}");
}

#[tokio::test]
async fn reminder_lifecycle_via_commands() {
    let (state, _outbox) = test_state().await;

    // No configuration yet.
    let reply = handle_command(&state, "C1", "@sam", command("!wreminder")).await;
    assert!(reply.contains("no reminder configured"), "{reply}");

    // Set; reply carries schedule and next fire time.
    let reply = handle_command(&state, "C1", "@sam", command("!wreminder set 0 9 * * 1-5")).await;
    assert!(reply.contains("`0 9 * * 1-5`"), "{reply}");
    assert!(reply.contains("next:"), "{reply}");

    // Show.
    let reply = handle_command(&state, "C1", "@sam", command("!wreminder show")).await;
    assert!(reply.contains("enabled"), "{reply}");

    // Off keeps the schedule.
    let reply = handle_command(&state, "C1", "@sam", command("!wreminder off")).await;
    assert!(reply.contains("off"), "{reply}");
    assert!(reply.contains("`0 9 * * 1-5`"), "{reply}");

    // Remove deletes it.
    let reply = handle_command(&state, "C1", "@sam", command("!wreminder remove")).await;
    assert!(reply.contains("removed"), "{reply}");
    let reply = handle_command(&state, "C1", "@sam", command("!wreminder")).await;
    assert!(reply.contains("no reminder configured"), "{reply}");
}

#[tokio::test]
async fn invalid_cron_expression_reports_the_field() {
    let (state, _outbox) = test_state().await;
    let reply = handle_command(&state, "C1", "@sam", command("!wreminder set 99 9 * * *")).await;
    assert!(reply.contains("minute"), "{reply}");
}

#[tokio::test]
async fn help_lists_the_surface() {
    let (state, _outbox) = test_state().await;
    let reply = handle_command(&state, "C1", "@sam", command("!whelp")).await;
    assert!(reply.contains("!wadd"), "{reply}");
    assert!(reply.contains("!wreminder"), "{reply}");
}
