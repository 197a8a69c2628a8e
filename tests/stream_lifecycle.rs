//! Lifecycle tests driving create → deliver against a local bare origin.
//!
//! These tests exercise the full delivery state machine: first delivery
//! (tracking branch creation, rebase, reset, squash commit, push) and
//! subsequent merge-forward deliveries, plus the validation failures around
//! them.

use std::fs;

use git_stream::context::StreamContext;
use git_stream::create::{CreateOptions, create_stream};
use git_stream::deliver::{DeliverOptions, DeliveryKind, deliver_stream};
use git_stream::test_support::{TestRepo, configure_identity, run_git};

/// Create a stream with a delivery branch and one pushed commit of work.
fn stream_with_work(repo: &TestRepo) -> git_stream::create::CreateOutcome {
    repo.write_stream_config(&repo.base_config()).expect("config");
    let opts = CreateOptions {
        ticket: Some("T1".to_string()),
        ..CreateOptions::default()
    };
    let outcome =
        create_stream(&repo.config_path(), "fix", &repo.repo_arg(), &opts).expect("create");
    configure_identity(&outcome.root).expect("identity");

    fs::write(outcome.root.join("fix.txt"), "fix\n").expect("write fix.txt");
    run_git(&outcome.root, &["add", "--all"]).expect("add");
    run_git(&outcome.root, &["commit", "-m", "work on fix"]).expect("commit");
    run_git(&outcome.root, &["push", "origin", "dev/fix"]).expect("push stream branch");
    outcome
}

/// First delivery: the delivery branch is created from the parent tip and
/// seeded with a single squashed commit, pushed with its upstream set.
#[test]
fn first_delivery_creates_and_seeds_delivery_branch() {
    let repo = TestRepo::new("scratch").expect("repo");
    let outcome = stream_with_work(&repo);

    let ctx = StreamContext::open(&outcome.root, &repo.config_path()).expect("open");
    let kind =
        deliver_stream(&ctx, "deliver fix", &DeliverOptions::default()).expect("deliver");
    assert_eq!(kind, DeliveryKind::First);

    // Delivery leaves the stream branch checked out.
    assert_eq!(ctx.git.current_branch().expect("branch"), "dev/fix");

    // The delivery branch exists on the remote and carries exactly one
    // squashed commit on top of the parent tip.
    run_git(&repo.origin_dir(), &["show-ref", "--verify", "refs/heads/T1_fix"])
        .expect("delivery branch on origin");
    let subjects = run_git(
        &outcome.root,
        &["log", "--format=%s", "origin/main..T1_fix"],
    )
    .expect("log");
    assert_eq!(subjects, "deliver fix");
}

/// Second delivery of the same stream merges forward instead of recreating
/// the delivery branch.
#[test]
fn subsequent_delivery_merges_forward() {
    let repo = TestRepo::new("scratch").expect("repo");
    let outcome = stream_with_work(&repo);

    let ctx = StreamContext::open(&outcome.root, &repo.config_path()).expect("open");
    deliver_stream(&ctx, "deliver fix", &DeliverOptions::default()).expect("first deliver");

    fs::write(outcome.root.join("more.txt"), "more\n").expect("write more.txt");
    run_git(&outcome.root, &["add", "--all"]).expect("add");
    run_git(&outcome.root, &["commit", "-m", "more work"]).expect("commit");

    let kind =
        deliver_stream(&ctx, "deliver more", &DeliverOptions::default()).expect("second deliver");
    assert_eq!(kind, DeliveryKind::MergeForward);

    assert_eq!(ctx.git.current_branch().expect("branch"), "dev/fix");
    let contents =
        run_git(&outcome.root, &["show", "T1_fix:more.txt"]).expect("file on delivery branch");
    assert_eq!(contents, "more");
}

/// A stream with no changes beyond the parent tip has nothing to deliver.
#[test]
fn delivery_without_changes_fails() {
    let repo = TestRepo::new("scratch").expect("repo");
    repo.write_stream_config(&repo.base_config()).expect("config");
    let opts = CreateOptions {
        ticket: Some("T1".to_string()),
        ..CreateOptions::default()
    };
    let outcome =
        create_stream(&repo.config_path(), "fix", &repo.repo_arg(), &opts).expect("create");
    configure_identity(&outcome.root).expect("identity");
    run_git(&outcome.root, &["push", "origin", "dev/fix"]).expect("push stream branch");

    let ctx = StreamContext::open(&outcome.root, &repo.config_path()).expect("open");
    let err = deliver_stream(&ctx, "deliver fix", &DeliverOptions::default())
        .expect_err("deliver should fail");
    assert!(err.to_string().contains("There are no changes to deliver"));
}

/// A stream created without ticket or explicit delivery branch cannot
/// deliver until one is set.
#[test]
fn delivery_requires_a_delivery_branch() {
    let repo = TestRepo::new("scratch").expect("repo");
    repo.write_stream_config(&repo.base_config()).expect("config");
    let outcome = create_stream(
        &repo.config_path(),
        "fix",
        &repo.repo_arg(),
        &CreateOptions::default(),
    )
    .expect("create");
    configure_identity(&outcome.root).expect("identity");

    let ctx = StreamContext::open(&outcome.root, &repo.config_path()).expect("open");
    let err = deliver_stream(&ctx, "deliver fix", &DeliverOptions::default())
        .expect_err("deliver should fail");
    assert!(
        err.to_string()
            .contains("No delivery branch set for this stream.")
    );
}

/// Delivery refuses to run once the parent list has been emptied.
#[test]
fn delivery_requires_at_least_one_parent() {
    let repo = TestRepo::new("scratch").expect("repo");
    let outcome = stream_with_work(&repo);

    let mut ctx = StreamContext::open(&outcome.root, &repo.config_path()).expect("open");
    ctx.rm_parent("main").expect("remove only parent");

    let err = deliver_stream(&ctx, "deliver fix", &DeliverOptions::default())
        .expect_err("deliver should fail");
    assert!(err.to_string().contains("No parents defined for this stream."));
}

/// Pull requests are only supported for GitHub-hosted repositories.
#[test]
fn create_pr_rejects_non_github_repo() {
    let repo = TestRepo::new("scratch").expect("repo");
    let outcome = stream_with_work(&repo);

    let ctx = StreamContext::open(&outcome.root, &repo.config_path()).expect("open");
    let err = deliver_stream(&ctx, "deliver fix", &DeliverOptions { create_pr: true })
        .expect_err("deliver should fail");
    assert!(
        err.to_string()
            .contains("Unable to create PR for non-GitHub repo.")
    );
}
