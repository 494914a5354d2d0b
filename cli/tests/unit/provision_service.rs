//! Unit tests for the provision use-case.
//!
//! Every test drives `provision` against a recording runtime and an in-memory
//! filesystem, then checks the journal of effects.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;
use std::time::Duration;

use r8s_dev::application::services::provision::provision;
use r8s_dev::cli::exit_code;
use r8s_dev::domain::{LaunchOptions, LifecycleError, TeardownOutcome};
use r8s_topology::{DeploymentDescriptor, TopologyParams, synthesize};

use crate::helpers::err_output;
use crate::mocks::{CollectingReporter, Event, Journal, MemFs, RecordingRuntime, UpBehaviour, when_raised};

const PROJECT: &str = "r8s-test";

fn artifact() -> PathBuf {
    PathBuf::from("/work/docker-compose.dev.yml")
}

fn opts() -> LaunchOptions {
    LaunchOptions {
        compose_file: artifact(),
        project: PROJECT.to_owned(),
        passthrough: Vec::new(),
        ..LaunchOptions::default()
    }
}

fn three_agents() -> DeploymentDescriptor {
    synthesize(&TopologyParams::new(3, false).unwrap())
}

fn up_event(passthrough: &[&str]) -> Event {
    Event::Up {
        project: PROJECT.to_owned(),
        file: artifact(),
        passthrough: passthrough.iter().map(|s| (*s).to_owned()).collect(),
    }
}

fn lifecycle_error(err: &anyhow::Error) -> &LifecycleError {
    err.downcast_ref::<LifecycleError>()
        .unwrap_or_else(|| panic!("expected LifecycleError, got: {err:#}"))
}

// ── Happy path ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_provision_tears_down_writes_launches_then_removes() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal);
    let runtime = RecordingRuntime::new(&journal);
    let reporter = CollectingReporter::default();

    let report = provision(&runtime, &fs, &reporter, &three_agents(), &opts(), std::future::pending())
        .await
        .expect("provision should succeed");

    assert_eq!(
        journal.events(),
        vec![
            Event::Down(PROJECT.to_owned()),
            Event::Write(artifact()),
            up_event(&[]),
            Event::Remove(artifact()),
        ]
    );
    assert_eq!(report.services, 5);
    assert_eq!(report.teardown, TeardownOutcome::Removed);
    assert!(fs.content(&artifact()).is_none());
}

#[tokio::test]
async fn test_provision_writes_the_rendered_descriptor() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal);
    let runtime = RecordingRuntime::new(&journal);
    let descriptor = three_agents();

    provision(&runtime, &fs, &CollectingReporter::default(), &descriptor, &opts(), std::future::pending())
        .await
        .expect("provision should succeed");

    let written = fs.last_written().expect("descriptor was written");
    assert_eq!(written, descriptor.to_yaml().unwrap());
    assert!(written.starts_with("# Generated by r8s-dev - DO NOT EDIT"));
}

#[tokio::test]
async fn test_provision_forwards_passthrough_arguments() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal);
    let runtime = RecordingRuntime::new(&journal);
    let mut opts = opts();
    opts.passthrough = vec!["--build".to_owned(), "--abort-on-container-exit".to_owned()];

    provision(&runtime, &fs, &CollectingReporter::default(), &three_agents(), &opts, std::future::pending())
        .await
        .expect("provision should succeed");

    assert!(
        journal
            .events()
            .contains(&up_event(&["--build", "--abort-on-container-exit"]))
    );
}

// ── Teardown ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_provision_tolerates_nothing_to_remove() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal);
    let runtime = RecordingRuntime::new(&journal)
        .with_down(|| Ok(err_output(1, b"no resource found to remove for project \"r8s-test\"")));

    let report = provision(&runtime, &fs, &CollectingReporter::default(), &three_agents(), &opts(), std::future::pending())
        .await
        .expect("first run must not fail on empty teardown");

    assert_eq!(report.teardown, TeardownOutcome::NothingToRemove);
    assert!(journal.saw_up());
}

#[tokio::test]
async fn test_provision_teardown_failure_stops_before_launch() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal);
    let runtime = RecordingRuntime::new(&journal).with_down(|| {
        Ok(err_output(
            1,
            b"Cannot connect to the Docker daemon at unix:///var/run/docker.sock",
        ))
    });

    let err = provision(&runtime, &fs, &CollectingReporter::default(), &three_agents(), &opts(), std::future::pending())
        .await
        .expect_err("teardown failure must abort");

    match lifecycle_error(&err) {
        LifecycleError::TeardownFailed(msg) => assert!(msg.contains("Cannot connect"), "got: {msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(journal.events(), vec![Event::Down(PROJECT.to_owned())]);
    assert_eq!(exit_code(&err), 1);
}

#[tokio::test]
async fn test_provision_runtime_spawn_error_propagates() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal);
    let runtime =
        RecordingRuntime::new(&journal).with_down(|| anyhow::bail!("failed to spawn docker"));

    let err = provision(&runtime, &fs, &CollectingReporter::default(), &three_agents(), &opts(), std::future::pending())
        .await
        .expect_err("spawn failure must abort");

    assert!(format!("{err:#}").contains("failed to spawn docker"));
    assert!(!journal.saw_up());
}

#[tokio::test]
async fn test_provision_removes_stale_artifact_when_teardown_fails() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal).with_file(&artifact(), "stale: true\n");
    let runtime =
        RecordingRuntime::new(&journal).with_down(|| Ok(err_output(1, b"permission denied")));

    provision(&runtime, &fs, &CollectingReporter::default(), &three_agents(), &opts(), std::future::pending())
        .await
        .expect_err("teardown failure must abort");

    assert!(fs.content(&artifact()).is_none());
    assert_eq!(journal.events().last(), Some(&Event::Remove(artifact())));
}

// ── Launch ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_provision_launch_failure_forwards_code_and_removes_artifact() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal);
    let runtime = RecordingRuntime::new(&journal).with_up(UpBehaviour::Exit(3));

    let err = provision(&runtime, &fs, &CollectingReporter::default(), &three_agents(), &opts(), std::future::pending())
        .await
        .expect_err("non-zero runtime exit must fail");

    assert_eq!(
        lifecycle_error(&err),
        &LifecycleError::LaunchFailed { code: Some(3) }
    );
    assert_eq!(exit_code(&err), 3);
    assert_eq!(journal.events().last(), Some(&Event::Remove(artifact())));
    assert!(fs.content(&artifact()).is_none());
}

#[tokio::test]
async fn test_provision_write_failure_never_launches() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal).failing_writes();
    let runtime = RecordingRuntime::new(&journal);

    let err = provision(&runtime, &fs, &CollectingReporter::default(), &three_agents(), &opts(), std::future::pending())
        .await
        .expect_err("write failure must abort");

    assert!(format!("{err:#}").contains("writing compose file"), "got: {err:#}");
    assert!(!journal.saw_up());
}

#[tokio::test]
async fn test_provision_rejects_inconsistent_descriptor_before_teardown() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal);
    let runtime = RecordingRuntime::new(&journal);
    let mut descriptor = three_agents();
    let dup = descriptor.services[0].clone();
    descriptor.services.push(dup);

    let err = provision(&runtime, &fs, &CollectingReporter::default(), &descriptor, &opts(), std::future::pending())
        .await
        .expect_err("duplicate service must be rejected");

    assert!(format!("{err:#}").contains("inconsistent"), "got: {err:#}");
    assert!(journal.events().is_empty());
}

// ── Interruption ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_interrupt_during_teardown_skips_everything_else() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal);
    let runtime = RecordingRuntime::new(&journal).with_slow_down(Duration::from_secs(30));

    let err = provision(&runtime, &fs, &CollectingReporter::default(), &three_agents(), &opts(), std::future::ready(()))
        .await
        .expect_err("interrupt must abort");

    assert_eq!(lifecycle_error(&err), &LifecycleError::Interrupted);
    assert!(journal.events().is_empty());
    assert_eq!(exit_code(&err), 130);
}

#[tokio::test]
async fn test_interrupt_before_launch_never_starts_runtime() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal);
    let runtime = RecordingRuntime::new(&journal);

    let err = provision(&runtime, &fs, &CollectingReporter::default(), &three_agents(), &opts(), std::future::ready(()))
        .await
        .expect_err("interrupt must abort");

    assert_eq!(lifecycle_error(&err), &LifecycleError::Interrupted);
    assert_eq!(
        journal.events(),
        vec![
            Event::Down(PROJECT.to_owned()),
            Event::Write(artifact()),
            Event::Remove(artifact()),
        ]
    );
}

#[tokio::test]
async fn test_interrupt_during_launch_waits_for_runtime_then_removes_artifact() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal);
    let runtime =
        RecordingRuntime::new(&journal).with_up(UpBehaviour::RunFor(Duration::from_millis(50)));
    let reporter = CollectingReporter::default();
    let shutdown = when_raised(runtime.launched.clone());

    let err = provision(&runtime, &fs, &reporter, &three_agents(), &opts(), shutdown)
        .await
        .expect_err("interrupt must abort");

    assert_eq!(lifecycle_error(&err), &LifecycleError::Interrupted);
    assert_eq!(
        journal.events(),
        vec![
            Event::Down(PROJECT.to_owned()),
            Event::Write(artifact()),
            up_event(&[]),
            Event::Remove(artifact()),
        ]
    );
    assert!(
        reporter
            .messages
            .borrow()
            .iter()
            .any(|m| m.starts_with("warn: interrupted"))
    );
}

#[tokio::test]
async fn test_interrupt_during_launch_kills_runtime_that_ignores_it() {
    let journal = Journal::default();
    let fs = MemFs::new(&journal);
    let runtime =
        RecordingRuntime::new(&journal).with_up(UpBehaviour::RunFor(Duration::from_secs(60)));
    let reporter = CollectingReporter::default();
    let shutdown = when_raised(runtime.launched.clone());
    let opts = LaunchOptions {
        stop_timeout: Duration::from_millis(50),
        ..opts()
    };

    let err = tokio::time::timeout(
        Duration::from_secs(10),
        provision(&runtime, &fs, &reporter, &three_agents(), &opts, shutdown),
    )
    .await
    .expect("provision must not wait for a runtime that ignores the interrupt")
    .expect_err("interrupt must abort");

    assert_eq!(lifecycle_error(&err), &LifecycleError::Interrupted);
    assert_eq!(exit_code(&err), 130);
    assert_eq!(
        journal.events(),
        vec![
            Event::Down(PROJECT.to_owned()),
            Event::Write(artifact()),
            up_event(&[]),
            Event::Killed,
            Event::Remove(artifact()),
        ]
    );
    assert!(fs.content(&artifact()).is_none());
    assert!(
        reporter
            .messages
            .borrow()
            .iter()
            .any(|m| m.contains("killing it"))
    );
}
