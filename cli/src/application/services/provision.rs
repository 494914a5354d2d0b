//! Application service: provision use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.
//!
//! Order is fixed: guard the artifact path, tear down, write, launch. The
//! guard is created first so the file is removed on every way out.

use anyhow::{Context, Result};
use r8s_topology::DeploymentDescriptor;

use crate::application::artifact::ArtifactGuard;
use crate::application::ports::{ComposeRuntime, LocalFs, ProgressReporter};
use crate::domain::config::LaunchOptions;
use crate::domain::error::LifecycleError;
use crate::domain::teardown::{TeardownOutcome, classify_teardown};

/// Result of a successful `provision` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Number of services handed to the runtime.
    pub services: usize,
    /// What the teardown step found.
    pub teardown: TeardownOutcome,
}

/// Tear down any previous topology, write `descriptor` and launch it.
///
/// `shutdown` resolves when the process is asked to stop. Before launch it
/// aborts the run. During launch the runtime gets `opts.stop_timeout` to
/// exit on its own and is killed after that. Either way the artifact is
/// removed before this returns.
///
/// # Errors
///
/// Returns an error if the descriptor is inconsistent, teardown fails for a
/// reason other than "nothing to remove", the file cannot be written, the
/// runtime exits non-zero ([`LifecycleError::LaunchFailed`]) or the run is
/// interrupted ([`LifecycleError::Interrupted`]).
pub async fn provision<S>(
    runtime: &impl ComposeRuntime,
    fs: &impl LocalFs,
    reporter: &impl ProgressReporter,
    descriptor: &DeploymentDescriptor,
    opts: &LaunchOptions,
    shutdown: S,
) -> Result<ProvisionReport>
where
    S: Future<Output = ()>,
{
    let artifact = ArtifactGuard::acquire(fs, &opts.compose_file);
    tokio::pin!(shutdown);

    descriptor
        .validate()
        .context("synthesized topology is inconsistent")?;

    // Step 1: Tear down whatever the previous run left behind.
    reporter.step(&format!("tearing down previous '{}' topology...", opts.project));
    let teardown = tokio::select! {
        biased;
        outcome = run_teardown(runtime, &opts.project) => outcome?,
        () = &mut shutdown => return Err(LifecycleError::Interrupted.into()),
    };
    match teardown {
        TeardownOutcome::NothingToRemove => reporter.success("no previous topology to remove"),
        _ => reporter.success("previous topology removed"),
    }

    // Step 2: Write the descriptor.
    let yaml = descriptor.to_yaml()?;
    artifact.write(&yaml)?;
    reporter.success(&format!("wrote {}", artifact.path().display()));

    // Step 3: Last chance to stop before the runtime takes the terminal.
    tokio::select! {
        biased;
        () = &mut shutdown => return Err(LifecycleError::Interrupted.into()),
        () = std::future::ready(()) => {}
    }

    // Step 4: Launch. Blocks for as long as the runtime stays attached.
    reporter.success(&format!(
        "launching {} services as '{}'",
        descriptor.services.len(),
        opts.project
    ));
    let mut up = Box::pin(runtime.up(&opts.project, artifact.path(), &opts.passthrough));
    let status = tokio::select! {
        biased;
        status = &mut up => status.context("launching topology")?,
        () = &mut shutdown => {
            reporter.warn("interrupted, waiting for the container runtime to exit...");
            match tokio::time::timeout(opts.stop_timeout, &mut up).await {
                Ok(Err(e)) => tracing::debug!(error = %e, "runtime failed after interrupt"),
                Ok(Ok(status)) => tracing::debug!(%status, "runtime exited after interrupt"),
                Err(_) => {
                    reporter.warn(&format!(
                        "container runtime still running after {}s, killing it",
                        opts.stop_timeout.as_secs()
                    ));
                    // Dropping the pending launch kills the runtime child.
                    drop(up);
                }
            }
            return Err(LifecycleError::Interrupted.into());
        }
    };

    if !status.success() {
        return Err(LifecycleError::LaunchFailed {
            code: status.code(),
        }
        .into());
    }

    Ok(ProvisionReport {
        services: descriptor.services.len(),
        teardown,
    })
}

/// Run `down` once and classify the result.
async fn run_teardown(runtime: &impl ComposeRuntime, project: &str) -> Result<TeardownOutcome> {
    let output = runtime
        .down(project)
        .await
        .context("tearing down previous topology")?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    match classify_teardown(output.status.success(), &stderr) {
        TeardownOutcome::Failed(msg) => Err(LifecycleError::TeardownFailed(msg).into()),
        outcome => {
            tracing::debug!(?outcome, project, "teardown finished");
            Ok(outcome)
        }
    }
}
