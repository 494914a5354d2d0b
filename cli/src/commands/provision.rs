//! Provision command: synthesize the topology and drive its lifecycle.

use anyhow::Result;
use r8s_topology::{ServiceSpec, synthesize};

use crate::application::services::provision::provision;
use crate::domain::config::DevConfig;
use crate::infra::compose::DockerCompose;
use crate::infra::fs::HostFs;
use crate::infra::signal::shutdown_signal;
use crate::output::{OutputContext, TerminalReporter};

/// Entry point for `r8s-dev`.
///
/// # Errors
///
/// Returns an error if rendering, teardown, writing or launch fails, or if
/// the run is interrupted.
pub async fn run(ctx: &OutputContext, config: &DevConfig) -> Result<()> {
    let descriptor = synthesize(&config.topology);

    if config.dry_run {
        print!("{}", descriptor.to_yaml()?);
        return Ok(());
    }

    ctx.header(&format!("r8s-dev: {}", config.launch.project));
    for spec in &descriptor.services {
        ctx.kv(&format!("{:<16}", spec.name), &format_endpoint(spec));
    }

    let runtime = DockerCompose::with_program(&config.runtime);
    let reporter = TerminalReporter::new(ctx);
    let report = provision(
        &runtime,
        &HostFs,
        &reporter,
        &descriptor,
        &config.launch,
        shutdown_signal(),
    )
    .await?;
    drop(reporter);

    tracing::info!(services = report.services, teardown = ?report.teardown, "topology exited");
    ctx.success("topology exited cleanly");
    Ok(())
}

/// One-line summary of where a service is reachable.
///
/// Returns `"localhost:<port>  (<image>)"`, or just the image when the
/// service publishes nothing.
#[must_use]
pub fn format_endpoint(spec: &ServiceSpec) -> String {
    match spec.published_port() {
        Some(port) => format!("localhost:{port}  ({})", spec.image),
        None => spec.image.clone(),
    }
}
