//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use clap::builder::FalseyValueParser;
use r8s_topology::TopologyParams;

use crate::commands;
use crate::domain::config::{
    DEFAULT_COMPOSE_FILE, DEFAULT_PROJECT, DEFAULT_RUNTIME, DEFAULT_STOP_TIMEOUT, DevConfig,
    LaunchOptions,
};
use crate::domain::error::LifecycleError;
use crate::domain::params::{parse_replicas, validate_project_name};
use crate::output::OutputContext;

/// Launch a disposable multi-node r8s topology on the local container runtime
///
/// Any previous topology under the same project is torn down first, and the
/// generated compose file is removed when the run ends.
#[derive(Parser, Debug)]
#[command(name = "r8s-dev", version)]
pub struct Cli {
    /// Number of agent nodes to run (at least 1)
    #[arg(
        short = 'n',
        long,
        env = "R8S_DEV_REPLICAS",
        default_value = "1",
        value_parser = parse_replicas,
        allow_negative_numbers = true
    )]
    pub replicas: u16,

    /// Also run the observability dashboard
    #[arg(
        short = 'o',
        long,
        env = "R8S_DEV_OBSERVABILITY",
        value_parser = FalseyValueParser::new()
    )]
    pub observability: bool,

    /// Where to write the transient compose file
    #[arg(short = 'f', long, env = "R8S_DEV_COMPOSE_FILE", default_value = DEFAULT_COMPOSE_FILE)]
    pub compose_file: PathBuf,

    /// Compose project name shared by teardown and launch
    #[arg(
        short = 'p',
        long,
        env = "R8S_DEV_PROJECT",
        default_value = DEFAULT_PROJECT,
        value_parser = validate_project_name
    )]
    pub project: String,

    /// Container runtime executable (invoked as `<runtime> compose ...`)
    #[arg(long, env = "R8S_DEV_RUNTIME", default_value = DEFAULT_RUNTIME)]
    pub runtime: String,

    /// Seconds to wait for the runtime to exit after an interrupt before killing it
    #[arg(
        long,
        env = "R8S_DEV_STOP_TIMEOUT",
        value_name = "SECS",
        default_value_t = DEFAULT_STOP_TIMEOUT.as_secs()
    )]
    pub stop_timeout: u64,

    /// Print the generated compose file and exit without touching the runtime
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    pub no_color: bool,

    /// Extra arguments passed verbatim to `compose up` (after `--`)
    #[arg(last = true)]
    pub passthrough: Vec<String>,
}

impl Cli {
    /// Resolve flags and environment into a run configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the replica count is outside the supported range.
    pub fn to_config(&self) -> Result<DevConfig> {
        Ok(DevConfig {
            topology: TopologyParams::new(u32::from(self.replicas), self.observability)?,
            launch: LaunchOptions {
                compose_file: self.compose_file.clone(),
                project: self.project.clone(),
                passthrough: self.passthrough.clone(),
                stop_timeout: Duration::from_secs(self.stop_timeout),
            },
            runtime: self.runtime.clone(),
            dry_run: self.dry_run,
        })
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if parameters are invalid or the topology run fails.
    pub async fn run(self) -> Result<()> {
        let config = self.to_config()?;
        let ctx = OutputContext::new(self.no_color, self.quiet);
        commands::provision::run(&ctx, &config).await
    }
}

/// Map a run failure to the process exit status.
///
/// A launch failure forwards the runtime's own code, an interruption exits
/// 130, anything else exits 1.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<LifecycleError>()
        .map_or(1, LifecycleError::exit_code)
}
