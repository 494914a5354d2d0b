//! Infrastructure implementation of the `ComposeRuntime` port.
//!
//! `DockerCompose<R>` routes every `<runtime> compose` invocation through a
//! `CommandRunner`, so tests can inject a mock runner without spawning
//! real processes.

use std::path::Path;
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ComposeRuntime};
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};

/// Adapter for any runtime exposing a docker-compatible `compose` subcommand
/// (`docker`, `podman`, ...).
pub struct DockerCompose<R: CommandRunner> {
    runner: R,
    program: String,
    down_timeout: Duration,
}

impl<R: CommandRunner> DockerCompose<R> {
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            down_timeout: DEFAULT_CMD_TIMEOUT,
        }
    }

    /// Override the timeout applied to `compose down`.
    #[must_use]
    pub fn with_down_timeout(mut self, timeout: Duration) -> Self {
        self.down_timeout = timeout;
        self
    }
}

impl DockerCompose<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn with_program(program: &str) -> Self {
        Self::new(TokioCommandRunner, program)
    }
}

impl<R: CommandRunner> ComposeRuntime for DockerCompose<R> {
    async fn down(&self, project: &str) -> Result<Output> {
        self.runner
            .run_with_timeout(
                &self.program,
                &["compose", "-p", project, "down", "--remove-orphans"],
                self.down_timeout,
            )
            .await
            .with_context(|| format!("{} compose down", self.program))
    }

    async fn up(
        &self,
        project: &str,
        compose_file: &Path,
        passthrough: &[String],
    ) -> Result<ExitStatus> {
        let file = compose_file.to_string_lossy();
        let mut args = vec!["compose", "-p", project, "-f", file.as_ref(), "up"];
        args.extend(passthrough.iter().map(String::as_str));
        self.runner
            .run_status(&self.program, &args)
            .await
            .with_context(|| format!("{} compose up", self.program))
    }
}
