//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `std` and `anyhow`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program attached to the terminal and return only its exit status.
    ///
    /// No timeout: the caller's lifetime is tied to the child's, and dropping
    /// the returned future must kill the child.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

// ── Container Runtime Port ────────────────────────────────────────────────────

/// The two container runtime operations the lifecycle driver needs.
#[allow(async_fn_in_trait)]
pub trait ComposeRuntime {
    /// Remove every container and network of `project`. Captures output so
    /// the caller can tell "nothing to remove" apart from a real failure.
    async fn down(&self, project: &str) -> Result<Output>;
    /// Realise `compose_file` as `project`, appending `passthrough` verbatim.
    /// Blocks until the runtime exits.
    async fn up(&self, project: &str, compose_file: &Path, passthrough: &[String])
    -> Result<ExitStatus>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// The local file operations needed for the transient descriptor.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    /// Create or truncate `path` with `content`.
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
