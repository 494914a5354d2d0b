//! Resolved run configuration threaded through synthesis and the lifecycle driver.
//!
//! Pure types only. No I/O.

use std::path::PathBuf;
use std::time::Duration;

use r8s_topology::TopologyParams;

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.dev.yml";
pub const DEFAULT_PROJECT: &str = "r8s-dev";
pub const DEFAULT_RUNTIME: &str = "docker";
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);

// ── Config ───────────────────────────────────────────────────────────────────

/// Everything the lifecycle driver needs to realise a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Where the transient descriptor is written. Removed on every exit path.
    pub compose_file: PathBuf,
    /// Compose project name, shared by teardown and launch.
    pub project: String,
    /// Extra arguments appended verbatim to `compose up`.
    pub passthrough: Vec<String>,
    /// How long an interrupted runtime gets to exit before it is killed.
    pub stop_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            compose_file: PathBuf::from(DEFAULT_COMPOSE_FILE),
            project: DEFAULT_PROJECT.to_string(),
            passthrough: Vec::new(),
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }
}

/// One invocation's configuration, built once from flags and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevConfig {
    pub topology: TopologyParams,
    pub launch: LaunchOptions,
    /// Container runtime executable, invoked as `<runtime> compose ...`.
    pub runtime: String,
    /// Print the descriptor instead of running anything.
    pub dry_run: bool,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            topology: TopologyParams::default(),
            launch: LaunchOptions::default(),
            runtime: DEFAULT_RUNTIME.to_string(),
            dry_run: false,
        }
    }
}
