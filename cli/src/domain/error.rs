//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Parameter errors ──────────────────────────────────────────────────────────

/// Rejected invocation parameters. Raised before anything touches the runtime.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("replica count must be a whole number, got '{0}'")]
    NotANumber(String),

    #[error("replica count must be at least 1, got {0}")]
    NotPositive(String),

    #[error("replica count {got} is too large (max {max})")]
    TooLarge { got: String, max: u16 },

    #[error("invalid project name '{0}': must match ^[a-z0-9][a-z0-9_-]*$")]
    InvalidProject(String),
}

// ── Lifecycle errors ──────────────────────────────────────────────────────────

/// Failures of the teardown → write → launch cycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("tearing down the previous topology failed:\n{0}")]
    TeardownFailed(String),

    #[error("container runtime exited with {}", describe_code(*.code))]
    LaunchFailed { code: Option<i32> },

    #[error("interrupted")]
    Interrupted,
}

impl LifecycleError {
    /// Exit status the process should end with for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::LaunchFailed { code: Some(code) } if *code != 0 => *code,
            Self::Interrupted => 130,
            _ => 1,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    code.map_or_else(|| "no status (killed by signal)".to_string(), |c| format!("status {c}"))
}
