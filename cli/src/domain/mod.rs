//! Domain layer: pure parameter handling, configuration and outcome rules.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod params;
pub mod teardown;

pub use config::{DevConfig, LaunchOptions};
pub use error::{LifecycleError, ParamError};
pub use params::{parse_replicas, validate_project_name};
pub use teardown::{TeardownOutcome, classify_teardown};
