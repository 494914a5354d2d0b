//! Deployment descriptor model and topology synthesis for the r8s dev
//! environment.
//!
//! Everything in this crate is pure: no I/O, no processes, no async.

pub mod descriptor;
pub mod error;
pub mod synth;

pub use descriptor::{DeploymentDescriptor, Mount, MountKind, PortMapping, ServiceRole, ServiceSpec};
pub use error::TopologyError;
pub use synth::{TopologyParams, agent_identity, synthesize};
