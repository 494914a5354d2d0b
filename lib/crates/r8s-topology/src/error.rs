use thiserror::Error;

/// Errors raised while building, checking, or rendering a descriptor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("replica count must be between 1 and {max}, got {got}")]
    ReplicaCount { got: u32, max: u16 },

    #[error("duplicate service name '{0}'")]
    DuplicateName(String),

    #[error("host port {port} is published by both '{first}' and '{second}'")]
    DuplicatePort {
        port: u16,
        first: String,
        second: String,
    },

    #[error("service '{service}' depends on unknown service '{dependency}'")]
    UnknownDependency { service: String, dependency: String },

    #[error("service '{service}' is attached to '{found}' instead of the shared network '{expected}'")]
    NetworkMismatch {
        service: String,
        expected: String,
        found: String,
    },

    #[error("service '{service}' mounts undeclared volume '{volume}'")]
    UndeclaredVolume { service: String, volume: String },

    #[error("cannot render descriptor: {0}")]
    Render(String),
}
