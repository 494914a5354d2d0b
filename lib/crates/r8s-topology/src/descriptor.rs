//! Typed deployment descriptor and its docker compose rendering.
//!
//! The model is built in code and rendered exactly once by [`DeploymentDescriptor::to_yaml`].
//! Field names of the rendered document follow the compose file format.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::error::TopologyError;

/// First line of every rendered descriptor.
pub const GENERATED_HEADER: &str = "# Generated by r8s-dev - DO NOT EDIT\n";

/// Driver used for the shared network.
pub const NETWORK_DRIVER: &str = "bridge";

// ── Service model ────────────────────────────────────────────────────────────

/// What a service is for within the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceRole {
    ControlPlane,
    Agent,
    CoordinationStore,
    Observability,
}

/// Host port → container port mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    pub published: u16,
    pub container: u16,
}

impl PortMapping {
    /// Publish `port` on the host under the same number.
    #[must_use]
    pub const fn same(port: u16) -> Self {
        Self {
            published: port,
            container: port,
        }
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.published, self.container)
    }
}

/// Whether a mount source is a named volume or a host path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    Volume,
    Bind,
}

/// A volume or bind mount attached to a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub kind: MountKind,
    pub source: String,
    pub target: String,
}

impl Mount {
    #[must_use]
    pub fn volume(name: &str, target: &str) -> Self {
        Self {
            kind: MountKind::Volume,
            source: name.to_owned(),
            target: target.to_owned(),
        }
    }

    #[must_use]
    pub fn bind(host_path: &str, target: &str) -> Self {
        Self {
            kind: MountKind::Bind,
            source: host_path.to_owned(),
            target: target.to_owned(),
        }
    }
}

impl fmt::Display for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.target)
    }
}

/// One deployable unit of the topology.
///
/// `name` doubles as container name and as the hostname other services use
/// to reach it on the shared network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    pub name: String,
    pub role: ServiceRole,
    pub image: String,
    /// `None` lets the runtime pick an ephemeral host port.
    pub ports: Option<PortMapping>,
    pub environment: BTreeMap<String, String>,
    pub depends_on: BTreeSet<String>,
    pub privileged: bool,
    pub mounts: Vec<Mount>,
    pub network: String,
}

impl ServiceSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, role: ServiceRole, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role,
            image: image.into(),
            ports: None,
            environment: BTreeMap::new(),
            depends_on: BTreeSet::new(),
            privileged: false,
            mounts: Vec::new(),
            network: String::new(),
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.ports = Some(PortMapping::same(port));
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.environment.insert(key.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn with_dependency(mut self, service: &str) -> Self {
        self.depends_on.insert(service.to_owned());
        self
    }

    #[must_use]
    pub fn with_privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    #[must_use]
    pub fn with_mount(mut self, mount: Mount) -> Self {
        self.mounts.push(mount);
        self
    }

    /// Host port this service is published on, if any.
    #[must_use]
    pub fn published_port(&self) -> Option<u16> {
        self.ports.map(|p| p.published)
    }
}

// ── Descriptor ───────────────────────────────────────────────────────────────

/// The complete topology for one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentDescriptor {
    /// Rendered in this order; the runtime orders startup by `depends_on`.
    pub services: Vec<ServiceSpec>,
    pub network: String,
    pub volumes: BTreeSet<String>,
}

impl DeploymentDescriptor {
    /// Look up a service by name.
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.iter().find(|s| s.name == name)
    }

    /// All services with the given role, in document order.
    pub fn services_with_role(&self, role: ServiceRole) -> impl Iterator<Item = &ServiceSpec> {
        self.services.iter().filter(move |s| s.role == role)
    }

    /// Check the structural invariants the runtime relies on: unique names,
    /// unique published ports, resolvable dependencies, a single network and
    /// declared named volumes.
    pub fn validate(&self) -> Result<(), TopologyError> {
        let mut names = HashSet::new();
        for service in &self.services {
            if !names.insert(service.name.as_str()) {
                return Err(TopologyError::DuplicateName(service.name.clone()));
            }
        }

        let mut ports: HashMap<u16, &str> = HashMap::new();
        for service in &self.services {
            if let Some(port) = service.published_port() {
                if let Some(first) = ports.insert(port, &service.name) {
                    return Err(TopologyError::DuplicatePort {
                        port,
                        first: first.to_owned(),
                        second: service.name.clone(),
                    });
                }
            }
        }

        for service in &self.services {
            if service.network != self.network {
                return Err(TopologyError::NetworkMismatch {
                    service: service.name.clone(),
                    expected: self.network.clone(),
                    found: service.network.clone(),
                });
            }
            if let Some(missing) = service
                .depends_on
                .iter()
                .find(|dep| !names.contains(dep.as_str()))
            {
                return Err(TopologyError::UnknownDependency {
                    service: service.name.clone(),
                    dependency: missing.clone(),
                });
            }
            if let Some(volume) = service
                .mounts
                .iter()
                .find(|m| m.kind == MountKind::Volume && !self.volumes.contains(&m.source))
            {
                return Err(TopologyError::UndeclaredVolume {
                    service: service.name.clone(),
                    volume: volume.source.clone(),
                });
            }
        }
        Ok(())
    }

    /// Render the descriptor as a compose document, prefixed with
    /// [`GENERATED_HEADER`].
    pub fn to_yaml(&self) -> Result<String, TopologyError> {
        let body = serde_yaml::to_string(self).map_err(|e| TopologyError::Render(e.to_string()))?;
        Ok(format!("{GENERATED_HEADER}{body}"))
    }
}

// ── Compose rendering ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ComposeService<'a> {
    image: &'a str,
    container_name: &'a str,
    hostname: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    privileged: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ports: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    volumes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depends_on: Option<&'a BTreeSet<String>>,
    networks: [&'a str; 1],
}

impl<'a> From<&'a ServiceSpec> for ComposeService<'a> {
    fn from(spec: &'a ServiceSpec) -> Self {
        Self {
            image: &spec.image,
            container_name: &spec.name,
            hostname: &spec.name,
            privileged: spec.privileged.then_some(true),
            ports: spec.ports.iter().map(ToString::to_string).collect(),
            environment: (!spec.environment.is_empty()).then_some(&spec.environment),
            volumes: spec.mounts.iter().map(ToString::to_string).collect(),
            depends_on: (!spec.depends_on.is_empty()).then_some(&spec.depends_on),
            networks: [&spec.network],
        }
    }
}

#[derive(Serialize)]
struct NetworkDecl {
    driver: &'static str,
}

#[derive(Serialize)]
struct VolumeDecl {}

/// Services keyed by name, in document order.
struct ComposeServices<'a>(&'a [ServiceSpec]);

impl Serialize for ComposeServices<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for spec in self.0 {
            map.serialize_entry(&spec.name, &ComposeService::from(spec))?;
        }
        map.end()
    }
}

impl Serialize for DeploymentDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut root = serializer.serialize_map(None)?;
        root.serialize_entry("services", &ComposeServices(&self.services))?;

        let networks = BTreeMap::from([(
            self.network.as_str(),
            NetworkDecl {
                driver: NETWORK_DRIVER,
            },
        )]);
        root.serialize_entry("networks", &networks)?;

        if !self.volumes.is_empty() {
            let volumes: BTreeMap<&str, VolumeDecl> = self
                .volumes
                .iter()
                .map(|v| (v.as_str(), VolumeDecl {}))
                .collect();
            root.serialize_entry("volumes", &volumes)?;
        }
        root.end()
    }
}
