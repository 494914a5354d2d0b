//! Topology synthesis: parameters in, descriptor out.

use std::collections::BTreeSet;

use crate::descriptor::{DeploymentDescriptor, Mount, ServiceRole, ServiceSpec};
use crate::error::TopologyError;

// ── Control plane ────────────────────────────────────────────────────────────

pub const CONTROL_PLANE_NAME: &str = "r8s-server";
pub const CONTROL_PLANE_IMAGE: &str = "r8s-server:latest";
pub const CONTROL_PLANE_PORT: u16 = 7620;
pub const CONTROL_PLANE_LOG: &str = "server=info";

// ── Agents ───────────────────────────────────────────────────────────────────

pub const AGENT_BASE_NAME: &str = "r8s-node";
pub const AGENT_IMAGE: &str = "r8s-node:latest";
pub const AGENT_LOG: &str = "node=info";
/// Port of the only agent when a single replica is requested.
pub const SINGLE_AGENT_PORT: u16 = CONTROL_PLANE_PORT + 1;
/// Agent `i` of a multi-replica topology listens on `AGENT_BASE_PORT + i`.
pub const AGENT_BASE_PORT: u16 = 8080;
/// Largest replica count whose ports still fit in a `u16`.
pub const MAX_REPLICAS: u16 = u16::MAX - AGENT_BASE_PORT;

// ── Coordination store ───────────────────────────────────────────────────────

pub const STORE_NAME: &str = "etcd";
pub const STORE_IMAGE: &str = "quay.io/coreos/etcd:v3.6.1";
pub const STORE_PORT: u16 = 2379;
pub const STORE_VOLUME: &str = "etcd-data";
pub const STORE_DATA_DIR: &str = "/etcd-data";

// ── Observability ────────────────────────────────────────────────────────────

pub const OBSERVABILITY_NAME: &str = "grafana";
pub const OBSERVABILITY_IMAGE: &str = "grafana/grafana:latest";
pub const OBSERVABILITY_PORT: u16 = 3000;
pub const OBSERVABILITY_VOLUME: &str = "grafana-data";
pub const OBSERVABILITY_PROVISIONING: &str = "./grafana/provisioning";
pub const OBSERVABILITY_PLUGINS: &str = "yesoreyeram-infinity-datasource";

/// Network every service joins.
pub const NETWORK: &str = "r8s-net";

/// Inputs to [`synthesize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyParams {
    replicas: u16,
    observability: bool,
}

impl TopologyParams {
    /// Build parameters, rejecting replica counts outside `1..=MAX_REPLICAS`.
    pub fn new(replicas: u32, observability: bool) -> Result<Self, TopologyError> {
        match u16::try_from(replicas) {
            Ok(n) if (1..=MAX_REPLICAS).contains(&n) => Ok(Self {
                replicas: n,
                observability,
            }),
            _ => Err(TopologyError::ReplicaCount {
                got: replicas,
                max: MAX_REPLICAS,
            }),
        }
    }

    #[must_use]
    pub fn replicas(&self) -> u16 {
        self.replicas
    }

    #[must_use]
    pub fn observability(&self) -> bool {
        self.observability
    }
}

impl Default for TopologyParams {
    fn default() -> Self {
        Self {
            replicas: 1,
            observability: false,
        }
    }
}

/// Name and port of agent `index` (1-based) out of `replicas`.
///
/// A lone agent gets the bare base name and the port right after the control
/// plane; with two or more each agent is suffixed and offset from
/// [`AGENT_BASE_PORT`]. The two rules do not agree at `index == 1`.
#[must_use]
pub fn agent_identity(index: u16, replicas: u16) -> (String, u16) {
    if replicas == 1 {
        (AGENT_BASE_NAME.to_owned(), SINGLE_AGENT_PORT)
    } else {
        (format!("{AGENT_BASE_NAME}-{index}"), AGENT_BASE_PORT + index)
    }
}

/// Build the descriptor for one provisioning run. Deterministic.
#[must_use]
pub fn synthesize(params: &TopologyParams) -> DeploymentDescriptor {
    let mut services = Vec::with_capacity(usize::from(params.replicas) + 3);
    let mut volumes = BTreeSet::new();

    services.push(control_plane());

    for index in 1..=params.replicas {
        services.push(agent(index, params.replicas));
    }

    services.push(coordination_store());
    volumes.insert(STORE_VOLUME.to_owned());

    if params.observability {
        services.push(observability());
        volumes.insert(OBSERVABILITY_VOLUME.to_owned());
    }

    for service in &mut services {
        service.network = NETWORK.to_owned();
    }

    DeploymentDescriptor {
        services,
        network: NETWORK.to_owned(),
        volumes,
    }
}

fn control_plane() -> ServiceSpec {
    ServiceSpec::new(CONTROL_PLANE_NAME, ServiceRole::ControlPlane, CONTROL_PLANE_IMAGE)
        .with_port(CONTROL_PLANE_PORT)
        .with_env("RUST_LOG", CONTROL_PLANE_LOG)
        .with_env("CR8S_SERVER_PORT", CONTROL_PLANE_PORT.to_string())
        .with_env("ETCD_ADDR", format!("http://{STORE_NAME}:{STORE_PORT}"))
        .with_dependency(STORE_NAME)
}

fn agent(index: u16, replicas: u16) -> ServiceSpec {
    let (name, port) = agent_identity(index, replicas);
    ServiceSpec::new(name.as_str(), ServiceRole::Agent, AGENT_IMAGE)
        .with_port(port)
        .with_privileged()
        .with_env("RUST_LOG", AGENT_LOG)
        .with_env("NODE_NAME", name.as_str())
        .with_env("NODE_PORT", port.to_string())
        .with_env("R8S_SERVER_HOST", CONTROL_PLANE_NAME)
        .with_env("R8S_SERVER_PORT", CONTROL_PLANE_PORT.to_string())
        .with_dependency(CONTROL_PLANE_NAME)
}

fn coordination_store() -> ServiceSpec {
    ServiceSpec::new(STORE_NAME, ServiceRole::CoordinationStore, STORE_IMAGE)
        .with_port(STORE_PORT)
        .with_env("ETCD_NAME", STORE_NAME)
        .with_env("ETCD_DATA_DIR", STORE_DATA_DIR)
        .with_env("ETCD_LISTEN_CLIENT_URLS", format!("http://0.0.0.0:{STORE_PORT}"))
        .with_env(
            "ETCD_ADVERTISE_CLIENT_URLS",
            format!("http://{STORE_NAME}:{STORE_PORT}"),
        )
        .with_mount(Mount::volume(STORE_VOLUME, STORE_DATA_DIR))
}

fn observability() -> ServiceSpec {
    ServiceSpec::new(OBSERVABILITY_NAME, ServiceRole::Observability, OBSERVABILITY_IMAGE)
        .with_port(OBSERVABILITY_PORT)
        .with_mount(Mount::volume(OBSERVABILITY_VOLUME, "/var/lib/grafana"))
        .with_mount(Mount::bind(
            OBSERVABILITY_PROVISIONING,
            "/etc/grafana/provisioning",
        ))
        .with_env("GF_SECURITY_ADMIN_USER", "admin")
        .with_env("GF_SECURITY_ADMIN_PASSWORD", "admin")
        .with_env("GF_INSTALL_PLUGINS", OBSERVABILITY_PLUGINS)
        .with_env("GF_LOG_LEVEL", "warn")
        .with_dependency(CONTROL_PLANE_NAME)
}
