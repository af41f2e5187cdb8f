use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::MappingError;

/// Source format an [`IntermediateApp`] was loaded from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    #[default]
    Compose,
}

/// Vendor-neutral description of a multi-service application, keyed by
/// normalized service name.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntermediateApp {
    pub service_configs: BTreeMap<String, ServiceRecord>,
    pub loaded_from: SourceFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceRecord {
    pub image: String,
    pub working_dir: String,
    pub annotations: BTreeMap<String, String>,
    pub cap_add: Vec<String>,
    pub cap_drop: Vec<String>,
    pub expose: Vec<String>,
    pub privileged: bool,
    pub restart: String,
    pub user: String,
    pub stdin: bool,
    pub tty: bool,
    pub tmpfs: Vec<String>,
    pub container_name: String,

    /// Entrypoint of the container, taken from the compose `entrypoint`
    pub command: Vec<String>,

    /// Arguments to the entrypoint, taken from the compose `command`
    pub args: Vec<String>,

    /// Memory limit in bytes, only set when the service declares deploy resources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_limit: Option<i64>,

    pub environment: Vec<EnvVar>,
    pub port: Vec<PortBinding>,
    pub volumes: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    pub expose_service: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    pub host_port: i32,
    pub container_port: i32,
    pub host_ip: String,
    pub protocol: Protocol,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Protocol {
    Tcp,
    Udp,
    Sctp,
    /// Any other protocol name, kept uppercased
    Other(String),
}

/// An empty name is the compose default, TCP.
impl From<&str> for Protocol {
    fn from(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "" | "TCP" => Protocol::Tcp,
            "UDP" => Protocol::Udp,
            "SCTP" => Protocol::Sctp,
            other => Protocol::Other(other.to_owned()),
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "TCP"),
            Protocol::Udp => write!(f, "UDP"),
            Protocol::Sctp => write!(f, "SCTP"),
            Protocol::Other(name) => write!(f, "{name}"),
        }
    }
}

impl From<String> for Protocol {
    fn from(s: String) -> Self {
        Protocol::from(s.as_str())
    }
}

impl From<Protocol> for String {
    fn from(protocol: Protocol) -> Self {
        protocol.to_string()
    }
}

/// How the downstream generator should expose a service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    ClusterIP,
    NodePort,
    LoadBalancer,
}

impl FromStr for ServiceType {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clusterip" => Ok(ServiceType::ClusterIP),
            "nodeport" => Ok(ServiceType::NodePort),
            "loadbalancer" => Ok(ServiceType::LoadBalancer),
            _ => Err(MappingError::UnknownServiceType(s.to_owned())),
        }
    }
}
