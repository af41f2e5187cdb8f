//! Structured compose configuration, as produced by a
//! [`DocumentLoader`](super::port::DocumentLoader).
//!
//! Ports and volumes are always in long syntax here, short syntax is
//! expanded by the loader.

use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComposeConfig {
    pub filename: String,
    pub version: String,

    /// Services in document order
    pub services: Vec<ServiceConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    pub name: String,
    pub image: String,
    pub working_dir: String,
    pub labels: BTreeMap<String, String>,
    pub cap_add: Vec<String>,
    pub cap_drop: Vec<String>,
    pub expose: Vec<String>,
    pub privileged: bool,
    pub restart: String,
    pub user: String,
    pub stdin_open: bool,
    pub tty: bool,
    pub tmpfs: Vec<String>,
    pub container_name: String,
    pub entrypoint: Vec<String>,
    pub command: Vec<String>,

    /// Variables without a value are declared but left to the runtime
    pub environment: BTreeMap<String, Option<String>>,

    pub ports: Vec<ServicePortConfig>,
    pub volumes: Vec<ServiceVolumeConfig>,
    pub deploy: DeployConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServicePortConfig {
    /// Host port, 0 when the port is not published
    pub published: u16,
    pub target: u16,
    pub protocol: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceVolumeConfig {
    pub source: String,
    pub target: String,
    pub read_only: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeployConfig {
    pub resources: Resources,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resources {
    pub limits: Option<Resource>,
    pub reservations: Option<Resource>,
}

impl Resources {
    pub fn is_empty(&self) -> bool {
        self.limits.is_none() && self.reservations.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resource {
    pub memory_bytes: Option<i64>,
}
