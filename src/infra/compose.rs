use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use itertools::Itertools;
use log::debug;
use serde::Deserialize;
use serde_yaml::Value;

use crate::domain::error::LoadError;
use crate::domain::port::{ConfigDetails, DocumentLoader, DocumentTree};
use crate::domain::source::{
    ComposeConfig, DeployConfig, Resource, Resources, ServiceConfig, ServicePortConfig,
    ServiceVolumeConfig,
};

use super::interpolate::interpolate_value;
use super::units::parse_memory_bytes;

/// Loader for compose files of the 3.x family
#[derive(Clone, Copy, Debug, Default)]
pub struct ComposeLoader;

impl DocumentLoader for ComposeLoader {
    fn parse(&self, raw: &[u8]) -> Result<DocumentTree, LoadError> {
        let text = std::str::from_utf8(raw)?;
        match serde_yaml::from_str::<Value>(text)? {
            Value::Mapping(mapping) => Ok(mapping),
            Value::Null => Err(LoadError::schema("compose file is empty")),
            _ => Err(LoadError::schema("top-level object must be a mapping")),
        }
    }

    fn load(&self, details: ConfigDetails) -> Result<ComposeConfig, LoadError> {
        let ConfigDetails {
            working_dir,
            config_files,
            environment,
        } = details;
        let file = config_files
            .into_iter()
            .next()
            .ok_or(LoadError::NoConfigFiles)?;

        let mut document = Value::Mapping(file.config);
        match environment {
            Some(environment) => {
                interpolate_value(&mut document, &|name: &str| environment.get(name).cloned())?
            }
            None => interpolate_value(&mut document, &|name: &str| std::env::var(name).ok())?,
        }

        let raw: RawCompose = serde_yaml::from_value(document)?;
        let version = version(raw.version.as_ref())?;
        debug!("Loading {} with version {}", file.filename, version);

        let services = raw
            .services
            .unwrap_or_default()
            .into_iter()
            .map(|(name, service)| {
                let name = match name {
                    Value::String(name) => name,
                    other => scalar(&other)?
                        .ok_or_else(|| LoadError::schema("service name cannot be empty"))?,
                };
                let service: RawService = match service {
                    Value::Null => RawService::default(),
                    service => serde_yaml::from_value(service).map_err(|e| {
                        LoadError::schema(format!("service {name:?}: {e}"))
                    })?,
                };
                service.into_config(name, &working_dir)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ComposeConfig {
            filename: file.filename,
            version,
            services,
        })
    }
}

fn version(version: Option<&Value>) -> Result<String, LoadError> {
    let version = match version {
        None => "1.0".to_string(),
        Some(value) => scalar(value)?.unwrap_or_default(),
    };
    if version == "3" || version.starts_with("3.") {
        Ok(version)
    } else {
        Err(LoadError::UnsupportedVersion(version))
    }
}

/// Render a YAML scalar as a string, `None` for null
fn scalar(value: &Value) -> Result<Option<String>, LoadError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(LoadError::schema(format!(
            "expected a scalar value, found {other:?}"
        ))),
    }
}

#[derive(Deserialize)]
struct RawCompose {
    version: Option<Value>,
    services: Option<serde_yaml::Mapping>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    String(String),
    List(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MappingOrList {
    Mapping(BTreeMap<String, Value>),
    List(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPort {
    Long {
        target: u32,
        published: Option<Value>,
        protocol: Option<String>,
    },
    Short(Value),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVolume {
    Short(String),
    Long {
        source: Option<String>,
        target: Option<String>,
        #[serde(default)]
        read_only: bool,
    },
}

#[derive(Deserialize, Default)]
struct RawDeploy {
    resources: Option<RawResources>,
}

#[derive(Deserialize, Default)]
struct RawResources {
    limits: Option<RawResource>,
    reservations: Option<RawResource>,
}

#[derive(Deserialize, Default)]
struct RawResource {
    memory: Option<Value>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawService {
    image: Option<String>,
    working_dir: Option<String>,
    labels: Option<MappingOrList>,
    cap_add: Vec<String>,
    cap_drop: Vec<String>,
    expose: Vec<Value>,
    privileged: bool,
    restart: Option<String>,
    user: Option<Value>,
    stdin_open: bool,
    tty: bool,
    tmpfs: Option<StringOrList>,
    container_name: Option<String>,
    entrypoint: Option<StringOrList>,
    command: Option<StringOrList>,
    environment: Option<MappingOrList>,
    ports: Vec<RawPort>,
    volumes: Vec<RawVolume>,
    deploy: Option<RawDeploy>,
    volumes_from: Option<Value>,
}

impl RawService {
    fn into_config(self, name: String, working_dir: &Path) -> Result<ServiceConfig, LoadError> {
        if self.volumes_from.is_some() {
            return Err(LoadError::Unsupported(format!(
                "volumes_from (service {name:?})"
            )));
        }

        let expose = self
            .expose
            .iter()
            .map(|value| scalar(value).map(Option::unwrap_or_default))
            .collect::<Result<Vec<_>, _>>()?;

        let ports = self
            .ports
            .into_iter()
            .map(port_configs)
            .flatten_ok()
            .collect::<Result<Vec<_>, _>>()?;

        let volumes = self
            .volumes
            .into_iter()
            .map(|volume| volume_config(volume, working_dir))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ServiceConfig {
            image: self.image.unwrap_or_default(),
            working_dir: self.working_dir.unwrap_or_default(),
            labels: labels(self.labels)?,
            cap_add: self.cap_add,
            cap_drop: self.cap_drop,
            expose,
            privileged: self.privileged,
            restart: self.restart.unwrap_or_default(),
            user: match &self.user {
                Some(user) => scalar(user)?.unwrap_or_default(),
                None => String::new(),
            },
            stdin_open: self.stdin_open,
            tty: self.tty,
            tmpfs: match self.tmpfs {
                Some(StringOrList::String(tmpfs)) => vec![tmpfs],
                Some(StringOrList::List(tmpfs)) => tmpfs,
                None => Vec::new(),
            },
            container_name: self.container_name.unwrap_or_default(),
            entrypoint: command(self.entrypoint)?,
            command: command(self.command)?,
            environment: environment(self.environment)?,
            ports,
            volumes,
            deploy: deploy(self.deploy)?,
            name,
        })
    }
}

fn labels(labels: Option<MappingOrList>) -> Result<BTreeMap<String, String>, LoadError> {
    match labels {
        None => Ok(BTreeMap::new()),
        Some(MappingOrList::Mapping(labels)) => labels
            .into_iter()
            .map(|(key, value)| Ok((key, scalar(&value)?.unwrap_or_default())))
            .collect(),
        Some(MappingOrList::List(labels)) => Ok(labels
            .into_iter()
            .map(|label| match label.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (label, String::new()),
            })
            .collect()),
    }
}

fn environment(
    environment: Option<MappingOrList>,
) -> Result<BTreeMap<String, Option<String>>, LoadError> {
    match environment {
        None => Ok(BTreeMap::new()),
        Some(MappingOrList::Mapping(environment)) => environment
            .into_iter()
            .map(|(key, value)| Ok((key, scalar(&value)?)))
            .collect(),
        Some(MappingOrList::List(environment)) => Ok(environment
            .into_iter()
            .map(|variable| match variable.split_once('=') {
                Some((key, value)) => (key.to_string(), Some(value.to_string())),
                None => (variable, None),
            })
            .collect()),
    }
}

fn command(command: Option<StringOrList>) -> Result<Vec<String>, LoadError> {
    match command {
        None => Ok(Vec::new()),
        Some(StringOrList::List(command)) => Ok(command),
        Some(StringOrList::String(command)) => split_command(&command),
    }
}

/// Split a command line into words the way a POSIX shell would, without
/// any expansion.
fn split_command(input: &str) -> Result<Vec<String>, LoadError> {
    shell_words::split(input)
        .map_err(|e| LoadError::schema(format!("invalid command {input:?}: {e}")))
}

fn port_configs(port: RawPort) -> Result<Vec<ServicePortConfig>, LoadError> {
    match port {
        RawPort::Long {
            target,
            published,
            protocol,
        } => {
            let published = match published.as_ref().map(scalar).transpose()?.flatten() {
                Some(published) => port_number(&published)?,
                None => 0,
            };
            Ok(vec![ServicePortConfig {
                published,
                target: check_port(target)?,
                protocol: protocol.unwrap_or_else(|| "tcp".to_string()),
            }])
        }
        RawPort::Short(Value::Number(target)) => {
            let target = target
                .as_u64()
                .and_then(|target| u32::try_from(target).ok())
                .ok_or_else(|| LoadError::schema(format!("invalid port {target}")))?;
            Ok(vec![ServicePortConfig {
                published: 0,
                target: check_port(target)?,
                protocol: "tcp".to_string(),
            }])
        }
        RawPort::Short(Value::String(spec)) => parse_short_port(&spec),
        RawPort::Short(other) => Err(LoadError::schema(format!("invalid port {other:?}"))),
    }
}

/// Expand `[[IP:]PUBLISHED:]TARGET[/PROTOCOL]` to long syntax ports. Ranges
/// expand to one port per number.
fn parse_short_port(spec: &str) -> Result<Vec<ServicePortConfig>, LoadError> {
    let (address, protocol) = match spec.rsplit_once('/') {
        Some((address, protocol)) => (address, protocol.to_string()),
        None => (spec, "tcp".to_string()),
    };

    // the host IP, if any, is dropped: host networking is not handled here
    let mut parts = address.rsplitn(3, ':');
    let target = port_range(parts.next().unwrap_or_default())?;
    let published = match parts.next() {
        Some("") | None => None,
        Some(published) => Some(port_range(published)?),
    };

    match published {
        None => Ok(target
            .map(|target| ServicePortConfig {
                published: 0,
                target,
                protocol: protocol.clone(),
            })
            .collect()),
        Some(published) if published.clone().count() == target.clone().count() => Ok(published
            .zip(target)
            .map(|(published, target)| ServicePortConfig {
                published,
                target,
                protocol: protocol.clone(),
            })
            .collect()),
        Some(_) => Err(LoadError::schema(format!(
            "invalid ranges specified for container and host ports in {spec:?}"
        ))),
    }
}

fn port_range(range: &str) -> Result<std::ops::RangeInclusive<u16>, LoadError> {
    match range.split_once('-') {
        Some((start, end)) => {
            let (start, end) = (port_number(start)?, port_number(end)?);
            if end < start {
                return Err(LoadError::schema(format!("invalid port range {range:?}")));
            }
            Ok(start..=end)
        }
        None => {
            let port = port_number(range)?;
            Ok(port..=port)
        }
    }
}

fn port_number(port: &str) -> Result<u16, LoadError> {
    port.trim()
        .parse::<u32>()
        .map_err(|_| LoadError::schema(format!("invalid port {port:?}")))
        .and_then(check_port)
}

fn check_port(port: u32) -> Result<u16, LoadError> {
    match u16::try_from(port) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(LoadError::schema(format!("port {port} is out of range"))),
    }
}

fn volume_config(volume: RawVolume, working_dir: &Path) -> Result<ServiceVolumeConfig, LoadError> {
    let volume = match volume {
        RawVolume::Short(spec) => {
            let parts: Vec<&str> = spec.split(':').collect();
            match parts.as_slice() {
                [source] => ServiceVolumeConfig {
                    source: source.to_string(),
                    ..Default::default()
                },
                [source, target] => ServiceVolumeConfig {
                    source: source.to_string(),
                    target: target.to_string(),
                    read_only: false,
                },
                [source, target, mode] => ServiceVolumeConfig {
                    source: source.to_string(),
                    target: target.to_string(),
                    read_only: mode.split(',').any(|option| option == "ro"),
                },
                _ => {
                    return Err(LoadError::schema(format!("invalid volume spec {spec:?}")));
                }
            }
        }
        RawVolume::Long {
            source,
            target,
            read_only,
        } => ServiceVolumeConfig {
            source: source.ok_or_else(|| LoadError::schema("volume has no source"))?,
            target: target.unwrap_or_default(),
            read_only,
        },
    };

    if volume.source.is_empty() {
        return Err(LoadError::schema("volume has no source"));
    }

    Ok(ServiceVolumeConfig {
        source: resolve_source(&volume.source, working_dir),
        ..volume
    })
}

/// Relative host paths are relative to the compose file directory
fn resolve_source(source: &str, working_dir: &Path) -> String {
    if !source.starts_with('.') {
        return source.to_string();
    }
    let mut resolved = PathBuf::new();
    for component in working_dir.join(source).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    resolved.to_string_lossy().into_owned()
}

fn deploy(deploy: Option<RawDeploy>) -> Result<DeployConfig, LoadError> {
    let resources = deploy.and_then(|deploy| deploy.resources).unwrap_or_default();
    Ok(DeployConfig {
        resources: Resources {
            limits: resources.limits.map(resource).transpose()?,
            reservations: resources.reservations.map(resource).transpose()?,
        },
    })
}

fn resource(resource: RawResource) -> Result<Resource, LoadError> {
    let memory_bytes = match resource.memory {
        None | Some(Value::Null) => None,
        Some(Value::Number(bytes)) => Some(
            bytes
                .as_i64()
                .filter(|bytes| *bytes >= 0)
                .ok_or_else(|| LoadError::schema(format!("invalid memory size {bytes}")))?,
        ),
        Some(Value::String(memory)) => Some(parse_memory_bytes(&memory)?),
        Some(other) => {
            return Err(LoadError::schema(format!(
                "invalid memory size {other:?}"
            )))
        }
    };
    Ok(Resource { memory_bytes })
}
