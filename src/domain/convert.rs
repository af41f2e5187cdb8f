use super::model::{PortBinding, Protocol};
use super::naming::normalize_service_name;
use super::source::{ServicePortConfig, ServiceVolumeConfig};

/// Convert long syntax ports to port bindings.
///
/// The host IP is always empty, compose v3 leaves host networking to the
/// orchestrator.
pub fn load_ports(ports: &[ServicePortConfig]) -> Vec<PortBinding> {
    ports
        .iter()
        .map(|port| PortBinding {
            host_port: i32::from(port.published),
            container_port: i32::from(port.target),
            host_ip: String::new(),
            protocol: Protocol::from(port.protocol.as_str()),
        })
        .collect()
}

/// Convert long syntax volumes to `source[:target][:ro]` strings.
// TODO: keep the difference between bind mounts and named volumes once
// the intermediate model can represent it
pub fn load_volumes(volumes: &[ServiceVolumeConfig]) -> Vec<String> {
    volumes
        .iter()
        .map(|volume| {
            let mut v = normalize_service_name(&volume.source);
            if !volume.target.is_empty() {
                v.push(':');
                v.push_str(&volume.target);
            }
            if volume.read_only {
                v.push_str(":ro");
            }
            v
        })
        .collect()
}
