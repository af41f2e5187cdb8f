use std::collections::BTreeMap;

use super::convert::{load_ports, load_volumes};
use super::error::ConversionError;
use super::labels::apply_labels;
use super::model::{EnvVar, IntermediateApp, ServiceRecord, SourceFormat};
use super::naming::normalize_service_name;
use super::port::{ConversionEvent, ConversionObserver};
use super::source::{ComposeConfig, ServiceConfig};

/// Map every service of a compose configuration to the intermediate model.
///
/// Either all services are mapped or an error is returned, a failing
/// service never leaves the services before it in a returned value.
pub fn map_services(
    config: &ComposeConfig,
    observer: &dyn ConversionObserver,
) -> Result<IntermediateApp, ConversionError> {
    let mut service_configs = BTreeMap::new();

    for service in &config.services {
        let record = map_service(service)?;

        let name = normalize_service_name(&service.name);
        if name != service.name {
            observer.notify(ConversionEvent::ServiceRenamed {
                from: service.name.clone(),
                to: name.clone(),
            });
        }

        // two names normalizing to the same value: the last one wins
        service_configs.insert(name, record);
    }

    Ok(IntermediateApp {
        service_configs,
        loaded_from: SourceFormat::Compose,
    })
}

fn map_service(service: &ServiceConfig) -> Result<ServiceRecord, ConversionError> {
    let mut record = ServiceRecord {
        image: service.image.clone(),
        working_dir: service.working_dir.clone(),
        annotations: service.labels.clone(),
        cap_add: service.cap_add.clone(),
        cap_drop: service.cap_drop.clone(),
        expose: service.expose.clone(),
        privileged: service.privileged,
        restart: service.restart.clone(),
        user: service.user.clone(),
        stdin: service.stdin_open,
        tty: service.tty,
        tmpfs: service.tmpfs.clone(),
        container_name: service.container_name.clone(),
        command: service.entrypoint.clone(),
        args: service.command.clone(),
        mem_limit: None,
        environment: environment(&service.environment),
        port: load_ports(&service.ports),
        volumes: load_volumes(&service.volumes),
        service_type: None,
        expose_service: String::new(),
    };

    let resources = &service.deploy.resources;
    if !resources.is_empty() {
        record.mem_limit = Some(
            resources
                .limits
                .as_ref()
                .and_then(|limits| limits.memory_bytes)
                .unwrap_or(0),
        );
    }

    apply_labels(&service.labels, &mut record)?;

    Ok(record)
}

/// Variables without a value are dropped. The result is ordered by name.
fn environment(environment: &BTreeMap<String, Option<String>>) -> Vec<EnvVar> {
    environment
        .iter()
        .filter_map(|(name, value)| {
            value.as_ref().map(|value| EnvVar {
                name: name.clone(),
                value: value.clone(),
            })
        })
        .collect()
}
