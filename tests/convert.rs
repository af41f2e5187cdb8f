use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use komposer::domain::error::{ConversionError, LoadError, MappingError};
use komposer::domain::naming::normalize_service_name;
use komposer::domain::model::{EnvVar, PortBinding, Protocol, ServiceType, SourceFormat};
use komposer::domain::port::{ConversionEvent, ConversionObserver};
use komposer::infra::compose::ComposeLoader;
use komposer::{convert, convert_document, ConversionService};
use map_macro::btree_map;
use tempfile::TempDir;

#[derive(Clone, Default)]
struct RecordingObserver {
    events: Arc<Mutex<Vec<ConversionEvent>>>,
}

impl ConversionObserver for RecordingObserver {
    fn notify(&self, event: ConversionEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn service() -> (ConversionService, RecordingObserver) {
    let observer = RecordingObserver::default();
    let service = ConversionService {
        document_loader: Box::new(ComposeLoader),
        observer: Box::new(observer.clone()),
    };
    (service, observer)
}

fn write_compose(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const WEB_APP: &str = r#"
version: "3.2"
services:
  web-app:
    image: nginx
    ports:
      - target: 8080
        published: 80
        protocol: tcp
    volumes:
      - type: volume
        source: logs
        target: /var/log
    labels:
      kompose.service.expose: "true"
"#;

#[test]
fn converts_a_single_service() {
    let dir = TempDir::new().unwrap();
    let file = write_compose(&dir, "docker-compose.yml", WEB_APP);
    let (service, observer) = service();

    let app = convert(&[file], &service).unwrap();

    assert_eq!(app.loaded_from, SourceFormat::Compose);
    assert_eq!(app.service_configs.len(), 1);
    let record = &app.service_configs["web-app"];
    assert_eq!(record.image, "nginx");
    assert_eq!(
        record.port,
        vec![PortBinding {
            host_port: 80,
            container_port: 8080,
            host_ip: "".to_string(),
            protocol: Protocol::Tcp,
        }]
    );
    assert_eq!(record.volumes, vec!["logs:/var/log"]);
    assert_eq!(record.expose_service, "true");
    assert!(observer.events.lock().unwrap().is_empty());
}

#[test]
fn model_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    let file = write_compose(&dir, "docker-compose.yml", WEB_APP);
    let (service, _) = service();

    let app = convert(&[file], &service).unwrap();
    let json = serde_json::to_value(&app).unwrap();

    assert_eq!(json["loaded_from"], "compose");
    assert_eq!(json["service_configs"]["web-app"]["port"][0]["protocol"], "TCP");
    assert_eq!(json["service_configs"]["web-app"]["port"][0]["host_ip"], "");
}

#[test]
fn drops_environment_variables_without_value() {
    let (service, _) = service();
    let app = convert_document(
        "docker-compose.yml",
        br#"
version: "3"
services:
  worker:
    image: busybox
    environment:
      FROM_HOST:
      QUEUE: jobs
"#,
        &PathBuf::from("/srv/app"),
        &service,
    )
    .unwrap();

    assert_eq!(
        app.service_configs["worker"].environment,
        vec![EnvVar {
            name: "QUEUE".to_string(),
            value: "jobs".to_string(),
        }]
    );
}

#[test]
fn unknown_service_type_yields_no_model() {
    let (service, _) = service();
    let result = convert_document(
        "docker-compose.yml",
        br#"
version: "3"
services:
  api:
    image: api
    labels:
      kompose.service.type: nodeport
  web:
    image: web
    labels:
      kompose.service.type: bogus
"#,
        &PathBuf::from("/srv/app"),
        &service,
    );

    match result {
        Err(ConversionError::Mapping { label, source, .. }) => {
            assert_eq!(label, "kompose.service.type");
            assert_eq!(source, MappingError::UnknownServiceType("bogus".to_string()));
        }
        other => panic!("expected a mapping error, got {other:?}"),
    }
}

#[test]
fn applies_directive_labels_and_keeps_annotations() {
    let (service, _) = service();
    let app = convert_document(
        "docker-compose.yml",
        br#"
version: "3"
services:
  api:
    image: api
    labels:
      kompose.service.type: LoadBalancer
      kompose.service.expose: API.Example.com
      team: backend
"#,
        &PathBuf::from("/srv/app"),
        &service,
    )
    .unwrap();

    let record = &app.service_configs["api"];
    assert_eq!(record.service_type, Some(ServiceType::LoadBalancer));
    assert_eq!(record.expose_service, "api.example.com");
    assert_eq!(
        record.annotations,
        btree_map! {
            "kompose.service.expose".to_string() => "API.Example.com".to_string(),
            "kompose.service.type".to_string() => "LoadBalancer".to_string(),
            "team".to_string() => "backend".to_string()
        }
    );
}

#[test]
fn normalizes_service_names_and_reports_them() {
    let (service, observer) = service();
    let app = convert_document(
        "docker-compose.yml",
        br#"
version: "3"
services:
  my_db:
    image: postgres
    entrypoint: docker-entrypoint.sh
    command: postgres -c max_connections=200
    deploy:
      resources:
        limits:
          memory: 512m
"#,
        &PathBuf::from("/srv/app"),
        &service,
    )
    .unwrap();

    let record = &app.service_configs["my-db"];
    assert_eq!(record.command, vec!["docker-entrypoint.sh"]);
    assert_eq!(record.args, vec!["postgres", "-c", "max_connections=200"]);
    assert_eq!(record.mem_limit, Some(512 * 1024 * 1024));
    assert_eq!(
        *observer.events.lock().unwrap(),
        vec![ConversionEvent::ServiceRenamed {
            from: "my_db".to_string(),
            to: "my-db".to_string(),
        }]
    );
}

#[test]
fn resolves_relative_volumes_against_the_compose_file_dir() {
    let dir = TempDir::new().unwrap();
    let file = write_compose(
        &dir,
        "docker-compose.yml",
        r#"
version: "3"
services:
  web:
    image: nginx
    volumes:
      - ./html:/usr/share/nginx/html:ro
"#,
    );
    let (service, _) = service();

    let app = convert(&[file], &service).unwrap();
    let source = normalize_service_name(&dir.path().join("html").to_string_lossy());
    let expected = format!("{source}:/usr/share/nginx/html:ro");
    assert_eq!(app.service_configs["web"].volumes, vec![expected]);
}

#[test]
fn only_the_first_file_is_read() {
    let dir = TempDir::new().unwrap();
    let first = write_compose(&dir, "docker-compose.yml", WEB_APP);
    let second = dir.path().join("does-not-exist.yml");
    let (service, observer) = service();

    let app = convert(&[first, second.clone()], &service).unwrap();

    assert_eq!(app.service_configs.len(), 1);
    assert_eq!(
        *observer.events.lock().unwrap(),
        vec![ConversionEvent::ExtraFilesIgnored {
            files: vec![second],
        }]
    );
}

#[test]
fn empty_file_list_is_an_io_error() {
    let (service, _) = service();
    assert!(matches!(
        convert(&[], &service),
        Err(ConversionError::Io { .. })
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let (service, _) = service();
    let err = convert(&[dir.path().join("docker-compose.yml")], &service).unwrap_err();
    assert!(matches!(err, ConversionError::Io { .. }));
    assert!(err.to_string().starts_with("reading compose file"));
}

#[test]
fn malformed_documents_are_parse_errors() {
    let (service, _) = service();

    let err = convert_document(
        "docker-compose.yml",
        b"services: [",
        &PathBuf::from("/srv/app"),
        &service,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::Parse {
            source: LoadError::Yaml(_),
            ..
        }
    ));

    let err = convert_document(
        "docker-compose.yml",
        b"version: '2'\nservices: {}\n",
        &PathBuf::from("/srv/app"),
        &service,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::Parse {
            source: LoadError::UnsupportedVersion(_),
            ..
        }
    ));
}
