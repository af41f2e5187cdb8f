use std::path::{Path, PathBuf};

use log::info;

use error::ConversionError;
use model::IntermediateApp;
use port::{ConfigDetails, ConfigFile, ConversionEvent, ConversionObserver, DocumentLoader};

pub mod convert;
pub mod error;
pub mod labels;
pub mod mapping;
pub mod model;
pub mod naming;
pub mod port;
pub mod source;
pub mod workdir;

pub struct ConversionService {
    pub document_loader: Box<dyn DocumentLoader + 'static + Sync + Send>,
    pub observer: Box<dyn ConversionObserver + 'static + Sync + Send>,
}

/// Convert a compose file to the intermediate model.
///
/// Only the first file is read, the others are reported to the observer
/// and ignored.
pub fn convert(
    files: &[PathBuf],
    service: &ConversionService,
) -> Result<IntermediateApp, ConversionError> {
    let working_dir = workdir::compose_file_dir(files)?;

    if files.len() > 1 {
        service.observer.notify(ConversionEvent::ExtraFilesIgnored {
            files: files[1..].to_vec(),
        });
    }

    let file = &files[0];
    let raw = std::fs::read(file).map_err(|e| {
        ConversionError::io(format!("reading compose file {}", file.display()), e)
    })?;

    convert_document(&file.to_string_lossy(), &raw, &working_dir, service)
}

/// Convert the content of a single compose file
pub fn convert_document(
    filename: &str,
    raw: &[u8],
    working_dir: &Path,
    service: &ConversionService,
) -> Result<IntermediateApp, ConversionError> {
    let loader = &service.document_loader;

    let config = loader
        .parse(raw)
        .map_err(|e| ConversionError::parse(format!("parsing compose file {filename}"), e))?;

    let config = loader
        .load(ConfigDetails {
            working_dir: working_dir.to_path_buf(),
            config_files: vec![ConfigFile {
                filename: filename.to_string(),
                config,
            }],
            environment: None,
        })
        .map_err(|e| ConversionError::parse(format!("loading compose file {filename}"), e))?;

    let app = mapping::map_services(&config, service.observer.as_ref())?;
    info!(
        "Converted {} service(s) from {}",
        app.service_configs.len(),
        filename
    );
    Ok(app)
}
