use std::collections::HashMap;
use std::path::PathBuf;

use super::error::LoadError;
use super::source::ComposeConfig;

/// Raw document tree of a single compose file
pub type DocumentTree = serde_yaml::Mapping;

pub struct ConfigFile {
    pub filename: String,
    pub config: DocumentTree,
}

pub struct ConfigDetails {
    pub working_dir: PathBuf,
    pub config_files: Vec<ConfigFile>,

    /// Variables used for interpolation, `None` lets the loader pick its own
    pub environment: Option<HashMap<String, String>>,
}

pub trait DocumentLoader {
    fn parse(&self, raw: &[u8]) -> Result<DocumentTree, LoadError>;

    fn load(&self, details: ConfigDetails) -> Result<ComposeConfig, LoadError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionEvent {
    /// A service name was changed to fit the target naming rules
    ServiceRenamed { from: String, to: String },

    /// Input files after the first one, which are not read
    ExtraFilesIgnored { files: Vec<PathBuf> },
}

pub trait ConversionObserver {
    fn notify(&self, event: ConversionEvent);
}
