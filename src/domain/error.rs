use thiserror::Error;

/// Failure of a whole conversion call, tagged with the stage that produced it
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: LoadError,
    },

    #[error("{context}: label {label:?}: {source}")]
    Mapping {
        context: String,
        label: String,
        #[source]
        source: MappingError,
    },
}

impl ConversionError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn parse(context: impl Into<String>, source: LoadError) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }
}

/// A directive label holds a value outside of its recognized set
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("unknown value {0:?}, supported values are 'NodePort, ClusterIP or LoadBalancer'")]
    UnknownServiceType(String),
}

/// Errors raised by a [`DocumentLoader`](super::port::DocumentLoader)
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid compose file: {0}")]
    Schema(String),

    #[error("unsupported compose file version {0:?}, only 3.x is supported")]
    UnsupportedVersion(String),

    #[error("{0} is not supported in compose file version 3")]
    Unsupported(String),

    #[error("no config files to load")]
    NoConfigFiles,
}

impl LoadError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }
}
