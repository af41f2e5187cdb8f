use itertools::Itertools;
use log::{info, warn};

use crate::domain::port::{ConversionEvent, ConversionObserver};

/// Reports conversion events through the `log` facade
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl ConversionObserver for LogObserver {
    fn notify(&self, event: ConversionEvent) {
        match event {
            ConversionEvent::ServiceRenamed { from, to } => {
                info!("Service name in docker-compose has been changed from {from:?} to {to:?}")
            }
            ConversionEvent::ExtraFilesIgnored { files } => warn!(
                "Only the first compose file is read, ignoring {}",
                files.iter().map(|file| file.display()).join(", ")
            ),
        }
    }
}
