use std::collections::BTreeMap;

use super::error::{ConversionError, MappingError};
use super::model::{ServiceRecord, ServiceType};

/// Label selecting how the service is exposed
pub const LABEL_SERVICE_TYPE: &str = "kompose.service.type";

/// Label requesting an externally reachable endpoint for the service
pub const LABEL_SERVICE_EXPOSE: &str = "kompose.service.expose";

type LabelHandler = fn(&str, &mut ServiceRecord) -> Result<(), MappingError>;

/// Labels that change how a service is converted. Any other label is only
/// copied to the annotations.
static LABEL_HANDLERS: &[(&str, LabelHandler)] = &[
    (LABEL_SERVICE_TYPE, handle_service_type),
    (LABEL_SERVICE_EXPOSE, handle_service_expose),
];

fn handle_service_type(value: &str, record: &mut ServiceRecord) -> Result<(), MappingError> {
    record.service_type = Some(value.parse::<ServiceType>()?);
    Ok(())
}

fn handle_service_expose(value: &str, record: &mut ServiceRecord) -> Result<(), MappingError> {
    record.expose_service = value.to_lowercase();
    Ok(())
}

fn handler_for(key: &str) -> Option<LabelHandler> {
    LABEL_HANDLERS
        .iter()
        .find(|(label, _)| *label == key)
        .map(|(_, handler)| *handler)
}

/// Apply the directive labels of a service to its record
pub fn apply_labels(
    labels: &BTreeMap<String, String>,
    record: &mut ServiceRecord,
) -> Result<(), ConversionError> {
    for (key, value) in labels {
        if let Some(handler) = handler_for(key) {
            handler(value, record).map_err(|source| ConversionError::Mapping {
                context: "applying service labels failed".to_string(),
                label: key.clone(),
                source,
            })?;
        }
    }
    Ok(())
}
