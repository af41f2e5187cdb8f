use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use log::error;
use serde::Deserialize;

use crate::domain::{
    convert_document, error::ConversionError, model::IntermediateApp, ConversionService,
};

#[derive(Debug, Default, Deserialize)]
pub struct ConvertParams {
    /// Directory relative volume paths are resolved against
    pub working_dir: Option<PathBuf>,
    pub filename: Option<String>,
}

pub fn router(conversion: ConversionService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/convert", post(convert_application))
        .with_state(Arc::new(conversion))
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn convert_application(
    State(service): State<Arc<ConversionService>>,
    Query(params): Query<ConvertParams>,
    body: Bytes,
) -> Result<Json<IntermediateApp>, (StatusCode, String)> {
    let filename = params
        .filename
        .unwrap_or_else(|| "docker-compose.yml".to_string());
    let working_dir = match params.working_dir {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(|e| {
            error!("Error during convert_application {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Something went wrong: {e}"),
            )
        })?,
    };

    convert_document(&filename, &body, &working_dir, service.as_ref())
        .map(Json)
        .map_err(|e| {
            error!("Error during convert_application {:?}", e);
            let status = match e {
                ConversionError::Parse { .. } | ConversionError::Mapping { .. } => {
                    StatusCode::BAD_REQUEST
                }
                ConversionError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, format!("Conversion failed: {e}"))
        })
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::infra::{compose::ComposeLoader, observer::LogObserver};

    fn app() -> Router {
        router(ConversionService {
            document_loader: Box::new(ComposeLoader),
            observer: Box::new(LogObserver),
        })
    }

    fn convert_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/convert?working_dir=/srv/app")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_convert_valid_document() {
        let response = app()
            .oneshot(convert_request(
                "version: \"3\"\nservices:\n  web:\n    image: nginx\n",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["loaded_from"], "compose");
        assert_eq!(json["service_configs"]["web"]["image"], "nginx");
    }

    #[tokio::test]
    async fn test_convert_unknown_service_type_is_bad_request() {
        let response = app()
            .oneshot(convert_request(
                "version: \"3\"\nservices:\n  web:\n    image: nginx\n    labels:\n      kompose.service.type: bogus\n",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_convert_malformed_yaml_is_bad_request() {
        let response = app()
            .oneshot(convert_request("services: ["))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
