use api_shared::ErrorRes;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hospice_core::AdmissionError;

/// Failures surfaced by the ingest endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Admission(#[from] AdmissionError),

    #[error("Error processing HL7 message: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) | ApiError::Admission(_) => {
                tracing::warn!("Rejected ingest request: {}", self);
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(_) => {
                tracing::error!("Internal error: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorRes {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn detail(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorRes = serde_json::from_slice(&bytes).unwrap();
        body.detail
    }

    #[tokio::test]
    async fn internal_failures_map_to_500() {
        let response = ApiError::Internal("broken pipe".into()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let text = detail(response).await;
        assert!(text.starts_with("Error processing HL7 message: "));
        assert!(text.ends_with("broken pipe"));
    }

    #[tokio::test]
    async fn caller_errors_map_to_400() {
        let response = ApiError::Admission(AdmissionError::Validation("no id".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(detail(response).await, "no id");

        let response = ApiError::BadRequest("Empty HL7 message".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(detail(response).await, "Empty HL7 message");
    }
}
