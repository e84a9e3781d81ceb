//! # API REST
//!
//! REST API implementation for the hospice ADT ingest service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status mapping)
//!
//! Uses `api-shared` for wire types, `hospice-core` for the admission pipeline and
//! `hospice-delivery` for forwarding the resulting Patient.

#![warn(rust_2018_idioms)]

pub mod error;

use api_shared::{
    AdmissionDetails, DeliveryReport, ErrorRes, HealthRes, HealthService, IngestJsonReq,
    IngestRes, INGEST_SUCCESS_MESSAGE,
};
use axum::{body::Bytes, extract::State, response::Json, routing::get, routing::post, Router};
use hospice_core::{Admission, AdmissionService};
use hospice_delivery::{DeliveryGateway, DeliveryOutcome};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::Instrument;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::{ApiError, ApiResult};

/// Application state for the REST API server
///
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub admission_service: AdmissionService,
    pub gateway: Arc<DeliveryGateway>,
}

impl AppState {
    pub fn new(admission_service: AdmissionService, gateway: DeliveryGateway) -> Self {
        Self {
            admission_service,
            gateway: Arc::new(gateway),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hospice ADT A01 Integration Service",
        description = "Ingest HL7 ADT A01 (Admit) messages and convert to FHIR Patient resources"
    ),
    paths(health, ingest_patient, ingest_patient_json),
    components(schemas(
        HealthRes,
        IngestJsonReq,
        IngestRes,
        AdmissionDetails,
        DeliveryReport,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Build the ingest router with CORS and Swagger UI attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ingest/patient", post(ingest_patient))
        .route("/ingest/patient/json", post(ingest_patient_json))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used by monitoring and load balancers.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/ingest/patient",
    request_body(content = String, description = "Raw HL7 ADT A01 message", content_type = "text/plain"),
    responses(
        (status = 200, description = "Message processed", body = IngestRes),
        (status = 400, description = "Empty or malformed message", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Ingest a raw HL7 ADT^A01 message.
async fn ingest_patient(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<IngestRes>> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("ingest_patient", %request_id);

    async move {
        let raw = std::str::from_utf8(&body)
            .map_err(|e| ApiError::BadRequest(format!("HL7 message is not valid UTF-8: {e}")))?;
        if raw.trim().is_empty() {
            return Err(ApiError::BadRequest("Empty HL7 message".into()));
        }

        tracing::info!("Received HL7 message ({} bytes)", raw.len());
        ingest(&state, raw, BTreeMap::new()).await
    }
    .instrument(span)
    .await
}

#[utoipa::path(
    post,
    path = "/ingest/patient/json",
    request_body = IngestJsonReq,
    responses(
        (status = 200, description = "Message processed", body = IngestRes),
        (status = 400, description = "Missing, empty or malformed message", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Ingest an HL7 ADT^A01 message wrapped in a JSON envelope.
async fn ingest_patient_json(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<IngestRes>> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("ingest_patient_json", %request_id);

    async move {
        let req: IngestJsonReq = serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;

        let raw = req.hl7_message.as_deref().unwrap_or("");
        if raw.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "Missing 'hl7_message' field in JSON body".into(),
            ));
        }

        tracing::info!("Received JSON-wrapped HL7 message");
        ingest(&state, raw, req.attributes()).await
    }
    .instrument(span)
    .await
}

/// Shared pipeline for both ingest endpoints.
async fn ingest(
    state: &AppState,
    raw: &str,
    attributes: BTreeMap<String, String>,
) -> ApiResult<Json<IngestRes>> {
    let now = chrono::Utc::now();
    let Admission { record, patient } = state.admission_service.admit(raw, attributes, now)?;

    tracing::info!(
        "Admission processed (episode_status={}, soc_roc_completed={}, eob_closed_workflow={})",
        record.episode_status,
        record.soc_roc_completed,
        record.eob_closed_workflow
    );

    let fhir_patient =
        serde_json::to_value(&patient).map_err(|e| ApiError::Internal(e.to_string()))?;

    let outcome = state.gateway.send(&patient).await;

    Ok(Json(IngestRes {
        status: "success".into(),
        message: INGEST_SUCCESS_MESSAGE.into(),
        fhir_patient,
        admission_details: AdmissionDetails {
            episode_status: record.episode_status,
            hospice_eob_event: record.hospice_eob_event,
            hospice_eob_stage: record.hospice_eob_stage,
            soc_roc_completed: record.soc_roc_completed,
            eob_closed_workflow: record.eob_closed_workflow,
        },
        delivery: delivery_report(outcome),
    }))
}

fn delivery_report(outcome: DeliveryOutcome) -> DeliveryReport {
    DeliveryReport {
        status: outcome.status.as_str().into(),
        mrn: outcome.mrn,
        stream: outcome.stream,
        attempts: outcome.attempts,
        error: outcome.error,
    }
}
