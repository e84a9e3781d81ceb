//! Wire types for the ingest endpoints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Message returned with every successful ingest.
pub const INGEST_SUCCESS_MESSAGE: &str = "HL7 ADT A01 processed successfully";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub status: String,
    pub service: String,
}

/// JSON envelope around a raw HL7 message.
///
/// The optional keys are passed to the admission workflow as upstream attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngestJsonReq {
    #[serde(default)]
    pub hl7_message: Option<String>,
    #[serde(default)]
    pub soc_roc_type: Option<String>,
    #[serde(default)]
    pub acuity_level: Option<String>,
    #[serde(default)]
    pub mrn: Option<String>,
}

impl IngestJsonReq {
    /// Non-empty optional keys, by attribute name.
    pub fn attributes(&self) -> BTreeMap<String, String> {
        [
            ("mrn", &self.mrn),
            ("soc_roc_type", &self.soc_roc_type),
            ("acuity_level", &self.acuity_level),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (key.to_owned(), v.to_owned()))
        })
        .collect()
    }
}

/// Workflow summary returned alongside the FHIR Patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdmissionDetails {
    pub episode_status: String,
    pub hospice_eob_event: i64,
    pub hospice_eob_stage: i64,
    pub soc_roc_completed: bool,
    pub eob_closed_workflow: bool,
}

/// Result of forwarding the Patient downstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryReport {
    /// `success`, `failed` or `skipped`.
    pub status: String,
    pub mrn: String,
    pub stream: String,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IngestRes {
    pub status: String,
    pub message: String,
    /// FHIR R4 Patient resource.
    #[schema(value_type = Object)]
    pub fhir_patient: serde_json::Value,
    pub admission_details: AdmissionDetails,
    pub delivery: DeliveryReport,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_attributes_skip_blank_values() {
        let req: IngestJsonReq = serde_json::from_str(
            r#"{"hl7_message": "MSH|", "mrn": "M1", "soc_roc_type": " ", "acuity_level": "HIGH"}"#,
        )
        .unwrap();

        let attributes = req.attributes();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes["mrn"], "M1");
        assert_eq!(attributes["acuity_level"], "HIGH");
    }

    #[test]
    fn envelope_fields_are_optional() {
        let req: IngestJsonReq = serde_json::from_str("{}").unwrap();
        assert!(req.hl7_message.is_none());
        assert!(req.attributes().is_empty());
    }
}
