//! Hospice admit business rules.
//!
//! An ADT^A01 admit moves the hospice episode from `PENDING` to `CURRENT`, verifies the EOB
//! workflow stage, marks the SOC/ROC visit complete and closes the EOB workflow. The transform is
//! pure: the caller supplies the configuration and the instant the workflow ran.

use crate::config::CoreConfig;
use crate::constants::{
    ADMISSION_STATUS_ACTIVE, ATTR_ACUITY_LEVEL, ATTR_MRN, ATTR_PATIENT_IDENTIFIER,
    ATTR_SOC_ROC_TYPE, EPISODE_STATUS_CURRENT, EPISODE_STATUS_PENDING, UNKNOWN_VALUE,
};
use crate::{AdmissionError, AdmissionResult};
use chrono::{DateTime, Utc};
use hl7::ParsedAdmission;
use serde::Serialize;

/// Keys the record owns; upstream attributes with these names are superseded.
const RECORD_KEYS: &[&str] = &[
    "episode_status",
    "episode_previous_status",
    "hospice_eob_event",
    "hospice_eob_stage",
    "hospice_eob_workflow_verified",
    ATTR_SOC_ROC_TYPE,
    "soc_roc_completed",
    "soc_roc_completion_timestamp",
    "eob_closed_workflow",
    "workflow_closed_timestamp",
    "admit_event_timestamp",
    "admission_status",
    ATTR_ACUITY_LEVEL,
];

/// A parsed admission with the hospice workflow applied.
///
/// Serialises as one flat object: every parsed field followed by the workflow fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AdmissionRecord {
    #[serde(flatten)]
    pub parsed: ParsedAdmission,

    pub episode_status: String,
    pub episode_previous_status: String,
    pub hospice_eob_event: i64,
    pub hospice_eob_stage: i64,
    pub hospice_eob_workflow_verified: bool,
    pub soc_roc_type: String,
    pub soc_roc_completed: bool,
    pub soc_roc_completion_timestamp: DateTime<Utc>,
    pub eob_closed_workflow: bool,
    pub workflow_closed_timestamp: DateTime<Utc>,
    pub admit_event_timestamp: DateTime<Utc>,
    pub admission_status: String,
    pub acuity_level: String,
}

/// First non-empty of `mrn`, `patient_id`, `patient_identifier`.
pub fn resolve_patient_identifier(parsed: &ParsedAdmission) -> Option<&str> {
    parsed
        .attribute(ATTR_MRN)
        .or_else(|| non_empty(&parsed.patient_id))
        .or_else(|| parsed.attribute(ATTR_PATIENT_IDENTIFIER))
}

/// Apply the admit workflow to a parsed admission.
///
/// All three workflow timestamps are set to `now`.
///
/// # Errors
///
/// Returns [`AdmissionError::Validation`] if no patient identifier can be resolved.
pub fn transform(
    mut parsed: ParsedAdmission,
    cfg: &CoreConfig,
    now: DateTime<Utc>,
) -> AdmissionResult<AdmissionRecord> {
    let Some(mrn) = resolve_patient_identifier(&parsed).map(str::to_owned) else {
        tracing::error!("admission rejected: no patient identifier");
        return Err(AdmissionError::Validation(
            "missing required patient identifier (expected one of: mrn, patient_id, patient_identifier)"
                .into(),
        ));
    };

    let soc_roc_type = attribute_or_unknown(&parsed, ATTR_SOC_ROC_TYPE);
    let acuity_level = attribute_or_unknown(&parsed, ATTR_ACUITY_LEVEL);
    parsed
        .attributes
        .retain(|key, _| !RECORD_KEYS.contains(&key.as_str()));

    tracing::info!("Processing A01 admit event (mrn={mrn})");

    let record = AdmissionRecord {
        parsed,
        episode_status: EPISODE_STATUS_CURRENT.into(),
        episode_previous_status: EPISODE_STATUS_PENDING.into(),
        hospice_eob_event: cfg.hospice_eob_event(),
        hospice_eob_stage: cfg.hospice_eob_stage(),
        hospice_eob_workflow_verified: true,
        soc_roc_type,
        soc_roc_completed: true,
        soc_roc_completion_timestamp: now,
        eob_closed_workflow: true,
        workflow_closed_timestamp: now,
        admit_event_timestamp: now,
        admission_status: ADMISSION_STATUS_ACTIVE.into(),
        acuity_level,
    };

    tracing::info!("Episode status changed to CURRENT (mrn={mrn})");
    tracing::info!(
        "Hospice EOB verified (mrn={mrn}, event={}, stage={})",
        record.hospice_eob_event,
        record.hospice_eob_stage
    );
    tracing::info!(
        "SOC/ROC marked as completed (mrn={mrn}, type={})",
        record.soc_roc_type
    );
    tracing::info!("EOB workflow closed (mrn={mrn})");

    Ok(record)
}

fn attribute_or_unknown(parsed: &ParsedAdmission, key: &str) -> String {
    parsed
        .attribute(key)
        .unwrap_or(UNKNOWN_VALUE)
        .to_owned()
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    fn parsed(patient_id: &str) -> ParsedAdmission {
        ParsedAdmission {
            patient_id: patient_id.into(),
            family_name: "DUCK".into(),
            given_name: "DONALD".into(),
            message_type: "A01".into(),
            ..Default::default()
        }
    }

    #[test]
    fn applies_admit_workflow() {
        let record = transform(parsed("10006579"), &CoreConfig::default(), now()).unwrap();

        assert_eq!(record.episode_status, "CURRENT");
        assert_eq!(record.episode_previous_status, "PENDING");
        assert_eq!(record.hospice_eob_event, 210);
        assert_eq!(record.hospice_eob_stage, 2029);
        assert!(record.hospice_eob_workflow_verified);
        assert!(record.soc_roc_completed);
        assert!(record.eob_closed_workflow);
        assert_eq!(record.admission_status, "ACTIVE");
        assert_eq!(record.soc_roc_type, "UNKNOWN");
        assert_eq!(record.acuity_level, "UNKNOWN");
        assert_eq!(record.parsed.patient_id, "10006579");
        assert_eq!(record.parsed.family_name, "DUCK");
    }

    #[test]
    fn all_timestamps_are_the_injected_instant() {
        let record = transform(parsed("1"), &CoreConfig::default(), now()).unwrap();
        assert_eq!(record.soc_roc_completion_timestamp, now());
        assert_eq!(record.workflow_closed_timestamp, now());
        assert_eq!(record.admit_event_timestamp, now());
    }

    #[test]
    fn same_inputs_produce_same_record() {
        let a = transform(parsed("1"), &CoreConfig::default(), now()).unwrap();
        let b = transform(parsed("1"), &CoreConfig::default(), now()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn uses_configured_eob_values() {
        let record = transform(parsed("1"), &CoreConfig::new(300, 4000), now()).unwrap();
        assert_eq!(record.hospice_eob_event, 300);
        assert_eq!(record.hospice_eob_stage, 4000);
    }

    #[test]
    fn identifier_resolution_order() {
        let mut p = parsed("PID-ID");
        p.attributes.insert("patient_identifier".into(), "ALT".into());
        assert_eq!(resolve_patient_identifier(&p), Some("PID-ID"));

        p.attributes.insert("mrn".into(), "MRN-1".into());
        assert_eq!(resolve_patient_identifier(&p), Some("MRN-1"));

        let mut p = parsed("");
        p.attributes.insert("patient_identifier".into(), "ALT".into());
        assert_eq!(resolve_patient_identifier(&p), Some("ALT"));

        let mut p = parsed("");
        p.attributes.insert("mrn".into(), "".into());
        assert_eq!(resolve_patient_identifier(&p), None);
    }

    #[test]
    fn missing_identifier_is_a_validation_error() {
        let err = transform(parsed(""), &CoreConfig::default(), now()).unwrap_err();
        assert_eq!(
            err,
            AdmissionError::Validation(
                "missing required patient identifier (expected one of: mrn, patient_id, patient_identifier)"
                    .into()
            )
        );
    }

    #[test]
    fn workflow_attributes_come_from_upstream() {
        let mut p = parsed("1");
        p.attributes.insert("soc_roc_type".into(), "SOC".into());
        p.attributes.insert("acuity_level".into(), "HIGH".into());
        p.attributes.insert("mrn".into(), "MRN-9".into());

        let record = transform(p, &CoreConfig::default(), now()).unwrap();
        assert_eq!(record.soc_roc_type, "SOC");
        assert_eq!(record.acuity_level, "HIGH");
        assert_eq!(record.parsed.attribute("mrn"), Some("MRN-9"));
        assert!(record.parsed.attribute("soc_roc_type").is_none());
    }

    #[test]
    fn serialises_flat_without_duplicate_keys() {
        let mut p = parsed("1");
        p.attributes.insert("acuity_level".into(), "LOW".into());
        p.attributes.insert("mrn".into(), "MRN-9".into());
        let record = transform(p, &CoreConfig::default(), now()).unwrap();

        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text.matches("\"acuity_level\"").count(), 1);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["patient_id"], "1");
        assert_eq!(value["mrn"], "MRN-9");
        assert_eq!(value["acuity_level"], "LOW");
        assert_eq!(value["episode_status"], "CURRENT");
        assert_eq!(value["admit_event_timestamp"], "2024-03-01T12:30:00Z");
    }
}
