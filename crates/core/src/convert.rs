//! Admission record → FHIR Patient mapping.

use crate::admission::AdmissionRecord;
use fhir::{Patient, PatientData, PatientResource};

/// Map an admission record onto a FHIR Patient resource.
///
/// Total and deterministic: the same record always yields the same resource.
pub fn to_fhir_patient(record: &AdmissionRecord) -> PatientResource {
    let parsed = &record.parsed;
    let data = PatientData {
        patient_id: parsed.patient_id.clone(),
        family: parsed.family_name.clone(),
        given: parsed.given_name.clone(),
        gender_code: parsed.gender.clone(),
        dob: parsed.dob.clone(),
        address: parsed.address.clone(),
        phone: parsed.phone.clone(),
        episode_status: record.episode_status.clone(),
        soc_roc_completed: record.soc_roc_completed,
        eob_closed_workflow: record.eob_closed_workflow,
        admit_event_timestamp: Some(record.admit_event_timestamp),
    };

    let resource = Patient::build(&data);
    tracing::debug!(
        "Converted admission to FHIR Patient (mrn={})",
        resource.mrn().unwrap_or("UNKNOWN")
    );
    resource
}
