//! Admission pipeline service: parse → transform → convert.

use crate::admission::{transform, AdmissionRecord};
use crate::convert::to_fhir_patient;
use crate::{AdmissionResult, CoreConfig};
use chrono::{DateTime, Utc};
use fhir::PatientResource;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Output of a successful admission: the workflow record and its FHIR Patient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Admission {
    pub record: AdmissionRecord,
    pub patient: PatientResource,
}

/// Pure admission operations. Holds only read-only configuration.
#[derive(Clone, Debug)]
pub struct AdmissionService {
    cfg: Arc<CoreConfig>,
}

impl AdmissionService {
    /// Creates a new instance of AdmissionService.
    ///
    /// # Arguments
    /// * `cfg` - Admission workflow configuration resolved at startup.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Run the full synchronous pipeline on raw HL7 text.
    ///
    /// # Arguments
    /// * `raw` - ER7-encoded ADT^A01 message text.
    /// * `attributes` - Upstream-supplied values merged into the parsed admission
    ///   (e.g. `mrn`, `soc_roc_type`, `acuity_level`).
    /// * `now` - The instant this admission is processed; used for every workflow timestamp.
    ///
    /// # Errors
    /// Returns [`crate::AdmissionError::Parse`] for empty input or missing `MSH`/`PID`, and
    /// [`crate::AdmissionError::Validation`] when no patient identifier resolves.
    pub fn admit(
        &self,
        raw: &str,
        attributes: BTreeMap<String, String>,
        now: DateTime<Utc>,
    ) -> AdmissionResult<Admission> {
        let mut parsed = hl7::parse_adt_a01(raw)?;
        parsed.attributes.extend(attributes);

        let record = transform(parsed, &self.cfg, now)?;
        let patient = to_fhir_patient(&record);
        Ok(Admission { record, patient })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AdmissionError;
    use chrono::TimeZone;
    use fhir::AdministrativeGender;
    use hl7::Hl7Error;

    const SAMPLE: &str = "MSH|^~\\&|AccMgr|1|||20050110045504||ADT^A01|599102|P|2.3|||\n\
EVN|A01|20050110045502|||||\n\
PID|1||10006579^^^1^MRN^1||DUCK^DONALD^D||19241010|M||1|111 DUCK ST^^FOWL^CA^999990000^^M|1|8885551212|8885551212|1|2||40007716^^^AccMgr^VN^1|123121234|||||||||||NO\n\
NK1|1|DUCK^HUEY|SO|3583 DUCK RD^^FOWL^CA^999990000|8885552222||Y||||||||||||||\n\
PV1|1|I|PREOP^101^1^1^^^S|3|||37^DISNEY^WALT^^^^^^AccMgr^^^^CI|||01||||1|||37^DISNEY^WALT^^^^^^AccMgr^^^^CI|2|40007716^^^AccMgr^VN|4|||||||||||||||||||1||G|||20050110045253||||||\n\
GT1|1|8291|DUCK^DONALD^D||111^DUCK ST^^FOWL^CA^999990000|8885551212||19241010|M||1|123121234||||#Cartoon Ducks Inc|111^DUCK ST^^FOWL^CA^999990000|8885551212||PT|\n\
DG1|1|I9|71596^OSTEOARTHROS NOS-L/LEG ^I9|OSTEOARTHROS NOS-L/LEG ||A|\n\
IN1|1|MEDICARE|3|MEDICARE|||||||Cartoon Ducks Inc|19891001|||4|DUCK^DONALD^D|1|19241010|111^DUCK ST^^FOWL^CA^999990000|||||||||||||||||123121234A||||||PT|M|111 DUCK ST^^FOWL^CA^999990000|||||8291\n";

    fn service() -> AdmissionService {
        AdmissionService::new(Arc::new(CoreConfig::default()))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn admits_sample_message() {
        let admission = service().admit(SAMPLE, BTreeMap::new(), now()).unwrap();

        assert_eq!(admission.record.episode_status, "CURRENT");
        assert_eq!(admission.record.hospice_eob_event, 210);
        assert_eq!(admission.record.hospice_eob_stage, 2029);
        assert_eq!(admission.record.parsed.admit_datetime, "2005-01-10T04:52:53");
        assert_eq!(admission.record.parsed.raw_hl7, SAMPLE);

        assert_eq!(admission.patient.mrn(), Some("10006579"));
        assert_eq!(admission.patient.gender, AdministrativeGender::Male);
        assert_eq!(admission.patient.birth_date.as_deref(), Some("1924-10-10"));
    }

    #[test]
    fn merges_upstream_attributes() {
        let attributes = BTreeMap::from([
            ("soc_roc_type".to_string(), "ROC".to_string()),
            ("acuity_level".to_string(), "MEDIUM".to_string()),
        ]);
        let admission = service().admit(SAMPLE, attributes, now()).unwrap();
        assert_eq!(admission.record.soc_roc_type, "ROC");
        assert_eq!(admission.record.acuity_level, "MEDIUM");
    }

    #[test]
    fn identical_requests_render_identically() {
        let a = service().admit(SAMPLE, BTreeMap::new(), now()).unwrap();
        let b = service().admit(SAMPLE, BTreeMap::new(), now()).unwrap();
        assert_eq!(
            fhir::Patient::render(&a.patient).unwrap(),
            fhir::Patient::render(&b.patient).unwrap()
        );
    }

    #[test]
    fn surfaces_parse_errors() {
        let err = service().admit("   ", BTreeMap::new(), now()).unwrap_err();
        assert_eq!(err, AdmissionError::Parse(Hl7Error::Empty));
        assert_eq!(err.to_string(), "empty message");

        let err = service()
            .admit("MSH|^~\\&|X\rPV1|1", BTreeMap::new(), now())
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required segment PID");
    }
}
