//! FHIR Patient wire model and translation helpers.
//!
//! Responsibilities:
//! - Define a flat domain-level carrier ([`PatientData`]) for callers
//! - Define a strict wire model ([`PatientResource`]) for JSON serialisation/deserialisation
//! - Translate the carrier into the wire model, applying the hospice mapping rules
//!
//! Notes:
//! - Only the Patient elements produced by the admission workflow are modelled
//! - Shape is constructed, not validated against a StructureDefinition

use crate::FhirError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Identifier system for medical record numbers.
pub const MRN_SYSTEM: &str = "http://hospital.org/mrn";

/// Extension URL carrying the episode status.
pub const EXT_EPISODE_STATUS: &str =
    "http://hospice.example.org/StructureDefinition/episode-status";
/// Extension URL carrying the SOC/ROC completion flag.
pub const EXT_SOC_ROC_COMPLETED: &str =
    "http://hospice.example.org/StructureDefinition/soc-roc-completed";
/// Extension URL carrying the EOB workflow closure flag.
pub const EXT_EOB_WORKFLOW_CLOSED: &str =
    "http://hospice.example.org/StructureDefinition/eob-workflow-closed";
/// Extension URL carrying the admit event timestamp.
pub const EXT_ADMIT_TIMESTAMP: &str =
    "http://hospice.example.org/StructureDefinition/admit-timestamp";

const RESOURCE_TYPE: &str = "Patient";
const UNKNOWN_ID: &str = "UNKNOWN";
const UNKNOWN_NAME: &str = "Unknown";

// ============================================================================
// Public domain-level types
// ============================================================================

/// Domain-level carrier for a patient admission (flat structure).
///
/// Empty strings mean "not supplied"; [`Patient::build`] substitutes defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientData {
    /// Medical record number.
    pub patient_id: String,

    /// Family name (surname).
    pub family: String,

    /// Given name.
    pub given: String,

    /// HL7 administrative sex code (`M`, `F`, ...), any case.
    pub gender_code: String,

    /// Date of birth in HL7 form (`YYYYMMDD...`).
    pub dob: String,

    /// Single-line home address.
    pub address: String,

    /// Home phone number.
    pub phone: String,

    /// Hospice episode status.
    pub episode_status: String,

    /// Whether the SOC/ROC visit is complete.
    pub soc_roc_completed: bool,

    /// Whether the hospice EOB workflow is closed.
    pub eob_closed_workflow: bool,

    /// When the admit event was processed.
    pub admit_event_timestamp: Option<DateTime<Utc>>,
}

/// Purpose of a human name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameUse {
    /// Usual/preferred name.
    Usual,
    /// Official name.
    Official,
    /// Temporary name.
    Temp,
    /// Nickname or informal name.
    Nickname,
    /// Anonymous name.
    Anonymous,
    /// Old name (no longer in use).
    Old,
    /// Maiden name.
    Maiden,
}

/// FHIR administrative gender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

impl AdministrativeGender {
    /// Map an HL7 administrative sex code. Only `M` and `F` (any case) are recognised.
    pub fn from_hl7_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "M" => Self::Male,
            "F" => Self::Female,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Wire representation of a Patient resource.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PatientResource {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(default)]
    pub identifier: Vec<Identifier>,

    #[serde(default)]
    pub name: Vec<HumanName>,

    pub gender: AdministrativeGender,

    #[serde(rename = "birthDate", default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    pub active: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
}

impl PatientResource {
    /// First non-empty identifier value.
    pub fn mrn(&self) -> Option<&str> {
        self.identifier
            .iter()
            .filter_map(|i| i.value.as_deref())
            .find(|v| !v.is_empty())
    }

    /// Extension by URL.
    pub fn find_extension(&self, url: &str) -> Option<&Extension> {
        self.extension.iter().find(|e| e.url == url)
    }
}

/// Wire representation of an identifier.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Identifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Wire representation of a human name.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HumanName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,

    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_type: Option<NameUse>,
}

/// Wire representation of an address.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Address {
    pub text: String,

    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,
}

/// Wire representation of a contact point.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContactPoint {
    pub system: String,

    pub value: String,

    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,
}

/// Wire representation of a simple-valued extension.
///
/// Exactly one `value*` element is set by the constructors.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Extension {
    pub url: String,

    #[serde(rename = "valueString", default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,

    #[serde(rename = "valueBoolean", default, skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,

    #[serde(rename = "valueDateTime", default, skip_serializing_if = "Option::is_none")]
    pub value_date_time: Option<String>,
}

impl Extension {
    fn empty(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            value_string: None,
            value_boolean: None,
            value_date_time: None,
        }
    }

    pub fn string(url: &str, value: impl Into<String>) -> Self {
        Self {
            value_string: Some(value.into()),
            ..Self::empty(url)
        }
    }

    pub fn boolean(url: &str, value: bool) -> Self {
        Self {
            value_boolean: Some(value),
            ..Self::empty(url)
        }
    }

    pub fn date_time(url: &str, value: Option<DateTime<Utc>>) -> Self {
        Self {
            value_date_time: value.map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            ..Self::empty(url)
        }
    }
}

// ============================================================================
// Public Patient operations
// ============================================================================

/// Patient resource operations.
///
/// This is a zero-sized type used for namespacing patient-related operations.
pub struct Patient;

impl Patient {
    /// Build a Patient resource from flat admission data.
    ///
    /// Never fails: every optional element has a default or is omitted.
    pub fn build(data: &PatientData) -> PatientResource {
        let extension = vec![
            Extension::string(
                EXT_EPISODE_STATUS,
                non_empty_or(&data.episode_status, "CURRENT"),
            ),
            Extension::boolean(EXT_SOC_ROC_COMPLETED, data.soc_roc_completed),
            Extension::boolean(EXT_EOB_WORKFLOW_CLOSED, data.eob_closed_workflow),
            Extension::date_time(EXT_ADMIT_TIMESTAMP, data.admit_event_timestamp),
        ];

        PatientResource {
            resource_type: RESOURCE_TYPE.to_owned(),
            identifier: vec![Identifier {
                system: Some(MRN_SYSTEM.to_owned()),
                value: Some(non_empty_or(&data.patient_id, UNKNOWN_ID)),
            }],
            name: vec![HumanName {
                family: Some(non_empty_or(&data.family, UNKNOWN_NAME)),
                given: vec![non_empty_or(&data.given, UNKNOWN_NAME)],
                use_type: Some(NameUse::Official),
            }],
            gender: AdministrativeGender::from_hl7_code(&data.gender_code),
            birth_date: format_birth_date(&data.dob),
            address: optional_text(&data.address)
                .map(|text| Address {
                    text,
                    use_type: Some("home".into()),
                })
                .into_iter()
                .collect(),
            telecom: optional_text(&data.phone)
                .map(|value| ContactPoint {
                    system: "phone".into(),
                    value,
                    use_type: Some("home".into()),
                })
                .into_iter()
                .collect(),
            active: true,
            extension,
        }
    }

    /// Parse a Patient resource from JSON text.
    ///
    /// This uses `serde_path_to_error` to surface the path (e.g. `name.0.given`) of the failing
    /// field when the JSON does not match the wire schema.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the JSON does not represent a valid Patient resource,
    /// - any field has an unexpected type,
    /// - any unknown keys are present (due to `#[serde(deny_unknown_fields)]`),
    /// - resourceType is not "Patient".
    pub fn parse(json_text: &str) -> Result<PatientResource, FhirError> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);

        let resource =
            match serde_path_to_error::deserialize::<_, PatientResource>(&mut deserializer) {
                Ok(parsed) => parsed,
                Err(err) => {
                    let path = err.path().to_string();
                    let source = err.into_inner();
                    let path = if path.is_empty() || path == "." {
                        "<root>"
                    } else {
                        path.as_str()
                    };
                    return Err(FhirError::Translation(format!(
                        "Patient schema mismatch at {path}: {source}"
                    )));
                }
            };

        if resource.resource_type != RESOURCE_TYPE {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Patient', got '{}'",
                resource.resource_type
            )));
        }

        Ok(resource)
    }

    /// Render a Patient resource as pretty-printed JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Serialization`] if serialisation fails.
    pub fn render(resource: &PatientResource) -> Result<String, FhirError> {
        serde_json::to_string_pretty(resource).map_err(FhirError::Serialization)
    }
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn non_empty_or(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_owned()
    } else {
        value.to_owned()
    }
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// `YYYYMMDD...` → `YYYY-MM-DD`; shorter values pass through; empty is omitted.
fn format_birth_date(dob: &str) -> Option<String> {
    let dob = dob.trim();
    if dob.is_empty() {
        return None;
    }
    if dob.len() < 8 {
        return Some(dob.to_owned());
    }
    match (dob.get(0..4), dob.get(4..6), dob.get(6..8)) {
        (Some(year), Some(month), Some(day)) => Some(format!("{year}-{month}-{day}")),
        _ => Some(dob.to_owned()),
    }
}
