//! ADT^A01 (admit/visit notification) field mapping.
//!
//! Responsibilities:
//! - Require `MSH` and `PID`, read the first occurrence of `MSH`, `PID`, `PV1` and `DG1`
//! - Decode the composite fields used by the hospice admission workflow
//! - Substitute documented defaults for missing values
//!
//! Notes:
//! - `dob` is kept in HL7 form (`YYYYMMDD...`); formatting is left to the FHIR boundary
//! - `admit_datetime` is reformatted to ISO 8601 on a best-effort basis

use crate::field::{component_at, field_at, optional_field_at};
use crate::message::{Message, Segment};
use crate::Hl7Result;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Message type this parser produces.
pub const ADT_A01: &str = "A01";

/// Expected prefix of MSH-9.
const EXPECTED_MESSAGE_TYPE: &str = "ADT^A01";

const UNKNOWN_ID: &str = "UNKNOWN";
const UNKNOWN_NAME: &str = "Unknown";

/// Flat admission data extracted from an ADT^A01 message.
///
/// Every field is a string; absent source values become `""` except for the identifier and
/// name fields, which default to `UNKNOWN` / `Unknown`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAdmission {
    pub patient_id: String,
    pub family_name: String,
    pub given_name: String,
    /// Date of birth in HL7 form (`YYYYMMDD...`).
    pub dob: String,
    /// Upper-cased administrative sex code (PID-8).
    pub gender: String,
    pub address: String,
    pub phone: String,
    /// Admit date/time, ISO 8601 where the HL7 value could be parsed.
    pub admit_datetime: String,
    pub primary_diagnosis: String,
    /// Always [`ADT_A01`].
    pub message_type: String,
    /// The original input text, byte for byte.
    pub raw_hl7: String,

    /// Extra attributes supplied alongside the message (e.g. `mrn`, `soc_roc_type`,
    /// `acuity_level`). The parser never populates this.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

impl ParsedAdmission {
    /// Non-empty attribute value by key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Parse an ADT^A01 message into a [`ParsedAdmission`].
///
/// # Arguments
///
/// * `raw` - ER7 text; segments separated by `\r`, `\n` or `\r\n`.
///
/// # Errors
///
/// Returns [`crate::Hl7Error`] if:
/// - the message is empty or whitespace only,
/// - `MSH` or `PID` is missing.
///
/// A message type other than `ADT^A01` is logged and otherwise accepted.
pub fn parse_adt_a01(raw: &str) -> Hl7Result<ParsedAdmission> {
    tracing::info!("Starting HL7 ADT A01 message parsing");

    let result = Message::parse(raw).and_then(|message| extract(&message, raw));
    match &result {
        Ok(parsed) => tracing::info!(
            "Successfully parsed ADT A01 for patient: {}, {}",
            parsed.family_name,
            parsed.given_name
        ),
        Err(e) => tracing::error!("Failed to parse HL7 message: {e}"),
    }
    result
}

fn extract(message: &Message, raw: &str) -> Hl7Result<ParsedAdmission> {
    let msh = message.require("MSH")?;
    let pid = message.require("PID")?;
    let pv1 = message.first("PV1");
    let dg1 = message.first("DG1");

    let message_type = field_at(msh, 9);
    if !message_type.starts_with(EXPECTED_MESSAGE_TYPE) {
        tracing::warn!("Expected ADT^A01 message type, got '{message_type}'");
    }

    let patient_id = component_at(field_at(pid, 3), 0);
    let name = field_at(pid, 5);

    let admit_raw = match optional_field_at(pv1, 44) {
        "" => optional_field_at(pv1, 2),
        preferred => preferred,
    };

    Ok(ParsedAdmission {
        patient_id: or_placeholder(patient_id, UNKNOWN_ID),
        family_name: or_placeholder(component_at(name, 0), UNKNOWN_NAME),
        given_name: or_placeholder(component_at(name, 1), UNKNOWN_NAME),
        dob: field_at(pid, 7).to_owned(),
        gender: field_at(pid, 8).to_uppercase(),
        address: format_address(pid),
        phone: field_at(pid, 13).to_owned(),
        admit_datetime: format_hl7_datetime(admit_raw),
        primary_diagnosis: optional_field_at(dg1, 3).to_owned(),
        message_type: ADT_A01.to_owned(),
        raw_hl7: raw.to_owned(),
        attributes: BTreeMap::new(),
    })
}

fn or_placeholder(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_owned()
    } else {
        value.to_owned()
    }
}

/// PID-11 (XAD) as `street, city, state, zip`, skipping empty parts.
fn format_address(pid: &Segment) -> String {
    let raw = field_at(pid, 11);
    [0, 2, 3, 4]
        .into_iter()
        .map(|i| component_at(raw, i))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reformat an HL7 `TS` value into ISO 8601.
///
/// 14+ characters are read as `YYYYMMDDHHMMSS`, 8+ as `YYYYMMDD`. Anything shorter, or anything
/// that does not parse, is returned unchanged.
pub fn format_hl7_datetime(value: &str) -> String {
    if value.len() >= 14 {
        if let Some(dt) = value
            .get(..14)
            .and_then(|head| NaiveDateTime::parse_from_str(head, "%Y%m%d%H%M%S").ok())
            // chrono reads second 60 as a leap second; ISO 8601 output has no such value.
            .filter(|dt| dt.nanosecond() < 1_000_000_000)
        {
            return dt.format("%Y-%m-%dT%H:%M:%S").to_string();
        }
    } else if value.len() >= 8 {
        if let Some(date) = value
            .get(..8)
            .and_then(|head| NaiveDate::parse_from_str(head, "%Y%m%d").ok())
        {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    if !value.is_empty() {
        tracing::debug!("Could not parse HL7 datetime: {value}");
    }
    value.to_owned()
}
