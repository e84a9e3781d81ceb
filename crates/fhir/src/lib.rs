//! FHIR wire/boundary support for hospice admissions.
//!
//! This crate provides **wire models** and **translation helpers** for the FHIR resources the
//! admission workflow emits:
//! - JSON Patient resources (identifier, name, demographics, hospice extensions)
//!
//! This crate focuses on:
//! - FHIR shape construction (no profile validation)
//! - serialisation/deserialisation
//! - translation between flat domain carriers and wire structs

pub mod patient;

// Re-export facades
pub use patient::Patient;

// Re-export public domain-level and wire types
pub use patient::{
    Address, AdministrativeGender, ContactPoint, Extension, HumanName, Identifier, NameUse,
    PatientData, PatientResource,
};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("failed to serialise resource: {0}")]
    Serialization(serde_json::Error),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
