//! # Hospice Core
//!
//! Core business logic for hospice ADT^A01 admissions.
//!
//! This crate contains the pure, synchronous stages of the ingest pipeline:
//! - Admission transform (episode, EOB and SOC/ROC workflow rules)
//! - Conversion of admission records into FHIR Patient resources
//! - Startup-resolved configuration for the workflow and for delivery
//!
//! **No API concerns**: HTTP servers, delivery transports and CLIs belong in `api-rest`,
//! `hospice-delivery` and `hospice-cli`.

pub mod admission;
pub mod config;
pub mod constants;
pub mod convert;
pub mod error;
pub mod service;

pub use admission::{resolve_patient_identifier, transform, AdmissionRecord};
pub use config::{CoreConfig, DeliveryConfig};
pub use convert::to_fhir_patient;
pub use error::{AdmissionError, AdmissionResult};
pub use service::{Admission, AdmissionService};
