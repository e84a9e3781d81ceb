//! HL7 v2 boundary support for hospice admissions.
//!
//! This crate turns ER7-encoded HL7 v2 text into typed values:
//! - `message`: segment tokenizer (raw text → ordered segments and fields)
//! - `field`: total positional accessors for fields and `^` components
//! - `adt`: ADT^A01 field mapping into a flat [`ParsedAdmission`]
//!
//! Only the subset of the grammar needed for ADT^A01 admissions is supported. Repetitions,
//! escape sequences and sub-components are passed through as plain text.

pub mod adt;
pub mod field;
pub mod message;

pub use adt::{parse_adt_a01, ParsedAdmission};
pub use field::{component_at, field_at};
pub use message::{Message, Segment};

/// Errors returned by the `hl7` boundary crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Hl7Error {
    #[error("empty message")]
    Empty,

    #[error("missing required segment {0}")]
    MissingSegment(String),
}

/// Type alias for Results that can fail with an [`Hl7Error`].
pub type Hl7Result<T> = Result<T, Hl7Error>;
