use hl7::Hl7Error;

/// Failures of the parse → transform stages. Both are caller errors and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("{0}")]
    Parse(#[from] Hl7Error),

    #[error("{0}")]
    Validation(String),
}

pub type AdmissionResult<T> = std::result::Result<T, AdmissionError>;
