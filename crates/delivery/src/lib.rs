//! # Hospice Delivery
//!
//! Forwards FHIR Patient resources to the downstream data pipeline.
//!
//! The gateway validates the resource, then hands it to a [`DeliverySink`] with a bounded number
//! of attempts, a per-attempt timeout and a fixed backoff. Failures are folded into a
//! [`DeliveryOutcome`] and never propagated, so ingest can report success of the earlier stages
//! independently of delivery.

pub mod gateway;
pub mod sink;

pub use gateway::{DeliveryGateway, DeliveryOutcome, DeliveryStatus};
pub use sink::{DeliverySink, SimulatedSink};

/// Errors raised while delivering a single resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery attempt timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("destination error: {0}")]
    Destination(String),

    #[error("invalid FHIR Patient resource: {0}")]
    InvalidResource(String),
}

pub type DeliveryResult<T> = std::result::Result<T, DeliveryError>;
