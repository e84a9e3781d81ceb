use crate::DeliveryResult;
use async_trait::async_trait;
use fhir::PatientResource;

/// A downstream destination for FHIR Patient records.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Write one record to `stream`.
    async fn write(&self, stream: &str, patient: &PatientResource) -> DeliveryResult<()>;
}

/// Integration-ready stand-in for the real destination: logs the record and succeeds.
#[derive(Clone, Debug, Default)]
pub struct SimulatedSink;

#[async_trait]
impl DeliverySink for SimulatedSink {
    async fn write(&self, stream: &str, patient: &PatientResource) -> DeliveryResult<()> {
        tracing::info!(
            "Delivered FHIR Patient (simulated) (mrn={}, stream={stream})",
            patient.mrn().unwrap_or("UNKNOWN")
        );
        Ok(())
    }
}
