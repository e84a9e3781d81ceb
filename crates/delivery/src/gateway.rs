//! Bounded-retry delivery of FHIR Patient resources.

use crate::sink::{DeliverySink, SimulatedSink};
use crate::{DeliveryError, DeliveryResult};
use fhir::PatientResource;
use hospice_core::DeliveryConfig;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::{sleep, timeout};

const UNKNOWN_MRN: &str = "UNKNOWN";

/// Final state of one delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Success,
    Failed,
    Skipped,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Success => "success",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::Skipped => "skipped",
        }
    }
}

/// What happened to a resource handed to the gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    pub status: DeliveryStatus,
    pub mrn: String,
    pub stream: String,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sends Patient resources to a [`DeliverySink`] according to a [`DeliveryConfig`].
#[derive(Clone)]
pub struct DeliveryGateway {
    cfg: DeliveryConfig,
    sink: Arc<dyn DeliverySink>,
}

impl DeliveryGateway {
    pub fn new(cfg: DeliveryConfig, sink: Arc<dyn DeliverySink>) -> Self {
        Self { cfg, sink }
    }

    /// Gateway backed by [`SimulatedSink`].
    pub fn simulated(cfg: DeliveryConfig) -> Self {
        Self::new(cfg, Arc::new(SimulatedSink))
    }

    /// Deliver one Patient resource.
    ///
    /// Never fails: invalid resources, a disabled gateway and exhausted retries are all reported
    /// through the returned [`DeliveryOutcome`].
    pub async fn send(&self, patient: &PatientResource) -> DeliveryOutcome {
        let stream = self.cfg.stream_name().to_owned();
        let mrn = patient.mrn().unwrap_or(UNKNOWN_MRN).to_owned();

        if let Err(err) = validate(patient) {
            tracing::error!("Refusing to deliver (mrn={mrn}, stream={stream}): {err}");
            return DeliveryOutcome {
                status: DeliveryStatus::Failed,
                mrn,
                stream,
                attempts: 0,
                error: Some(err.to_string()),
            };
        }

        if !self.cfg.enabled() {
            tracing::info!("Delivery disabled; skipping send (mrn={mrn}, stream={stream})");
            return DeliveryOutcome {
                status: DeliveryStatus::Skipped,
                mrn,
                stream,
                attempts: 0,
                error: None,
            };
        }

        let max_retries = self.cfg.max_retries();
        let mut last_error = None;

        for attempt in 1..=max_retries {
            tracing::info!(
                "Sending FHIR Patient (mrn={mrn}, stream={stream}, attempt={attempt}/{max_retries})"
            );

            match self.attempt(&stream, patient).await {
                Ok(()) => {
                    tracing::info!("Delivery successful (mrn={mrn}, stream={stream})");
                    return DeliveryOutcome {
                        status: DeliveryStatus::Success,
                        mrn,
                        stream,
                        attempts: attempt,
                        error: None,
                    };
                }
                Err(err) => {
                    tracing::warn!(
                        "Delivery attempt failed (mrn={mrn}, stream={stream}, attempt={attempt}/{max_retries}, error={err})"
                    );
                    last_error = Some(err.to_string());
                    if attempt < max_retries {
                        sleep(self.cfg.backoff()).await;
                    }
                }
            }
        }

        let error = last_error.unwrap_or_else(|| "Unknown error".to_owned());
        tracing::error!(
            "Delivery failed after retries (mrn={mrn}, stream={stream}, attempts={max_retries}, error={error})"
        );
        DeliveryOutcome {
            status: DeliveryStatus::Failed,
            mrn,
            stream,
            attempts: max_retries,
            error: Some(error),
        }
    }

    async fn attempt(&self, stream: &str, patient: &PatientResource) -> DeliveryResult<()> {
        let limit = self.cfg.timeout();
        match timeout(limit, self.sink.write(stream, patient)).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout(limit)),
        }
    }
}

/// Minimal shape checks before a resource leaves the process.
pub fn validate(patient: &PatientResource) -> DeliveryResult<()> {
    if patient.resource_type != "Patient" {
        return Err(DeliveryError::InvalidResource(
            "resourceType must be 'Patient'".into(),
        ));
    }

    let Some(first) = patient.identifier.first() else {
        return Err(DeliveryError::InvalidResource(
            "identifier must exist and not be empty".into(),
        ));
    };

    if first.value.as_deref().map_or(true, |v| v.trim().is_empty()) {
        return Err(DeliveryError::InvalidResource(
            "identifier[0].value must exist and not be empty".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fhir::{Patient, PatientData};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn patient(id: &str) -> PatientResource {
        Patient::build(&PatientData {
            patient_id: id.into(),
            ..Default::default()
        })
    }

    fn config(enabled: bool, max_retries: u32) -> DeliveryConfig {
        DeliveryConfig::new(
            enabled,
            "fhir_patients",
            max_retries,
            Duration::from_secs(1),
            Duration::from_millis(200),
        )
    }

    /// Fails the first `failures` writes, then succeeds.
    #[derive(Default)]
    struct FlakySink {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl DeliverySink for FlakySink {
        async fn write(&self, _stream: &str, _patient: &PatientResource) -> DeliveryResult<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(DeliveryError::Destination(format!("refused write {call}")))
            } else {
                Ok(())
            }
        }
    }

    struct SlowSink;

    #[async_trait]
    impl DeliverySink for SlowSink {
        async fn write(&self, _stream: &str, _patient: &PatientResource) -> DeliveryResult<()> {
            sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn simulated_sink_succeeds_first_time() {
        let gateway = DeliveryGateway::simulated(config(true, 3));
        let outcome = gateway.send(&patient("10006579")).await;

        assert_eq!(outcome.status, DeliveryStatus::Success);
        assert_eq!(outcome.mrn, "10006579");
        assert_eq!(outcome.stream, "fhir_patients");
        assert_eq!(outcome.attempts, 1);
        assert!(outcome.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let sink = Arc::new(FlakySink {
            failures: 2,
            ..Default::default()
        });
        let gateway = DeliveryGateway::new(config(true, 3), sink.clone());

        let outcome = gateway.send(&patient("1")).await;
        assert_eq!(outcome.status, DeliveryStatus::Success);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retry_budget() {
        let sink = Arc::new(FlakySink {
            failures: u32::MAX,
            ..Default::default()
        });
        let gateway = DeliveryGateway::new(config(true, 2), sink.clone());

        let outcome = gateway.send(&patient("1")).await;
        assert_eq!(outcome.status, DeliveryStatus::Failed);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(
            outcome.error.as_deref(),
            Some("destination error: refused write 2")
        );
        assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn each_attempt_is_bounded_by_the_timeout() {
        let gateway = DeliveryGateway::new(config(true, 2), Arc::new(SlowSink));

        let outcome = gateway.send(&patient("1")).await;
        assert_eq!(outcome.status, DeliveryStatus::Failed);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(
            outcome.error.as_deref(),
            Some("delivery attempt timed out after 1s")
        );
    }

    #[tokio::test]
    async fn disabled_gateway_skips() {
        let sink = Arc::new(FlakySink::default());
        let gateway = DeliveryGateway::new(config(false, 3), sink.clone());

        let outcome = gateway.send(&patient("1")).await;
        assert_eq!(outcome.status, DeliveryStatus::Skipped);
        assert_eq!(outcome.attempts, 0);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_resource_fails_without_attempts() {
        let sink = Arc::new(FlakySink::default());
        let gateway = DeliveryGateway::new(config(true, 3), sink.clone());

        let mut resource = patient("1");
        resource.identifier.clear();
        let outcome = gateway.send(&resource).await;

        assert_eq!(outcome.status, DeliveryStatus::Failed);
        assert_eq!(outcome.attempts, 0);
        assert_eq!(outcome.mrn, "UNKNOWN");
        assert_eq!(
            outcome.error.as_deref(),
            Some("invalid FHIR Patient resource: identifier must exist and not be empty")
        );
        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn validates_resource_shape() {
        assert!(validate(&patient("1")).is_ok());

        let mut wrong_type = patient("1");
        wrong_type.resource_type = "Observation".into();
        assert!(matches!(
            validate(&wrong_type),
            Err(DeliveryError::InvalidResource(_))
        ));

        let mut blank = patient("1");
        blank.identifier[0].value = Some(" ".into());
        assert!(validate(&blank).is_err());
    }

    #[test]
    fn outcome_serialises_lowercase_status() {
        let outcome = DeliveryOutcome {
            status: DeliveryStatus::Skipped,
            mrn: "1".into(),
            stream: "s".into(),
            attempts: 0,
            error: None,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"status": "skipped", "mrn": "1", "stream": "s", "attempts": 0})
        );
        assert_eq!(DeliveryStatus::Failed.as_str(), "failed");
    }
}
