use crate::types::HealthRes;

/// Display name reported by health checks.
pub const SERVICE_NAME: &str = "Hospice ADT Integration";

/// Simple health service shared by every API surface.
///
/// This service provides a standardised way to check the health status of the ingest service.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            status: "healthy".into(),
            service: SERVICE_NAME.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_healthy() {
        let res = HealthService::check_health();
        assert_eq!(
            serde_json::to_value(res).unwrap(),
            serde_json::json!({"status": "healthy", "service": "Hospice ADT Integration"})
        );
    }
}
