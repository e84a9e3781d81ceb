//! Constants used throughout the hospice core crate.
//!
//! Environment variable names and their defaults live here so the runner, the CLI and the tests
//! agree on a single spelling.

/// Env var holding the hospice EOB workflow event number.
pub const ENV_HOSPICE_EOB_EVENT: &str = "HOSPICE_EOB_EVENT";

/// Env var holding the hospice EOB workflow stage number.
pub const ENV_HOSPICE_EOB_STAGE: &str = "HOSPICE_EOB_STAGE";

/// Env var enabling or disabling downstream delivery.
pub const ENV_DELIVERY_ENABLED: &str = "AIRBYTE_ENABLED";

/// Env var naming the downstream stream.
pub const ENV_DELIVERY_STREAM_NAME: &str = "AIRBYTE_STREAM_NAME";

/// Env var holding the maximum number of delivery attempts.
pub const ENV_DELIVERY_MAX_RETRIES: &str = "AIRBYTE_MAX_RETRIES";

/// Env var holding the per-attempt delivery timeout, in seconds.
pub const ENV_DELIVERY_TIMEOUT: &str = "AIRBYTE_TIMEOUT";

pub const DEFAULT_HOSPICE_EOB_EVENT: i64 = 210;
pub const DEFAULT_HOSPICE_EOB_STAGE: i64 = 2029;

pub const DEFAULT_STREAM_NAME: &str = "fhir_patients";
pub const DEFAULT_MAX_RETRIES: i64 = 3;
pub const DEFAULT_TIMEOUT_SECS: i64 = 5;
pub const DEFAULT_BACKOFF_MS: u64 = 200;

/// Episode status after an admit.
pub const EPISODE_STATUS_CURRENT: &str = "CURRENT";

/// Episode status before an admit.
pub const EPISODE_STATUS_PENDING: &str = "PENDING";

/// Admission status after an admit.
pub const ADMISSION_STATUS_ACTIVE: &str = "ACTIVE";

/// Placeholder for SOC/ROC type and acuity level when upstream supplies neither.
pub const UNKNOWN_VALUE: &str = "UNKNOWN";

/// Attribute keys consulted by the admission transform.
pub const ATTR_MRN: &str = "mrn";
pub const ATTR_PATIENT_IDENTIFIER: &str = "patient_identifier";
pub const ATTR_SOC_ROC_TYPE: &str = "soc_roc_type";
pub const ATTR_ACUITY_LEVEL: &str = "acuity_level";
