//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the admission transform and the delivery gateway. Request handling never reads
//! process-wide environment variables, which keeps behaviour consistent across threads and lets
//! tests inject arbitrary values.

use crate::constants::{
    DEFAULT_BACKOFF_MS, DEFAULT_HOSPICE_EOB_EVENT, DEFAULT_HOSPICE_EOB_STAGE,
    DEFAULT_MAX_RETRIES, DEFAULT_STREAM_NAME, DEFAULT_TIMEOUT_SECS, ENV_DELIVERY_ENABLED,
    ENV_DELIVERY_MAX_RETRIES, ENV_DELIVERY_TIMEOUT, ENV_HOSPICE_EOB_EVENT, ENV_HOSPICE_EOB_STAGE,
};
use std::time::Duration;

/// Admission workflow configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    hospice_eob_event: i64,
    hospice_eob_stage: i64,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(hospice_eob_event: i64, hospice_eob_stage: i64) -> Self {
        Self {
            hospice_eob_event,
            hospice_eob_stage,
        }
    }

    /// Build from optional raw environment values.
    ///
    /// Missing, empty or non-integer values fall back to the defaults (210 / 2029).
    pub fn from_env_values(event: Option<String>, stage: Option<String>) -> Self {
        Self::new(
            int_from_env_value(ENV_HOSPICE_EOB_EVENT, event, DEFAULT_HOSPICE_EOB_EVENT),
            int_from_env_value(ENV_HOSPICE_EOB_STAGE, stage, DEFAULT_HOSPICE_EOB_STAGE),
        )
    }

    pub fn hospice_eob_event(&self) -> i64 {
        self.hospice_eob_event
    }

    pub fn hospice_eob_stage(&self) -> i64 {
        self.hospice_eob_stage
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOSPICE_EOB_EVENT, DEFAULT_HOSPICE_EOB_STAGE)
    }
}

/// Delivery gateway configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryConfig {
    enabled: bool,
    stream_name: String,
    max_retries: u32,
    timeout: Duration,
    backoff: Duration,
}

impl DeliveryConfig {
    /// Create a new `DeliveryConfig`.
    ///
    /// `max_retries` is clamped to at least one attempt and `timeout` to at least one second.
    pub fn new(
        enabled: bool,
        stream_name: impl Into<String>,
        max_retries: u32,
        timeout: Duration,
        backoff: Duration,
    ) -> Self {
        let stream_name = stream_name.into();
        let stream_name = if stream_name.trim().is_empty() {
            DEFAULT_STREAM_NAME.to_owned()
        } else {
            stream_name
        };

        Self {
            enabled,
            stream_name,
            max_retries: max_retries.max(1),
            timeout: timeout.max(Duration::from_secs(1)),
            backoff,
        }
    }

    /// Build from optional raw environment values.
    pub fn from_env_values(
        enabled: Option<String>,
        stream_name: Option<String>,
        max_retries: Option<String>,
        timeout_secs: Option<String>,
    ) -> Self {
        let max_retries =
            int_from_env_value(ENV_DELIVERY_MAX_RETRIES, max_retries, DEFAULT_MAX_RETRIES);
        let timeout_secs =
            int_from_env_value(ENV_DELIVERY_TIMEOUT, timeout_secs, DEFAULT_TIMEOUT_SECS);

        Self::new(
            bool_from_env_value(ENV_DELIVERY_ENABLED, enabled, true),
            stream_name.unwrap_or_default(),
            u32::try_from(max_retries.max(1)).unwrap_or(u32::MAX),
            Duration::from_secs(u64::try_from(timeout_secs.max(1)).unwrap_or(u64::MAX)),
            Duration::from_millis(DEFAULT_BACKOFF_MS),
        )
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self::new(
            true,
            DEFAULT_STREAM_NAME,
            DEFAULT_MAX_RETRIES as u32,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS as u64),
            Duration::from_millis(DEFAULT_BACKOFF_MS),
        )
    }
}

/// Parse an integer from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `default`. Unparseable values are logged
/// and also fall back to `default`.
pub fn int_from_env_value(name: &str, value: Option<String>, default: i64) -> i64 {
    let Some(raw) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return default;
    };

    match raw.parse::<i64>() {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::warn!("Invalid int in env var {name}={raw:?}; using default={default}");
            default
        }
    }
}

/// Parse a boolean flag from an optional string value.
///
/// `1`, `true`, `t`, `yes`, `y` and `on` (any case) are true; any other non-empty value is
/// false. Missing or empty values return `default`.
pub fn bool_from_env_value(name: &str, value: Option<String>, default: bool) -> bool {
    let Some(raw) = value.map(|v| v.trim().to_lowercase()).filter(|v| !v.is_empty()) else {
        return default;
    };

    let parsed = matches!(raw.as_str(), "1" | "true" | "t" | "yes" | "y" | "on");
    tracing::debug!("{name}={raw:?} resolved to {parsed}");
    parsed
}
