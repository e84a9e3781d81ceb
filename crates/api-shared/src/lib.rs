//! # API Shared
//!
//! Shared request/response definitions for the hospice ingest APIs.
//!
//! Contains:
//! - Wire types for ingest requests and responses (`types` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `hospice` CLI for common functionality.

pub mod health;
pub mod types;

pub use health::HealthService;
pub use types::*;
