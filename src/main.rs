use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use hospice_core::constants::{
    ENV_DELIVERY_ENABLED, ENV_DELIVERY_MAX_RETRIES, ENV_DELIVERY_STREAM_NAME,
    ENV_DELIVERY_TIMEOUT, ENV_HOSPICE_EOB_EVENT, ENV_HOSPICE_EOB_STAGE,
};
use hospice_core::{AdmissionService, CoreConfig, DeliveryConfig};
use hospice_delivery::DeliveryGateway;

/// Main entry point for the hospice ADT ingest service
///
/// Resolves configuration once from the process environment (and `.env`), then serves the REST
/// API until the process is stopped.
///
/// # Environment Variables
/// - `HOSPICE_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `HOSPICE_EOB_EVENT` / `HOSPICE_EOB_STAGE`: EOB workflow numbers (default: 210 / 2029)
/// - `AIRBYTE_ENABLED`, `AIRBYTE_STREAM_NAME`, `AIRBYTE_MAX_RETRIES`, `AIRBYTE_TIMEOUT`:
///   downstream delivery settings
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hospice_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("hospice_core=info".parse()?)
                .add_directive("hospice_delivery=info".parse()?)
                .add_directive("hl7=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HOSPICE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    let core_cfg = CoreConfig::from_env_values(
        std::env::var(ENV_HOSPICE_EOB_EVENT).ok(),
        std::env::var(ENV_HOSPICE_EOB_STAGE).ok(),
    );
    let delivery_cfg = DeliveryConfig::from_env_values(
        std::env::var(ENV_DELIVERY_ENABLED).ok(),
        std::env::var(ENV_DELIVERY_STREAM_NAME).ok(),
        std::env::var(ENV_DELIVERY_MAX_RETRIES).ok(),
        std::env::var(ENV_DELIVERY_TIMEOUT).ok(),
    );

    tracing::info!(
        "++ EOB event={}, stage={}; delivery enabled={}, stream={}, max_retries={}, timeout={:?}",
        core_cfg.hospice_eob_event(),
        core_cfg.hospice_eob_stage(),
        delivery_cfg.enabled(),
        delivery_cfg.stream_name(),
        delivery_cfg.max_retries(),
        delivery_cfg.timeout()
    );

    let state = AppState::new(
        AdmissionService::new(Arc::new(core_cfg)),
        DeliveryGateway::simulated(delivery_cfg),
    );

    tracing::info!("++ Starting hospice REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
