use anyhow::Result;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::info;

use crate::core::aws::load_sdk_config;
use crate::core::config::AppConfig;
use crate::core::models::event::HandlerResponse;
use crate::handlers::{run_handler, HandlerKind};

/// Serve `handler` inside the Lambda runtime until the runtime shuts down.
///
/// The SDK config is loaded once; settings are re-read from the environment
/// on every invocation.
pub async fn run(handler: HandlerKind) -> Result<()> {
    let sdk = load_sdk_config().await;
    let sdk = &sdk;
    info!(handler = handler.id(), "Starting Lambda runtime");

    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<serde_json::Value>| async move {
            info!(request_id = %event.context.request_id, handler = handler.id(), "Invocation received");
            let today = chrono::Utc::now().date_naive();
            let response =
                run_handler(handler, sdk, AppConfig::from_env(), event.payload, today).await;
            Ok::<HandlerResponse, Error>(response)
        },
    ))
    .await
    .map_err(|e| anyhow::anyhow!("Lambda runtime failed: {}", e))
}
