pub mod cloudfront;
pub mod cost_explorer;
pub mod dynamodb;
pub mod lightsail;
pub mod ssm;
pub mod sts;

use async_trait::async_trait;

use crate::core::error::ReportError;

/// Load the shared SDK configuration (region, credentials) once per process.
pub async fn load_sdk_config() -> aws_config::SdkConfig {
    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await
}

/// A resource that can be switched off in response to a budget alert.
#[async_trait]
pub trait ResourceDisabler: Send + Sync {
    /// Human-readable resource kind, e.g. "CloudFront Distribution".
    fn kind(&self) -> &'static str;

    /// Resource description used in notices, e.g. "CloudFront distribution E2ABC".
    fn resource(&self) -> String;

    async fn disable(&self) -> Result<(), ReportError>;
}
