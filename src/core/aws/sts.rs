use async_trait::async_trait;
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::Client;

use crate::core::error::ReportError;

const SERVICE: &str = "STS";

/// Resolves the AWS account the handler runs in.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn account_id(&self) -> Result<String, ReportError>;
}

pub struct StsIdentity {
    client: Client,
}

impl StsIdentity {
    pub fn new(sdk: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk),
        }
    }
}

#[async_trait]
impl IdentityLookup for StsIdentity {
    async fn account_id(&self) -> Result<String, ReportError> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| ReportError::upstream(SERVICE, DisplayErrorContext(&e)))?;
        output
            .account()
            .map(|a| a.to_string())
            .ok_or_else(|| ReportError::upstream(SERVICE, "caller identity has no account"))
    }
}
