use async_trait::async_trait;
use aws_sdk_cloudfront::error::DisplayErrorContext;
use aws_sdk_cloudfront::Client;
use tracing::info;

use crate::core::aws::ResourceDisabler;
use crate::core::error::ReportError;

const SERVICE: &str = "CloudFront";

pub struct CloudFrontDisabler {
    client: Client,
    distribution_id: String,
}

impl CloudFrontDisabler {
    pub fn new(sdk: &aws_config::SdkConfig, distribution_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk),
            distribution_id: distribution_id.into(),
        }
    }
}

#[async_trait]
impl ResourceDisabler for CloudFrontDisabler {
    fn kind(&self) -> &'static str {
        "CloudFront Distribution"
    }

    fn resource(&self) -> String {
        format!("CloudFront distribution {}", self.distribution_id)
    }

    async fn disable(&self) -> Result<(), ReportError> {
        let current = self
            .client
            .get_distribution_config()
            .id(&self.distribution_id)
            .send()
            .await
            .map_err(|e| ReportError::upstream(SERVICE, DisplayErrorContext(&e)))?;

        let etag = current
            .e_tag()
            .ok_or_else(|| ReportError::upstream(SERVICE, "distribution config has no ETag"))?
            .to_string();
        let mut config = current
            .distribution_config()
            .cloned()
            .ok_or_else(|| ReportError::upstream(SERVICE, "distribution config missing"))?;

        config.enabled = false;

        self.client
            .update_distribution()
            .id(&self.distribution_id)
            .if_match(etag)
            .distribution_config(config)
            .send()
            .await
            .map_err(|e| ReportError::upstream(SERVICE, DisplayErrorContext(&e)))?;

        info!(distribution_id = %self.distribution_id, "Distribution disabled");
        Ok(())
    }
}
