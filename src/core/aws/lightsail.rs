use async_trait::async_trait;
use aws_sdk_lightsail::error::DisplayErrorContext;
use aws_sdk_lightsail::Client;
use tracing::info;

use crate::core::aws::ResourceDisabler;
use crate::core::error::ReportError;

const SERVICE: &str = "Lightsail";

pub struct LightsailDisabler {
    client: Client,
    service_name: String,
}

impl LightsailDisabler {
    pub fn new(sdk: &aws_config::SdkConfig, service_name: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk),
            service_name: service_name.into(),
        }
    }
}

#[async_trait]
impl ResourceDisabler for LightsailDisabler {
    fn kind(&self) -> &'static str {
        "Lightsail Container Service"
    }

    fn resource(&self) -> String {
        format!("Lightsail container service {}", self.service_name)
    }

    async fn disable(&self) -> Result<(), ReportError> {
        self.client
            .update_container_service()
            .service_name(&self.service_name)
            .is_disabled(true)
            .send()
            .await
            .map_err(|e| ReportError::upstream(SERVICE, DisplayErrorContext(&e)))?;

        info!(service_name = %self.service_name, "Container service disabled");
        Ok(())
    }
}
