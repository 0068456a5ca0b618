use tracing::{error, info};

use crate::core::aws::cloudfront::CloudFrontDisabler;
use crate::core::aws::lightsail::LightsailDisabler;
use crate::core::aws::ResourceDisabler;
use crate::core::config::{AppConfig, ConfigError};
use crate::core::error::ReportError;
use crate::core::models::event::HandlerResponse;
use crate::core::notify::sns::SnsChannel;
use crate::core::notify::{notify_text, NotificationChannel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisableTarget {
    CloudFront,
    Lightsail,
}

pub struct DisableDeps {
    pub disabler: Box<dyn ResourceDisabler>,
    pub notifier: Box<dyn NotificationChannel>,
}

impl DisableDeps {
    pub fn from_config(
        sdk: &aws_config::SdkConfig,
        config: &AppConfig,
        target: DisableTarget,
    ) -> Result<Self, ReportError> {
        let resources = &config.resources;
        let disabler: Box<dyn ResourceDisabler> = match target {
            DisableTarget::CloudFront => {
                let id = resources
                    .distribution_id
                    .as_deref()
                    .ok_or(ConfigError::Missing("DISTRIBUTION_ID"))?;
                Box::new(CloudFrontDisabler::new(sdk, id))
            }
            DisableTarget::Lightsail => {
                let name = resources
                    .container_service_name
                    .as_deref()
                    .ok_or(ConfigError::Missing("CONTAINER_SERVICE_NAME"))?;
                Box::new(LightsailDisabler::new(sdk, name))
            }
        };
        Ok(Self {
            disabler,
            notifier: Box::new(SnsChannel::new(sdk, config.sns_topic_arn()?)),
        })
    }
}

/// Disable the resource and publish a notice either way.
///
/// The notice is best effort; only the disable call decides the status.
pub async fn handle(deps: &DisableDeps) -> HandlerResponse {
    let kind = deps.disabler.kind();
    let resource = deps.disabler.resource();

    match deps.disabler.disable().await {
        Ok(()) => {
            let message = format!("{} has been disabled due to budget alert.", resource);
            info!(resource = %resource, "Resource disabled");
            notify_text(deps.notifier.as_ref(), &format!("{} Disabled", kind), &message).await;
            let body = serde_json::to_string(&message).unwrap_or(message);
            HandlerResponse::ok(body)
        }
        Err(err) => {
            let message = format!("Error disabling {}: {}", resource, err);
            error!(resource = %resource, error = %err, "Failed to disable resource");
            notify_text(
                deps.notifier.as_ref(),
                &format!("Error Disabling {}", kind),
                &message,
            )
            .await;
            let body = serde_json::to_string(&message).unwrap_or(message);
            HandlerResponse::failure(body)
        }
    }
}
