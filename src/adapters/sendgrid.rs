use crate::core::Mailer;
use crate::domain::model::{DeliveryStatus, Notification};
use crate::utils::error::{DispatchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com";
const SEND_PATH: &str = "/v3/mail/send";

#[derive(Debug, Clone)]
pub struct SendGridSettings {
    pub api_key: String,
    pub template_id: String,
    pub from_email: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

/// Sends dynamic-template emails through the SendGrid v3 API.
pub struct SendGridMailer {
    client: Client,
    settings: SendGridSettings,
}

impl SendGridMailer {
    pub fn new(settings: SendGridSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), SEND_PATH)
    }

    fn payload(&self, notification: &Notification) -> serde_json::Value {
        let to: Vec<serde_json::Value> = notification
            .recipients
            .iter()
            .map(|email| json!({ "email": email }))
            .collect();

        json!({
            "personalizations": [{
                "to": to,
                "dynamic_template_data": notification.template_data,
            }],
            "from": { "email": self.settings.from_email },
            "template_id": self.settings.template_id,
        })
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(
        &self,
        notification: &Notification,
    ) -> std::result::Result<DeliveryStatus, DispatchError> {
        tracing::debug!("POST {} for {:?}", self.endpoint(), notification.recipients);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&self.payload(notification))
            .send()
            .await?;

        let status = response.status();
        let message_id = response
            .headers()
            .get("X-Message-Id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if status.is_success() {
            Ok(DeliveryStatus {
                status_code: status.as_u16(),
                message_id,
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
