use crate::core::Mailer;
use crate::domain::model::{DeliveryStatus, Notification};
use crate::utils::error::DispatchError;
use async_trait::async_trait;

/// Logs what would be sent and reports it as accepted.
#[derive(Debug, Clone, Default)]
pub struct DryRunMailer;

#[async_trait]
impl Mailer for DryRunMailer {
    async fn send(
        &self,
        notification: &Notification,
    ) -> std::result::Result<DeliveryStatus, DispatchError> {
        tracing::info!(
            "[dry-run] would email {} (company: {}, link: {}, sender: {})",
            notification.recipients.join(", "),
            notification.template_data.company_name,
            notification.template_data.link,
            notification.template_data.sender_team
        );
        Ok(DeliveryStatus {
            status_code: 202,
            message_id: None,
        })
    }
}
