use crate::core::Mailer;
use crate::domain::model::{DeliveryStatus, Notification, NotificationTarget, TemplateData};
use crate::utils::error::DispatchError;

/// Sends one templated onboarding email per call and turns transport
/// failures into values.
pub struct NotificationDispatcher<'a, M: Mailer + ?Sized> {
    mailer: &'a M,
}

impl<'a, M: Mailer + ?Sized> NotificationDispatcher<'a, M> {
    pub fn new(mailer: &'a M) -> Self {
        Self { mailer }
    }

    pub async fn dispatch(
        &self,
        emails: &[String],
        target: NotificationTarget,
        company_name: &str,
    ) -> std::result::Result<DeliveryStatus, DispatchError> {
        let notification = Notification {
            recipients: emails.to_vec(),
            template_data: TemplateData {
                company_name: company_name.to_string(),
                link: target.link.to_string(),
                sender_team: target.sender_team.to_string(),
            },
        };

        match self.mailer.send(&notification).await {
            Ok(status) => {
                tracing::info!(
                    "Email sent to {}, status {}",
                    emails.join(", "),
                    status.status_code
                );
                Ok(status)
            }
            Err(e) => {
                tracing::error!("Error sending email to {:?}: {}", emails, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::COBEE;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingMailer {
        sent: Mutex<Vec<Notification>>,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(
            &self,
            notification: &Notification,
        ) -> std::result::Result<DeliveryStatus, DispatchError> {
            self.sent.lock().unwrap().push(notification.clone());
            match self.fail_with {
                Some(status) => Err(DispatchError::Rejected {
                    status,
                    body: "rejected".to_string(),
                }),
                None => Ok(DeliveryStatus {
                    status_code: 202,
                    message_id: None,
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_dispatch_builds_template_data() {
        let mailer = RecordingMailer {
            sent: Mutex::new(Vec::new()),
            fail_with: None,
        };
        let dispatcher = NotificationDispatcher::new(&mailer);
        let emails = vec!["a@acme.com".to_string(), "b@acme.com".to_string()];

        let status = dispatcher.dispatch(&emails, COBEE, "Acme Inc").await.unwrap();

        assert_eq!(status.status_code, 202);
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipients, emails);
        assert_eq!(sent[0].template_data.company_name, "Acme Inc");
        assert_eq!(sent[0].template_data.link, "https://enlace-cobee.com");
        assert_eq!(sent[0].template_data.sender_team, "New Business Onboarding");
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_returned_not_raised() {
        let mailer = RecordingMailer {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(401),
        };
        let dispatcher = NotificationDispatcher::new(&mailer);

        let err = dispatcher
            .dispatch(&["a@acme.com".to_string()], COBEE, "Acme Inc")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "HTTP Error 401: rejected");
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }
}
