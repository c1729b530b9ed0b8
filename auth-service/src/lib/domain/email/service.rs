use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::email::errors::EmailDeliveryError;
use crate::domain::email::models::EmailMessage;
use crate::domain::email::models::EmailSettings;
use crate::domain::email::ports::EmailSender;
use crate::domain::email::ports::EmailServicePort;
use crate::domain::user::models::EmailAddress;

pub struct EmailService<S>
where
    S: EmailSender + ?Sized,
{
    sender: Arc<S>,
    settings: EmailSettings,
}

impl<S> EmailService<S>
where
    S: EmailSender + ?Sized,
{
    pub fn new(sender: Arc<S>, settings: EmailSettings) -> Self {
        Self { sender, settings }
    }

    fn message(&self, to: &EmailAddress, subject: &str, body: String) -> EmailMessage {
        EmailMessage {
            from: self.settings.from.clone(),
            to: to.clone(),
            subject: subject.to_string(),
            body,
        }
    }
}

#[async_trait]
impl<S> EmailServicePort for EmailService<S>
where
    S: EmailSender + ?Sized,
{
    async fn send_reset_password_email(
        &self,
        to: &EmailAddress,
        token: &str,
    ) -> Result<(), EmailDeliveryError> {
        let link = self.settings.reset_password_link(token);
        let body = format!(
            "Dear user,\n\nTo reset your password, click on this link: {link}\n\n\
             If you did not request any password resets, then ignore this email."
        );

        self.sender
            .send(self.message(to, "Reset password", body))
            .await
    }

    async fn send_verification_email(
        &self,
        to: &EmailAddress,
        token: &str,
    ) -> Result<(), EmailDeliveryError> {
        let link = self.settings.verify_email_link(token);
        let body = format!(
            "Dear user,\n\nTo verify your email, click on this link: {link}\n\n\
             If you did not create an account, then ignore this email."
        );

        self.sender
            .send(self.message(to, "Email Verification", body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;

    mock! {
        pub TestEmailSender {}

        #[async_trait]
        impl EmailSender for TestEmailSender {
            async fn send(&self, message: EmailMessage) -> Result<(), EmailDeliveryError>;
        }
    }

    fn settings() -> EmailSettings {
        EmailSettings {
            from: "noreply@example.com".to_string(),
            app_url: "https://app.example.com".to_string(),
        }
    }

    fn recipient() -> EmailAddress {
        EmailAddress::new("a@x.com".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_reset_password_email_embeds_link() {
        let mut sender = MockTestEmailSender::new();
        sender
            .expect_send()
            .withf(|message| {
                message.to.as_str() == "a@x.com"
                    && message.from == "noreply@example.com"
                    && message.subject == "Reset password"
                    && message
                        .body
                        .contains("https://app.example.com/reset-password?token=abc.def.ghi")
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = EmailService::new(Arc::new(sender), settings());
        service
            .send_reset_password_email(&recipient(), "abc.def.ghi")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_verification_email_embeds_link() {
        let mut sender = MockTestEmailSender::new();
        sender
            .expect_send()
            .withf(|message| {
                message
                    .body
                    .contains("https://app.example.com/verify-email?token=tok")
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = EmailService::new(Arc::new(sender), settings());
        service
            .send_verification_email(&recipient(), "tok")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delivery_failure_propagates() {
        let mut sender = MockTestEmailSender::new();
        sender.expect_send().times(1).returning(|message| {
            Err(EmailDeliveryError::DeliveryFailed {
                to: message.to.to_string(),
                reason: "relay refused".to_string(),
            })
        });

        let service = EmailService::new(Arc::new(sender), settings());
        let result = service.send_verification_email(&recipient(), "tok").await;
        assert!(matches!(result, Err(EmailDeliveryError::DeliveryFailed { .. })));
    }
}
