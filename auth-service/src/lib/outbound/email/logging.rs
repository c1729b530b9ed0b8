use async_trait::async_trait;

use crate::domain::email::errors::EmailDeliveryError;
use crate::domain::email::models::EmailMessage;
use crate::domain::email::ports::EmailSender;

/// Sender that writes outgoing mail to the log instead of a mail relay.
///
/// The message body carries a live token, so it is only logged at `debug`.
#[derive(Debug, Default, Clone)]
pub struct TracingEmailSender;

impl TracingEmailSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for TracingEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailDeliveryError> {
        tracing::info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Email dispatched"
        );
        tracing::debug!(to = %message.to, body = %message.body, "Email body");

        Ok(())
    }
}
