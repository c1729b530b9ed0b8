use async_trait::async_trait;

use crate::domain::email::errors::EmailDeliveryError;
use crate::domain::email::models::EmailMessage;
use crate::domain::user::models::EmailAddress;

/// Transport that actually delivers a message.
#[async_trait]
pub trait EmailSender: Send + Sync + 'static {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailDeliveryError>;
}

/// Composes the account emails that carry purpose tokens.
#[async_trait]
pub trait EmailServicePort: Send + Sync + 'static {
    async fn send_reset_password_email(
        &self,
        to: &EmailAddress,
        token: &str,
    ) -> Result<(), EmailDeliveryError>;

    async fn send_verification_email(
        &self,
        to: &EmailAddress,
        token: &str,
    ) -> Result<(), EmailDeliveryError>;
}
