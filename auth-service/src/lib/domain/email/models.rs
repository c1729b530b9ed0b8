use crate::domain::user::models::EmailAddress;

/// Sender address and public application URL used to build links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub from: String,
    pub app_url: String,
}

impl EmailSettings {
    pub fn reset_password_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.app_url, token)
    }

    pub fn verify_email_link(&self, token: &str) -> String {
        format!("{}/verify-email?token={}", self.app_url, token)
    }
}

/// Outgoing plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: EmailAddress,
    pub subject: String,
    pub body: String,
}
