use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;
use serde::Deserialize;

use crate::domain::email::errors::EmailDeliveryError;
use crate::domain::email::models::EmailMessage;
use crate::domain::email::ports::EmailSender;

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain connection, for local relays such as Mailpit
    None,
    /// Upgrade with STARTTLS (usually port 587)
    #[default]
    StartTls,
    /// Implicit TLS (usually port 465)
    Tls,
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub security: SmtpSecurity,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Delivers mail through an SMTP relay.
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailSender {
    /// # Errors
    /// * `Transport` - Relay host cannot be used with the chosen security
    pub fn new(settings: &SmtpSettings) -> Result<Self, EmailDeliveryError> {
        let host = settings.host.as_str();
        let transport_error = |e: lettre::transport::smtp::Error| {
            EmailDeliveryError::Transport(format!("{}: {}", host, e))
        };

        let builder = match settings.security {
            SmtpSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host).map_err(transport_error)?
            }
            SmtpSecurity::Tls => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(host).map_err(transport_error)?
            }
        };

        let mut builder = builder.port(settings.port);
        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

/// Turn a domain message into a plain-text MIME message.
fn build_message(message: &EmailMessage) -> Result<Message, EmailDeliveryError> {
    let failed = |reason: String| EmailDeliveryError::DeliveryFailed {
        to: message.to.to_string(),
        reason,
    };

    let from = message
        .from
        .parse::<Mailbox>()
        .map_err(|e| failed(format!("invalid sender address: {}", e)))?;
    let to = message
        .to
        .as_str()
        .parse::<Mailbox>()
        .map_err(|e| failed(format!("invalid recipient address: {}", e)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .map_err(|e| failed(e.to_string()))
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailDeliveryError> {
        let email = build_message(&message)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| EmailDeliveryError::DeliveryFailed {
                to: message.to.to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(to = %message.to, subject = %message.subject, "Email sent");

        Ok(())
    }
}
