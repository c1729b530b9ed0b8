use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EmailDeliveryError {
    #[error("Failed to deliver email to {to}: {reason}")]
    DeliveryFailed { to: String, reason: String },

    #[error("Email transport misconfigured: {0}")]
    Transport(String),
}
