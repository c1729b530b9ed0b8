use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::claims::Claims;
use super::errors::JwtError;
use super::handler::JwtHandler;
use super::token_type::TokenType;
use crate::clock::Clock;
use crate::clock::SystemClock;

/// A freshly signed token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies typed bearer tokens.
///
/// Pure apart from reading the injected clock: given the same secret, inputs
/// and clock reading, verification always reaches the same verdict.
pub struct TokenCodec {
    handler: JwtHandler,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a codec backed by the system clock.
    pub fn new(secret: &[u8]) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Create a codec reading time from `clock`.
    pub fn with_clock(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            handler: JwtHandler::new(secret),
            clock,
        }
    }

    /// Current instant according to the codec's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Sign a token of `token_type` for `subject`, valid for `ttl`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn sign(
        &self,
        subject: &str,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<SignedToken, JwtError> {
        let claims = Claims::new(subject, token_type, self.clock.now(), ttl);
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| JwtError::EncodingFailed(format!("expiry out of range: {}", claims.exp)))?;
        let token = self.handler.encode(&claims)?;

        Ok(SignedToken { token, expires_at })
    }

    /// Verify `token` and check it was issued as `expected`.
    ///
    /// # Errors
    /// * `InvalidSignature` - Token was tampered with or signed by another key
    /// * `Malformed` - Token is not one of ours
    /// * `Expired` - Clock is at or past the `exp` claim
    /// * `TypeMismatch` - Token was minted for a different purpose
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims: Claims = self.handler.decode(token)?;

        if claims.is_expired(self.clock.now()) {
            return Err(JwtError::Expired);
        }

        if claims.token_type != expected {
            return Err(JwtError::TypeMismatch {
                expected,
                actual: claims.token_type,
            });
        }

        Ok(claims)
    }
}
