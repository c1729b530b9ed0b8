use chrono::DateTime;
use chrono::Duration;
use chrono::SubsecRound;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::token_type::TokenType;

/// Claims carried by every token this crate signs.
///
/// `exp` and `iat` are Unix timestamps in seconds. `jti` makes two tokens
/// minted for the same subject within the same second distinct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,

    /// What the token may be used for
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl Claims {
    /// Build claims for `subject` issued at `issued_at` and valid for `ttl`.
    ///
    /// Sub-second precision is dropped so that the expiry returned to callers
    /// matches the `exp` claim exactly.
    pub fn new(
        subject: impl ToString,
        token_type: TokenType,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let issued_at = issued_at.trunc_subsecs(0);
        let expires_at = issued_at + ttl;

        Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type,
        }
    }

    /// Check if token is expired at `now`.
    ///
    /// A token is no longer valid from its expiry second onwards.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claims() {
        let now = Utc::now();
        let claims = Claims::new("user123", TokenType::Refresh, now, Duration::days(30));

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
        assert_eq!(claims.iat, now.timestamp());
    }

    #[test]
    fn test_claims_are_unique_per_issuance() {
        let now = Utc::now();
        let first = Claims::new("user123", TokenType::Refresh, now, Duration::days(1));
        let second = Claims::new("user123", TokenType::Refresh, now, Duration::days(1));

        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let claims = Claims::new("user123", TokenType::Access, now, Duration::seconds(60));

        assert!(!claims.is_expired(now));
        assert!(!claims.is_expired(now + Duration::seconds(59)));
        assert!(claims.is_expired(now.trunc_subsecs(0) + Duration::seconds(60)));
        assert!(claims.is_expired(now + Duration::seconds(61)));
    }

    #[test]
    fn test_type_claim_name() {
        let claims = Claims::new("user123", TokenType::VerifyEmail, Utc::now(), Duration::minutes(10));
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["type"], "verifyEmail");
        assert_eq!(json["sub"], "user123");
    }
}
