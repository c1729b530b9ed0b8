use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Purpose a token was minted for.
///
/// Embedded in every token as the `type` claim and checked on verification,
/// so a token issued for one action can never be replayed against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenType {
    Access,
    Refresh,
    ResetPassword,
    VerifyEmail,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
            TokenType::ResetPassword => "resetPassword",
            TokenType::VerifyEmail => "verifyEmail",
        }
    }

    /// Whether tokens of this type are backed by a stored row.
    ///
    /// Access tokens are purely stateless.
    pub fn is_persisted(&self) -> bool {
        !matches!(self, TokenType::Access)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenType::Access),
            "refresh" => Ok(TokenType::Refresh),
            "resetPassword" => Ok(TokenType::ResetPassword),
            "verifyEmail" => Ok(TokenType::VerifyEmail),
            other => Err(JwtError::UnknownTokenType(other.to_string())),
        }
    }
}
