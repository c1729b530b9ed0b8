use async_trait::async_trait;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::AuthSession;
use crate::domain::authentication::models::ForgotPasswordCommand;
use crate::domain::authentication::models::LoginCommand;
use crate::domain::authentication::models::LogoutCommand;
use crate::domain::authentication::models::RefreshCommand;
use crate::domain::authentication::models::RegisterCommand;
use crate::domain::authentication::models::ResetPasswordCommand;
use crate::domain::authentication::models::VerifyEmailCommand;
use crate::domain::token::models::AuthTokens;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Port for the account flows exposed to clients.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Create an account and sign the new user in.
    ///
    /// # Errors
    /// * `Conflict` - Email is already registered
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError>;

    /// Check credentials and issue a token pair.
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown email or wrong password (same message for both)
    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError>;

    /// Revoke a refresh token.
    ///
    /// # Errors
    /// * `NotFound` - Token is unknown, already used or invalid
    async fn logout(&self, command: LogoutCommand) -> Result<(), AuthError>;

    /// Exchange a refresh token for a new pair. The presented token is spent.
    ///
    /// # Errors
    /// * `Unauthorized` - Token is invalid, expired or already used
    async fn refresh_auth(&self, command: RefreshCommand) -> Result<AuthTokens, AuthError>;

    /// Send a reset-password link. Succeeds for unknown emails too.
    async fn forgot_password(&self, command: ForgotPasswordCommand) -> Result<(), AuthError>;

    /// Set a new password using a reset-password token.
    ///
    /// # Errors
    /// * `Unauthorized` - Token is invalid, expired or already used
    async fn reset_password(&self, command: ResetPasswordCommand) -> Result<(), AuthError>;

    /// Send a verify-email link to `user`.
    async fn send_verification_email(&self, user: &User) -> Result<(), AuthError>;

    /// Mark the token owner's email as verified.
    ///
    /// # Errors
    /// * `Unauthorized` - Token is invalid, expired or already used
    async fn verify_email(&self, command: VerifyEmailCommand) -> Result<(), AuthError>;

    /// Resolve a bearer access token to its user.
    ///
    /// # Errors
    /// * `Unauthorized` - Token is invalid or its user no longer exists
    async fn authenticate(&self, access_token: &str) -> Result<User, AuthError>;

    /// Apply an account update. A password change also revokes the user's
    /// refresh token.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `Conflict` - New email is already registered
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, AuthError>;
}

/// Password checks performed during login.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Whether `password` matches the stored `password_hash`. An unreadable
    /// hash counts as a mismatch.
    async fn verify(&self, password: &str, password_hash: &str) -> bool;

    /// Spend the cost of one verification without an account to check
    /// against. Never matches.
    async fn verify_decoy(&self, password: &str);
}
