use std::sync::Arc;

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
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::authentication::ports::CredentialVerifier;
use crate::domain::email::ports::EmailServicePort;
use crate::domain::token::errors::TokenError;
use crate::domain::token::models::AuthTokens;
use crate::domain::token::models::TokenType;
use crate::domain::token::ports::TokenServicePort;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserServicePort;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const PLEASE_AUTHENTICATE: &str = "Please authenticate";
const INVALID_TOKEN: &str = "Invalid token";

/// Orchestrates the account flows on top of the user, token and email
/// services.
///
/// Every flow that spends a token consumes it before mutating the user, so a
/// token authorizes at most one mutation.
pub struct AuthService<US, TS, ES, CV>
where
    US: UserServicePort,
    TS: TokenServicePort,
    ES: EmailServicePort,
    CV: CredentialVerifier,
{
    user_service: Arc<US>,
    token_service: Arc<TS>,
    email_service: Arc<ES>,
    credentials: Arc<CV>,
}

impl<US, TS, ES, CV> AuthService<US, TS, ES, CV>
where
    US: UserServicePort,
    TS: TokenServicePort,
    ES: EmailServicePort,
    CV: CredentialVerifier,
{
    pub fn new(
        user_service: Arc<US>,
        token_service: Arc<TS>,
        email_service: Arc<ES>,
        credentials: Arc<CV>,
    ) -> Self {
        Self {
            user_service,
            token_service,
            email_service,
            credentials,
        }
    }

    async fn sign_in(&self, user: User) -> Result<AuthSession, AuthError> {
        let tokens = self.token_service.generate_auth_tokens(&user).await?;
        Ok(AuthSession { user, tokens })
    }

    /// Store failures stay `Unavailable`; every other token failure becomes a
    /// generic `Unauthorized` with `message`.
    fn rejected_token(error: TokenError, message: &str) -> AuthError {
        match error {
            TokenError::DatabaseError(_) | TokenError::Signing(_) => error.into(),
            _ => AuthError::unauthorized(message),
        }
    }

    fn vanished_user(error: UserError, message: &str) -> AuthError {
        match error {
            UserError::NotFound(_) | UserError::NotFoundByEmail(_) => {
                AuthError::unauthorized(message)
            }
            _ => error.into(),
        }
    }
}

#[async_trait]
impl<US, TS, ES, CV> AuthServicePort for AuthService<US, TS, ES, CV>
where
    US: UserServicePort,
    TS: TokenServicePort,
    ES: EmailServicePort,
    CV: CredentialVerifier,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError> {
        let user = self
            .user_service
            .create_user(CreateUserCommand::new(
                command.name,
                command.email,
                command.password,
            ))
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        self.sign_in(user).await
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError> {
        let user = match self.user_service.get_user_by_email(&command.email).await {
            Ok(user) => user,
            Err(UserError::NotFoundByEmail(_)) => {
                // Same hashing cost as a wrong password
                self.credentials.verify_decoy(&command.password).await;
                tracing::debug!("Login rejected: unknown email");
                return Err(AuthError::unauthorized(INVALID_CREDENTIALS));
            }
            Err(e) => return Err(e.into()),
        };

        let matches = self
            .credentials
            .verify(&command.password, &user.password_hash)
            .await;

        if !matches {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::unauthorized(INVALID_CREDENTIALS));
        }

        tracing::info!(user_id = %user.id, "User logged in");

        self.sign_in(user).await
    }

    async fn logout(&self, command: LogoutCommand) -> Result<(), AuthError> {
        let token = self
            .token_service
            .consume_token(&command.refresh_token, TokenType::Refresh)
            .await
            .map_err(|e| match e {
                TokenError::DatabaseError(_) | TokenError::Signing(_) => AuthError::from(e),
                _ => AuthError::NotFound("Token not found".to_string()),
            })?;

        tracing::info!(user_id = %token.user_id, "User logged out");

        Ok(())
    }

    async fn refresh_auth(&self, command: RefreshCommand) -> Result<AuthTokens, AuthError> {
        let token = self
            .token_service
            .consume_token(&command.refresh_token, TokenType::Refresh)
            .await
            .map_err(|e| Self::rejected_token(e, PLEASE_AUTHENTICATE))?;

        let user = self
            .user_service
            .get_user(&token.user_id)
            .await
            .map_err(|e| Self::vanished_user(e, PLEASE_AUTHENTICATE))?;

        let tokens = self.token_service.generate_auth_tokens(&user).await?;
        tracing::debug!(user_id = %user.id, "Auth tokens refreshed");

        Ok(tokens)
    }

    async fn forgot_password(&self, command: ForgotPasswordCommand) -> Result<(), AuthError> {
        let user = match self.user_service.get_user_by_email(&command.email).await {
            Ok(user) => user,
            Err(UserError::NotFoundByEmail(_)) => {
                tracing::debug!("Password reset requested for unknown email");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let token = self
            .token_service
            .generate_reset_password_token(&user)
            .await?;

        if let Err(e) = self
            .email_service
            .send_reset_password_email(&user.email, &token)
            .await
        {
            tracing::error!(user_id = %user.id, error = %e, "Reset password email not sent");
        }

        Ok(())
    }

    async fn reset_password(&self, command: ResetPasswordCommand) -> Result<(), AuthError> {
        let token = self
            .token_service
            .consume_token(&command.token, TokenType::ResetPassword)
            .await
            .map_err(|e| Self::rejected_token(e, INVALID_TOKEN))?;

        let user = self
            .user_service
            .update_user(&token.user_id, UpdateUserCommand::password(command.password))
            .await
            .map_err(|e| Self::vanished_user(e, "Password reset failed"))?;

        // Sessions opened with the old password do not survive the reset
        self.token_service
            .delete_token(TokenType::Refresh, &user.id)
            .await?;

        tracing::info!(user_id = %user.id, "Password reset");

        Ok(())
    }

    async fn send_verification_email(&self, user: &User) -> Result<(), AuthError> {
        let token = self.token_service.generate_verify_email_token(user).await?;

        if let Err(e) = self
            .email_service
            .send_verification_email(&user.email, &token)
            .await
        {
            tracing::error!(user_id = %user.id, error = %e, "Verification email not sent");
        }

        Ok(())
    }

    async fn verify_email(&self, command: VerifyEmailCommand) -> Result<(), AuthError> {
        let token = self
            .token_service
            .consume_token(&command.token, TokenType::VerifyEmail)
            .await
            .map_err(|e| Self::rejected_token(e, INVALID_TOKEN))?;

        let user = self
            .user_service
            .update_user(&token.user_id, UpdateUserCommand::verified_email())
            .await
            .map_err(|e| Self::vanished_user(e, "Verify email failed"))?;

        tracing::info!(user_id = %user.id, "Email verified");

        Ok(())
    }

    async fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        let user_id = self
            .token_service
            .verify_access_token(access_token)
            .await
            .map_err(|e| Self::rejected_token(e, PLEASE_AUTHENTICATE))?;

        self.user_service
            .get_user(&user_id)
            .await
            .map_err(|e| Self::vanished_user(e, PLEASE_AUTHENTICATE))
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, AuthError> {
        let password_changed = command.password.is_some();
        let user = self.user_service.update_user(id, command).await?;

        if password_changed {
            self.token_service
                .delete_token(TokenType::Refresh, &user.id)
                .await?;
            tracing::info!(user_id = %user.id, "Password changed, refresh token revoked");
        }

        Ok(user)
    }
}
