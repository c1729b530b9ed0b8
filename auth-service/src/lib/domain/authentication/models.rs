use crate::domain::token::models::AuthTokens;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::User;
use crate::domain::user::models::UserName;

/// Self-registration of a new account.
#[derive(Debug)]
pub struct RegisterCommand {
    pub name: UserName,
    pub email: EmailAddress,
    pub password: Password,
}

/// Credentials presented at login.
///
/// The password is not checked against the policy here: accounts created
/// before a policy change must still be able to log in.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: EmailAddress,
    pub password: String,
}

#[derive(Debug)]
pub struct LogoutCommand {
    pub refresh_token: String,
}

#[derive(Debug)]
pub struct RefreshCommand {
    pub refresh_token: String,
}

#[derive(Debug)]
pub struct ForgotPasswordCommand {
    pub email: EmailAddress,
}

#[derive(Debug)]
pub struct ResetPasswordCommand {
    pub token: String,
    pub password: Password,
}

#[derive(Debug)]
pub struct VerifyEmailCommand {
    pub token: String,
}

/// Authenticated user together with a freshly minted token pair.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub tokens: AuthTokens,
}
