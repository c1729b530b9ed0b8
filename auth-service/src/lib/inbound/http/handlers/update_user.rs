use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserResponseData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::Right;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserName;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// HTTP request body for updating a user (raw JSON)
///
/// Role and verification status are not client-editable.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, ApiError> {
        if self.name.is_none() && self.email.is_none() && self.password.is_none() {
            return Err(ApiError::BadRequest(
                "At least one of name, email or password is required".to_string(),
            ));
        }

        let parse = || -> Result<UpdateUserCommand, UserError> {
            Ok(UpdateUserCommand {
                name: self.name.map(UserName::new).transpose()?,
                email: self.email.map(EmailAddress::new).transpose()?,
                password: self.password.map(Password::new).transpose()?,
                ..UpdateUserCommand::default()
            })
        };

        Ok(parse()?)
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;
    current.authorize(Right::ManageUsers, Some(&user_id))?;

    let command = req.try_into_command()?;

    state
        .auth_service
        .update_user(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_rejected() {
        let request = UpdateUserRequest {
            name: None,
            email: None,
            password: None,
        };
        assert!(matches!(
            request.try_into_command(),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_partial_update() {
        let command = UpdateUserRequest {
            name: None,
            email: Some("New@X.com".to_string()),
            password: None,
        }
        .try_into_command()
        .unwrap();

        assert_eq!(command.email.unwrap().as_str(), "new@x.com");
        assert!(command.name.is_none());
        assert!(command.role.is_none());
    }
}
