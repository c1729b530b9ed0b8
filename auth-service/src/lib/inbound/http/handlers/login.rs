use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::SessionResponseData;
use crate::domain::authentication::models::LoginCommand;
use crate::domain::user::models::EmailAddress;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    let command = LoginCommand {
        email: EmailAddress::new(body.email).map_err(UserError::from)?,
        password: body.password,
    };

    let session = state.auth_service.login(command).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        SessionResponseData {
            user: (&session.user).into(),
            tokens: session.tokens.into(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}
