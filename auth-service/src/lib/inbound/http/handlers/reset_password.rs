use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::domain::authentication::models::ResetPasswordCommand;
use crate::domain::user::models::Password;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn reset_password(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let password = Password::new(body.password).map_err(UserError::from)?;

    state
        .auth_service
        .reset_password(ResetPasswordCommand {
            token: query.token,
            password,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Query string carrying a purpose token (`?token=...`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordRequest {
    password: String,
}
