use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;

use super::reset_password::TokenQuery;
use super::ApiError;
use crate::domain::authentication::models::VerifyEmailCommand;
use crate::inbound::http::router::AppState;

pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<StatusCode, ApiError> {
    state
        .auth_service
        .verify_email(VerifyEmailCommand { token: query.token })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
