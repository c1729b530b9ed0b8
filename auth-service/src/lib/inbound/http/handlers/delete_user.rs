use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use crate::domain::user::models::Right;
use crate::domain::user::models::UserId;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user_id = UserId::from_string(&user_id).map_err(UserError::from)?;
    current.authorize(Right::ManageUsers, Some(&user_id))?;

    state.user_service.delete_user(&user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
