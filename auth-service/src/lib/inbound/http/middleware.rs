use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::user::models::Right;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

const PLEASE_AUTHENTICATE: &str = "Please authenticate";

/// Extension holding the user resolved from the bearer access token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Allow the request when the role grants `right` or when it targets the
    /// caller's own account.
    pub fn authorize(&self, right: Right, target: Option<&UserId>) -> Result<(), ApiError> {
        let user = &self.0;
        if user.role.has_right(right.as_str()) || target == Some(&user.id) {
            return Ok(());
        }

        tracing::warn!(user_id = %user.id, right = right.as_str(), "Permission denied");
        Err(ApiError::Forbidden("Forbidden".to_string()))
    }
}

/// Middleware that validates the access token and adds the user to request
/// extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req).map_err(IntoResponse::into_response)?;

    let user = state
        .auth_service
        .authenticate(token)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| {
            tracing::debug!("Missing Authorization header");
            ApiError::Unauthorized(PLEASE_AUTHENTICATE.to_string())
        })?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized(PLEASE_AUTHENTICATE.to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized(PLEASE_AUTHENTICATE.to_string()))
}
