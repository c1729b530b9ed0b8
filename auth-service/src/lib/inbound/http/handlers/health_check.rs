use axum::extract::State;
use axum::http::StatusCode;

use super::ApiSuccess;
use crate::domain::health::models::HealthReport;
use crate::inbound::http::router::AppState;

pub async fn health_check(State(state): State<AppState>) -> ApiSuccess<HealthReport> {
    let report = state.health_service.check().await;
    let status = if report.is_healthy {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    ApiSuccess::new(status, report)
}
