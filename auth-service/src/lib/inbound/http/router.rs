use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_user::create_user;
use super::handlers::delete_user::delete_user;
use super::handlers::forgot_password::forgot_password;
use super::handlers::get_user::get_user;
use super::handlers::health_check::health_check;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::refresh_tokens::refresh_tokens;
use super::handlers::register::register;
use super::handlers::reset_password::reset_password;
use super::handlers::send_verification_email::send_verification_email;
use super::handlers::update_user::update_user;
use super::handlers::verify_email::verify_email;
use super::middleware::authenticate as auth_middleware;
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::health::service::HealthCheckService;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub user_service: Arc<dyn UserServicePort>,
    pub health_service: Arc<HealthCheckService>,
}

pub fn create_router(
    auth_service: Arc<dyn AuthServicePort>,
    user_service: Arc<dyn UserServicePort>,
    health_service: Arc<HealthCheckService>,
) -> Router {
    let state = AppState {
        auth_service,
        user_service,
        health_service,
    };

    let public_routes = Router::new()
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/logout", post(logout))
        .route("/v1/auth/refresh-tokens", post(refresh_tokens))
        .route("/v1/auth/forgot-password", post(forgot_password))
        .route("/v1/auth/reset-password", post(reset_password))
        .route("/v1/auth/verify-email", post(verify_email))
        .route("/v1/health-check", get(health_check));

    let protected_routes = Router::new()
        .route(
            "/v1/auth/send-verification-email",
            post(send_verification_email),
        )
        .route("/v1/users", get(list_users).post(create_user))
        .route(
            "/v1/users/:user_id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Headers are left out of the span: they carry bearer tokens
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri().path(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                path = %request.uri().path(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::authentication::service::AuthService;
    use crate::domain::email::models::EmailSettings;
    use crate::domain::email::service::EmailService;
    use crate::domain::token::models::TokenSettings;
    use crate::domain::token::service::TokenService;
    use crate::domain::user::service::UserService;
    use crate::outbound::email::logging::TracingEmailSender;
    use crate::outbound::repositories::memory::InMemoryTokenRepository;
    use crate::outbound::repositories::memory::InMemoryUserRepository;

    fn router() -> Router {
        let hasher = auth::PasswordHasher::with_params(auth::HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();

        let user_service = Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            hasher.clone(),
        ));
        let token_service = Arc::new(TokenService::new(
            Arc::new(InMemoryTokenRepository::new()),
            Arc::new(auth::TokenCodec::new(b"router-test-secret-at-least-32-bytes")),
            TokenSettings::default(),
        ));
        let email_service = Arc::new(EmailService::new(
            Arc::new(TracingEmailSender::new()),
            EmailSettings {
                from: "no-reply@example.com".to_string(),
                app_url: "http://localhost".to_string(),
            },
        ));
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&user_service),
            token_service,
            email_service,
            Arc::new(hasher),
        ));

        create_router(
            auth_service,
            user_service,
            Arc::new(HealthCheckService::default()),
        )
    }

    #[tokio::test]
    async fn test_health_check_route() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/v1/health-check")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_without_token() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/v1/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/api/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
