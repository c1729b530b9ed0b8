use std::sync::Arc;
use std::time::Duration;

use auth::PasswordHasher;
use auth::TokenCodec;
use auth_service::config::Config;
use auth_service::config::EmailTransport;
use auth_service::domain::authentication::service::AuthService;
use auth_service::domain::email::ports::EmailSender;
use auth_service::domain::email::service::EmailService;
use auth_service::domain::health::ports::HealthIndicator;
use auth_service::domain::health::service::HealthCheckService;
use auth_service::domain::token::ports::TokenServicePort;
use auth_service::domain::token::service::TokenService;
use auth_service::domain::user::service::UserService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::email::logging::TracingEmailSender;
use auth_service::outbound::email::smtp::SmtpEmailSender;
use auth_service::outbound::health::PostgresHealthIndicator;
use auth_service::outbound::repositories::token::PostgresTokenRepository;
use auth_service::outbound::repositories::user::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_expiration_minutes = config.jwt.access_expiration_minutes,
        refresh_expiration_days = config.jwt.refresh_expiration_days,
        cleanup_interval_secs = config.tokens.cleanup_interval_secs,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = PasswordHasher::with_params(config.hashing)?;
    let codec = Arc::new(TokenCodec::new(config.jwt.secret.as_bytes()));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let token_repository = Arc::new(PostgresTokenRepository::new(pg_pool.clone()));

    let user_service = Arc::new(UserService::new(user_repository, password_hasher.clone()));
    let token_service = Arc::new(TokenService::new(
        token_repository,
        codec,
        config.jwt.token_settings(),
    ));
    let email_sender: Arc<dyn EmailSender> = match config.email.transport {
        EmailTransport::Log => Arc::new(TracingEmailSender::new()),
        EmailTransport::Smtp => {
            let smtp = config.email.smtp_settings()?;
            tracing::info!(host = %smtp.host, port = smtp.port, "Email delivery over smtp");
            Arc::new(SmtpEmailSender::new(&smtp)?)
        }
    };
    let email_service = Arc::new(EmailService::new(
        email_sender,
        config.email.email_settings(),
    ));
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_service),
        Arc::clone(&token_service),
        email_service,
        Arc::new(password_hasher),
    ));

    let indicators: Vec<Arc<dyn HealthIndicator>> =
        vec![Arc::new(PostgresHealthIndicator::new(pg_pool))];
    let health_service = Arc::new(HealthCheckService::new(indicators));

    if config.tokens.cleanup_interval_secs > 0 {
        spawn_token_sweeper(
            Arc::clone(&token_service),
            Duration::from_secs(config.tokens.cleanup_interval_secs),
        );
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, user_service, health_service);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}

/// Periodically delete expired token rows. Expiry is enforced on every read,
/// so a missed sweep only leaves garbage behind.
fn spawn_token_sweeper<TS>(token_service: Arc<TS>, period: Duration)
where
    TS: TokenServicePort,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = token_service.purge_expired().await {
                tracing::error!(error = %e, "Expired token sweep failed");
            }
        }
    });
}
