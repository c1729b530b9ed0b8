use std::env;

use auth::HashingParams;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::email::models::EmailSettings;
use crate::domain::token::models::TokenSettings;
use crate::outbound::email::smtp::SmtpSecurity;
use crate::outbound::email::smtp::SmtpSettings;

/// Upper bound on any token lifetime.
const MAX_TTL_DAYS: i64 = 3650;
const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    #[serde(default)]
    pub tokens: TokensConfig,
    #[serde(default)]
    pub hashing: HashingParams,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_expiration_minutes: i64,
    pub refresh_expiration_days: i64,
    pub reset_password_expiration_minutes: i64,
    pub verify_email_expiration_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    /// Sender address placed on outgoing mail
    pub from: String,
    /// Front-end base URL used to build reset and verification links
    pub app_url: String,
    #[serde(default)]
    pub transport: EmailTransport,
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_security: SmtpSecurity,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
}

/// Where outgoing mail goes.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmailTransport {
    /// Write mail to the log (local development)
    #[default]
    Log,
    /// Deliver through the configured SMTP relay
    Smtp,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokensConfig {
    /// Seconds between expired-token sweeps; 0 disables the sweep
    pub cleanup_interval_secs: u64,
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_secs: 3600,
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_smtp_port() -> u16 {
    587
}

fn check_ttl(name: &str, value: i64, max: i64) -> Result<(), ConfigError> {
    if value <= 0 || value > max {
        return Err(ConfigError::Message(format!(
            "jwt.{} must be between 1 and {}, got {}",
            name, max, value
        )));
    }
    Ok(())
}

impl JwtConfig {
    /// Reject secrets that are too short and lifetimes that are not positive
    /// or would overflow when added to the current time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < 32 {
            return Err(ConfigError::Message(
                "jwt.secret must be at least 32 bytes".to_string(),
            ));
        }

        let max_minutes = MAX_TTL_DAYS * MINUTES_PER_DAY;
        check_ttl("access_expiration_minutes", self.access_expiration_minutes, max_minutes)?;
        check_ttl("refresh_expiration_days", self.refresh_expiration_days, MAX_TTL_DAYS)?;
        check_ttl(
            "reset_password_expiration_minutes",
            self.reset_password_expiration_minutes,
            max_minutes,
        )?;
        check_ttl(
            "verify_email_expiration_minutes",
            self.verify_email_expiration_minutes,
            max_minutes,
        )
    }

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            access_ttl: Duration::minutes(self.access_expiration_minutes),
            refresh_ttl: Duration::days(self.refresh_expiration_days),
            reset_password_ttl: Duration::minutes(self.reset_password_expiration_minutes),
            verify_email_ttl: Duration::minutes(self.verify_email_expiration_minutes),
        }
    }
}

impl EmailConfig {
    pub fn email_settings(&self) -> EmailSettings {
        EmailSettings {
            from: self.from.clone(),
            app_url: self.app_url.trim_end_matches('/').to_string(),
        }
    }

    /// Relay settings for the SMTP transport.
    pub fn smtp_settings(&self) -> Result<SmtpSettings, ConfigError> {
        let host = self
            .smtp_host
            .clone()
            .filter(|host| !host.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Message(
                    "email.smtp_host is required when email.transport is smtp".to_string(),
                )
            })?;

        Ok(SmtpSettings {
            host,
            port: self.smtp_port,
            security: self.smtp_security,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
        })
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        config.jwt.validate()?;
        if config.email.transport == EmailTransport::Smtp {
            config.email.smtp_settings()?;
        }

        Ok(config)
    }
}
