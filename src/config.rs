//! Process-wide configuration.
//!
//! Loaded once at startup and passed explicitly to every component that
//! needs it; business logic never reads the environment. Database pool
//! settings live on [`crate::store::postgres::PostgresConfig`].

use chrono::Duration;

const DEV_JWT_SECRET: &str = "development_only_secret_not_for_production";

/// Service configuration, read from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind host (default: 0.0.0.0).
    pub http_host: String,
    /// Bind port (default: 8080).
    pub http_port: u16,
    /// Symmetric secret for signing access tokens.
    pub jwt_secret: String,
    /// How long issued access tokens stay valid.
    pub access_token_duration: Duration,
    /// NATS server URL.
    pub nats_url: String,
    /// NATS client name.
    pub nats_client_name: String,
}

impl Config {
    /// Load configuration from environment variables with development
    /// defaults.
    ///
    /// Reads `HTTP_HOST`, `HTTP_PORT`, `JWT_SECRET_KEY`,
    /// `ACCESS_TOKEN_DURATION_SECS`, `NATS_URL`, and `NATS_CLIENT_NAME`.
    /// A missing or empty `JWT_SECRET_KEY` falls back to a development
    /// secret and logs a warning.
    pub fn from_env() -> Self {
        let jwt_secret = match std::env::var("JWT_SECRET_KEY") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!(
                    "JWT_SECRET_KEY not set or empty. Using development secret. \
                     This is a SECURITY RISK in production!"
                );
                DEV_JWT_SECRET.to_string()
            }
        };

        Self {
            http_host: std::env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            jwt_secret,
            access_token_duration: Duration::seconds(
                std::env::var("ACCESS_TOKEN_DURATION_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(900),
            ),
            nats_url: std::env::var("NATS_URL")
                .unwrap_or_else(|_| "nats://localhost:4222".to_string()),
            nats_client_name: std::env::var("NATS_CLIENT_NAME")
                .unwrap_or_else(|_| "company-registry".to_string()),
        }
    }
}
