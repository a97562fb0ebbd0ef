//! Configuration for the directory service

use color_eyre::Result;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Database connection URL
    pub database_url: String,

    /// Base URL of the identity provider (e.g., "https://auth.example.com")
    pub identity_url: String,
    /// Provider api key sent alongside user tokens, if the deployment uses one
    pub identity_api_key: Option<String>,
    /// Name of the browser session cookie carrying the access token
    pub session_cookie: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("DIRECTORY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("DIRECTORY_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3600),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),

            identity_url: env::var("IDENTITY_URL").expect("IDENTITY_URL must be set"),
            identity_api_key: env::var("IDENTITY_API_KEY").ok(),
            session_cookie: env::var("SESSION_COOKIE")
                .unwrap_or_else(|_| "session-token".to_string()),
        })
    }
}
