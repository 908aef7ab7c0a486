//! Server configuration
//!
//! Loaded from environment variables (a `.env` file is honored by `main`).

use std::str::FromStr;

use thiserror::Error;

use crate::auth::JwtConfig;
use crate::auth::jwt::{MAX_EXPIRATION_MINUTES, MIN_SECRET_LEN, generate_printable_secret};
use crate::orders::{PricingPolicy, StatusPolicy};

pub const DEFAULT_HTTP_PORT: u16 = 2424;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Secret(String),
}

/// Persistence backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local storage, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{other}'")),
        }
    }
}

/// Credentials for the admin account created at startup when absent
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL (required for the Postgres backend)
    pub database_url: Option<String>,
    pub storage: StorageBackend,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    pub jwt: JwtConfig,
    pub log_level: String,
    pub log_json: bool,
    /// Directory for rolling log files
    pub log_dir: Option<String>,
    pub pricing_policy: PricingPolicy,
    pub status_policy: StatusPolicy,
    pub admin: Option<AdminBootstrap>,
}

impl Config {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let storage = parse_or("STORAGE", var("STORAGE"), StorageBackend::default())?;
        let database_url = var("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let mut jwt = JwtConfig::new(jwt_secret(var("JWT_SECRET"), &environment)?);
        jwt.expiration_minutes = parse_or(
            "JWT_EXPIRATION_MINUTES",
            var("JWT_EXPIRATION_MINUTES"),
            jwt.expiration_minutes,
        )?;
        if !(1..=MAX_EXPIRATION_MINUTES).contains(&jwt.expiration_minutes) {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRATION_MINUTES",
                value: jwt.expiration_minutes.to_string(),
                reason: format!("must be between 1 and {MAX_EXPIRATION_MINUTES}"),
            });
        }
        if let Some(issuer) = var("JWT_ISSUER") {
            jwt.issuer = issuer;
        }
        if let Some(audience) = var("JWT_AUDIENCE") {
            jwt.audience = audience;
        }

        let admin = match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("ADMIN_EMAIL")),
        };

        Ok(Self {
            database_url,
            storage,
            http_port: parse_or("HTTP_PORT", var("HTTP_PORT"), DEFAULT_HTTP_PORT)?,
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: parse_or("LOG_JSON", var("LOG_JSON"), environment != "development")?,
            log_dir: var("LOG_DIR"),
            pricing_policy: parse_or(
                "ORDER_PRICING_POLICY",
                var("ORDER_PRICING_POLICY"),
                PricingPolicy::default(),
            )?,
            status_policy: parse_or(
                "ORDER_STATUS_POLICY",
                var("ORDER_STATUS_POLICY"),
                StatusPolicy::default(),
            )?,
            environment,
            jwt,
            admin,
        })
    }
}

/// JWT_SECRET is mandatory outside development
fn jwt_secret(value: Option<String>, environment: &str) -> Result<String, ConfigError> {
    match value {
        Some(secret) if secret.len() < MIN_SECRET_LEN => Err(ConfigError::Secret(format!(
            "JWT_SECRET must be at least {MIN_SECRET_LEN} characters long"
        ))),
        Some(secret) => Ok(secret),
        None if environment == "development" => {
            tracing::warn!("JWT_SECRET not set, generating a temporary development key");
            generate_printable_secret().map_err(|e| ConfigError::Secret(e.to_string()))
        }
        None => Err(ConfigError::Secret(format!(
            "JWT_SECRET must be set in {environment} environment"
        ))),
    }
}

fn parse_or<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
