// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Environment-based configuration management for production deployment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

use crate::constants::{defaults, limits, ports, timeouts};

/// Environment type for security-sensitive defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Complete server configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Sibling service endpoints
    pub services: ExternalServicesConfig,
    /// Outbound HTTP client settings
    pub http_client: HttpClientConfig,
    /// Booking admission settings
    pub booking: BookingConfig,
    /// Registration saga settings
    pub registration: RegistrationConfig,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (sqlite path)
    pub url: String,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Token audience claim
    pub audience: String,
    /// Token issuer claim
    pub issuer: String,
    /// Access-token lifetime in seconds
    pub token_ttl_secs: i64,
}

/// Base URLs of the sibling services this server calls
#[derive(Debug, Clone)]
pub struct ExternalServicesConfig {
    /// Client-profile service base URL
    pub client_service_url: String,
    /// Membership service base URL
    pub membership_service_url: String,
}

/// Outbound HTTP client settings
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

/// Booking admission settings
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Longest slot a single booking may reserve, in seconds
    pub max_duration_secs: i64,
}

/// Registration saga settings
#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    /// Grace period before a `provisioning` account counts as orphaned, in seconds
    pub sweep_grace_secs: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable fails to parse, or if
    /// `JWT_SECRET` is missing in a production environment.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let environment = Environment::from_str_or_default(
            &env::var("ENVIRONMENT").unwrap_or_default(),
        );

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if environment.is_production() => {
                anyhow::bail!("JWT_SECRET must be set in production")
            }
            _ => {
                warn!("JWT_SECRET not set, generating an ephemeral secret (tokens will not survive restarts)");
                generate_ephemeral_secret()
            }
        };

        Ok(Self {
            http_port: env_var_or("HTTP_PORT", &ports::DEFAULT_HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            environment,
            database: DatabaseConfig {
                url: env_var_or("DATABASE_URL", defaults::DATABASE_URL),
            },
            auth: AuthConfig {
                jwt_secret,
                audience: env_var_or("JWT_AUDIENCE", defaults::JWT_AUDIENCE),
                issuer: env_var_or("JWT_ISSUER", defaults::JWT_ISSUER),
                token_ttl_secs: env_var_or(
                    "JWT_TTL_SECS",
                    &limits::DEFAULT_TOKEN_TTL_SECS.to_string(),
                )
                .parse()
                .context("Invalid JWT_TTL_SECS value")?,
            },
            services: ExternalServicesConfig {
                client_service_url: env_var_or("CLIENT_SERVICE_URL", defaults::CLIENT_SERVICE_URL),
                membership_service_url: env_var_or(
                    "MEMBERSHIP_SERVICE_URL",
                    defaults::MEMBERSHIP_SERVICE_URL,
                ),
            },
            http_client: HttpClientConfig {
                timeout_secs: env_var_or(
                    "HTTP_CLIENT_TIMEOUT_SECS",
                    &timeouts::DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
                )
                .parse()
                .context("Invalid HTTP_CLIENT_TIMEOUT_SECS value")?,
                connect_timeout_secs: env_var_or(
                    "HTTP_CONNECT_TIMEOUT_SECS",
                    &timeouts::DEFAULT_HTTP_CONNECT_TIMEOUT_SECS.to_string(),
                )
                .parse()
                .context("Invalid HTTP_CONNECT_TIMEOUT_SECS value")?,
            },
            booking: BookingConfig {
                max_duration_secs: env_var_or(
                    "MAX_BOOKING_DURATION_SECS",
                    &limits::MAX_BOOKING_DURATION_SECS.to_string(),
                )
                .parse()
                .context("Invalid MAX_BOOKING_DURATION_SECS value")?,
            },
            registration: RegistrationConfig {
                sweep_grace_secs: env_var_or(
                    "REGISTRATION_SWEEP_GRACE_SECS",
                    &limits::REGISTRATION_SWEEP_GRACE_SECS.to_string(),
                )
                .parse()
                .context("Invalid REGISTRATION_SWEEP_GRACE_SECS value")?,
            },
        })
    }

    /// One-line-per-setting startup summary, safe to log
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Atrium Club Server Configuration:\n\
             - HTTP Port: {}\n\
             - Environment: {:?}\n\
             - Database: {}\n\
             - Client Service: {}\n\
             - Membership Service: {}\n\
             - Token TTL: {}s\n\
             - Max Booking Duration: {}s",
            self.http_port,
            self.environment,
            self.database.url,
            self.services.client_service_url,
            self.services.membership_service_url,
            self.auth.token_ttl_secs,
            self.booking.max_duration_secs,
        )
    }
}

fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn generate_ephemeral_secret() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_aliases() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(
            Environment::from_str_or_default("anything"),
            Environment::Development
        );
    }

    #[test]
    fn ephemeral_secret_is_hex_of_32_bytes() {
        let secret = generate_ephemeral_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
