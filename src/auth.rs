// ABOUTME: Password hashing and JWT token capabilities used by registration and sign-in
// ABOUTME: Wraps bcrypt and HS256 jsonwebtoken behind trait seams so tests can substitute them
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Authentication Capabilities
//!
//! The write-path orchestrators consume two capabilities: a password hasher
//! (`hash(plain) -> hash`, `verify(plain, hash) -> bool`) and a token issuer
//! (`issue(subject, claims, ttl) -> token`). Both are trait objects so the
//! orchestrators never know which primitive backs them; production wires in
//! bcrypt and HS256 JWTs.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::environment::AuthConfig;
use crate::models::AccountRole;

/// Password hashing capability
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password for storage
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying primitive fails.
    fn hash(&self, plain: &str) -> Result<String>;

    /// Compare a plaintext password against a stored hash
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash is malformed.
    fn verify(&self, plain: &str, password_hash: &str) -> Result<bool>;
}

/// bcrypt-backed password hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptHasher;

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plain: &str) -> Result<String> {
        bcrypt::hash(plain, bcrypt::DEFAULT_COST).context("bcrypt hashing failed")
    }

    fn verify(&self, plain: &str, password_hash: &str) -> Result<bool> {
        bcrypt::verify(plain, password_hash).context("bcrypt comparison failed")
    }
}

/// `JWT` claims carried by an access token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    /// Account email
    pub email: String,
    /// Account role
    pub role: AccountRole,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience
    pub aud: String,
    /// Issuer
    pub iss: String,
}

/// Token issuance capability
pub trait TokenIssuer: Send + Sync {
    /// Issue an access token for an account
    ///
    /// # Errors
    ///
    /// Returns an error if token encoding fails.
    fn issue(&self, account_id: Uuid, email: &str, role: AccountRole) -> Result<String>;
}

/// HS256 `JWT` issuer configured with secret, audience, issuer and TTL
pub struct JwtIssuer {
    secret: Vec<u8>,
    audience: String,
    issuer: String,
    token_ttl_secs: i64,
}

impl JwtIssuer {
    /// Create an issuer from the auth configuration
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.as_bytes().to_vec(),
            audience: config.audience.clone(),
            issuer: config.issuer.clone(),
            token_ttl_secs: config.token_ttl_secs,
        }
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns an error if the signature, audience, issuer or expiry is invalid.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.clone()]);
        validation.set_issuer(&[self.issuer.clone()]);

        let data = decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .context("token validation failed")?;
        Ok(data.claims)
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, account_id: Uuid, email: &str, role: AccountRole) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::seconds(self.token_ttl_secs);

        let claims = Claims {
            sub: account_id.to_string(),
            email: email.to_owned(),
            role,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            aud: self.audience.clone(),
            iss: self.issuer.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .context("token encoding failed")
    }
}
