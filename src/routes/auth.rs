// ABOUTME: Registration and sign-in route handlers
// ABOUTME: Validates request shape, delegates to the registration service, maps errors to HTTP
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::constants::limits;
use crate::errors::ApiError;
use crate::models::AccountSummary;
use crate::registration::RegisterInput;

/// Registration request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Unique account email
    pub email: String,
    /// Plaintext password
    pub password: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Optional phone number
    #[serde(default)]
    pub phone: Option<String>,
}

/// Registration response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Freshly issued access token
    pub access_token: String,
    /// Public summary of the created account
    pub user: AccountSummary,
}

/// Sign-in request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Sign-in response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Freshly issued access token
    pub access_token: String,
}

/// Registration and sign-in routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    validate_register(&request)?;

    let outcome = state
        .registration
        .register(RegisterInput {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            access_token: outcome.access_token,
            user: outcome.account,
        }),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state
        .registration
        .sign_in(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        access_token: outcome.access_token,
    }))
}

fn validate_register(request: &RegisterRequest) -> Result<(), ApiError> {
    if !is_valid_email(&request.email) {
        return Err(ApiError::invalid_input("Invalid email format"));
    }
    if request.password.len() < limits::MIN_PASSWORD_LEN
        || request.password.len() > limits::MAX_PASSWORD_LEN
    {
        return Err(ApiError::invalid_input(format!(
            "Password must be between {} and {} characters",
            limits::MIN_PASSWORD_LEN,
            limits::MAX_PASSWORD_LEN
        )));
    }
    if request.first_name.is_empty() || request.first_name.len() > limits::MAX_NAME_LEN {
        return Err(ApiError::invalid_input("First name is empty or too long"));
    }
    if request.last_name.is_empty() || request.last_name.len() > limits::MAX_NAME_LEN {
        return Err(ApiError::invalid_input("Last name is empty or too long"));
    }
    if let Some(phone) = &request.phone {
        if phone.len() > limits::MAX_PHONE_LEN {
            return Err(ApiError::invalid_input("Phone number is too long"));
        }
    }
    Ok(())
}

/// Validate email format
#[must_use]
fn is_valid_email(email: &str) -> bool {
    if email.len() <= 5 {
        return false;
    }
    let Some(at_pos) = email.find('@') else {
        return false;
    };
    if at_pos == 0 || at_pos == email.len() - 1 {
        return false;
    }
    let domain_part = &email[at_pos + 1..];
    domain_part.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_owned(),
            password: password.to_owned(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone: None,
        }
    }

    #[test]
    fn accepts_a_plain_email() {
        assert!(validate_register(&request("ada@atrium.club", "swordfish")).is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["", "short", "@no-local.part", "no-at-sign.com", "trailing@"] {
            assert!(validate_register(&request(email, "swordfish")).is_err());
        }
    }

    #[test]
    fn enforces_password_bounds() {
        assert!(validate_register(&request("ada@atrium.club", "tiny")).is_err());
        assert!(validate_register(&request("ada@atrium.club", &"x".repeat(51))).is_err());
        assert!(validate_register(&request("ada@atrium.club", &"x".repeat(50))).is_ok());
    }
}
