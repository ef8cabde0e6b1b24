// ABOUTME: Classified error types for the registration, sign-in and booking admission paths
// ABOUTME: Maps every failure kind to a stable wire code and HTTP status with a JSON body
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Unified Error Handling
//!
//! Every failure a write path can produce is one named variant of a domain
//! error enum. Each variant carries a stable SCREAMING_SNAKE wire code and an
//! HTTP status, and all of them render as the same JSON body:
//!
//! ```json
//! {"error": {"code": "ROOM_ALREADY_BOOKED", "message": "..."}}
//! ```
//!
//! Three propagation classes exist: client faults (4xx, terminal, never
//! retried), dependency faults (5xx, safe to retry the whole operation), and
//! the integrity fault [`RegistrationError::CompensationFailed`], which is
//! surfaced loudly because it means an orphaned account needs an operator.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{MembershipTier, RoomName};

/// Failure kinds of the registration pipeline
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// An account with the requested email already exists
    #[error("account with this email already exists")]
    DuplicateAccount,
    /// The client-profile service rejected or never received the provision call
    #[error("failed to create client profile: {0}")]
    ProfileProvisioningFailed(String),
    /// The token capability failed after the account and profile were created
    #[error("could not generate access token: {0}")]
    TokenIssuanceFailed(String),
    /// Rolling back the locally created account failed; the row is orphaned
    #[error("failed to compensate account {account_id}: {reason} (original failure: {original})")]
    CompensationFailed {
        /// Account left behind in the store
        account_id: Uuid,
        /// Why the delete failed
        reason: String,
        /// The failure that triggered compensation in the first place
        original: String,
    },
    /// Catch-all for faults outside the named taxonomy
    #[error("registration failed due to an unexpected error: {0}")]
    UnexpectedFailure(String),
}

impl RegistrationError {
    /// Stable wire code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DuplicateAccount => "DUPLICATE_ACCOUNT",
            Self::ProfileProvisioningFailed(_) => "PROFILE_PROVISIONING_FAILED",
            Self::TokenIssuanceFailed(_) => "TOKEN_ISSUANCE_FAILED",
            Self::CompensationFailed { .. } => "COMPENSATION_FAILED",
            Self::UnexpectedFailure(_) => "UNEXPECTED_FAILURE",
        }
    }

    /// HTTP status for this failure kind
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::DuplicateAccount => StatusCode::BAD_REQUEST,
            Self::ProfileProvisioningFailed(_)
            | Self::TokenIssuanceFailed(_)
            | Self::CompensationFailed { .. }
            | Self::UnexpectedFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failure kinds of the sign-in verifier
#[derive(Debug, Error)]
pub enum SignInError {
    /// The credentials lookup itself failed; nothing about the account is known
    #[error("could not fetch the account, please try again later")]
    LookupFailed(String),
    /// Unknown email or wrong password; the two are deliberately not distinguished
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The account exists but has been deactivated
    #[error("account is inactive, please contact support")]
    AccountInactive,
    /// The token capability failed after a successful password check
    #[error("could not generate access token: {0}")]
    TokenIssuanceFailed(String),
}

impl SignInError {
    /// Stable wire code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::LookupFailed(_) => "LOOKUP_FAILED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::TokenIssuanceFailed(_) => "TOKEN_ISSUANCE_FAILED",
        }
    }

    /// HTTP status for this failure kind
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::AccountInactive => StatusCode::UNAUTHORIZED,
            Self::LookupFailed(_) | Self::TokenIssuanceFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Failure kinds of booking admission, in checking order
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// `end_time` is not after `start_time`
    #[error("end time must be after start time")]
    InvalidInterval,
    /// The requested slot starts in the past
    #[error("booking start time cannot be in the past")]
    StartInPast,
    /// The requested slot is longer than the configured cap
    #[error("booking duration cannot be longer than {max_minutes} minutes")]
    DurationExceeded {
        /// Configured cap, for the client-facing message
        max_minutes: i64,
    },
    /// No active room with the requested id
    #[error("room with id {0} not found or is not active")]
    RoomNotFound(Uuid),
    /// Another pending/confirmed booking overlaps the requested slot
    #[error("room {0} is already booked")]
    RoomAlreadyBooked(RoomName),
    /// The user has no active membership
    #[error("user does not have an active membership")]
    NoActiveMembership,
    /// The membership service could not be consulted; retrying may succeed
    #[error("failed to verify user membership: {0}")]
    MembershipVerificationFailed(String),
    /// The membership tier is blocked from this room
    #[error("{tier} members cannot reserve {room}")]
    RoomBlockedForTier {
        /// Tier of the verified membership
        tier: MembershipTier,
        /// Room the tier is blocked from
        room: RoomName,
    },
    /// The booking row could not be written
    #[error("could not create booking due to a database error: {0}")]
    PersistenceFailed(String),
}

impl AdmissionError {
    /// Stable wire code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInterval => "INVALID_INTERVAL",
            Self::StartInPast => "START_IN_PAST",
            Self::DurationExceeded { .. } => "DURATION_EXCEEDED",
            Self::RoomNotFound(_) => "ROOM_NOT_FOUND",
            Self::RoomAlreadyBooked(_) => "ROOM_ALREADY_BOOKED",
            Self::NoActiveMembership => "NO_ACTIVE_MEMBERSHIP",
            Self::MembershipVerificationFailed(_) => "MEMBERSHIP_VERIFICATION_FAILED",
            Self::RoomBlockedForTier { .. } => "ROOM_BLOCKED_FOR_TIER",
            Self::PersistenceFailed(_) => "PERSISTENCE_FAILED",
        }
    }

    /// HTTP status for this failure kind
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidInterval
            | Self::StartInPast
            | Self::DurationExceeded { .. }
            | Self::NoActiveMembership
            | Self::RoomBlockedForTier { .. } => StatusCode::BAD_REQUEST,
            Self::RoomNotFound(_) => StatusCode::NOT_FOUND,
            Self::RoomAlreadyBooked(_) => StatusCode::CONFLICT,
            Self::MembershipVerificationFailed(_) | Self::PersistenceFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error envelope
    pub error: ErrorDetails,
}

/// Payload of [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Stable SCREAMING_SNAKE code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// Error as rendered to an HTTP client
///
/// Domain errors convert into this via `From`, so route handlers can return
/// `Result<_, ApiError>` and use `?` on any classified failure.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Build an error response directly, for request-shape validation
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_INPUT",
            message: message.into(),
        }
    }

    /// HTTP status of this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable wire code of this error
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl From<RegistrationError> for ApiError {
    fn from(error: RegistrationError) -> Self {
        Self {
            status: error.http_status(),
            code: error.code(),
            message: error.to_string(),
        }
    }
}

impl From<SignInError> for ApiError {
    fn from(error: SignInError) -> Self {
        Self {
            status: error.http_status(),
            code: error.code(),
            message: error.to_string(),
        }
    }
}

impl From<AdmissionError> for ApiError {
    fn from(error: AdmissionError) -> Self {
        Self {
            status: error.http_status(),
            code: error.code(),
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.code.to_owned(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_statuses() {
        assert_eq!(
            RegistrationError::DuplicateAccount.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RegistrationError::ProfileProvisioningFailed("down".into()).http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RegistrationError::CompensationFailed {
                account_id: Uuid::new_v4(),
                reason: "db gone".into(),
                original: "profile down".into(),
            }
            .code(),
            "COMPENSATION_FAILED"
        );
    }

    #[test]
    fn sign_in_statuses() {
        assert_eq!(
            SignInError::InvalidCredentials.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            SignInError::AccountInactive.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            SignInError::LookupFailed("pool closed".into()).http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn admission_statuses_follow_the_taxonomy() {
        assert_eq!(
            AdmissionError::StartInPast.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AdmissionError::RoomNotFound(Uuid::new_v4()).http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AdmissionError::RoomAlreadyBooked(RoomName::IceRoom).http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AdmissionError::MembershipVerificationFailed("timeout".into()).http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn api_error_renders_stable_codes() {
        let error: ApiError = AdmissionError::RoomBlockedForTier {
            tier: MembershipTier::Standard,
            room: RoomName::IceRoom,
        }
        .into();
        assert_eq!(error.code(), "ROOM_BLOCKED_FOR_TIER");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }
}
