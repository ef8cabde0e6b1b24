// ABOUTME: Core data models for the Atrium Club record-keeping services
// ABOUTME: Defines Account, Booking, Room, Membership and their status enums
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Data Models
//!
//! Core data structures shared by the registration, sign-in and booking
//! admission paths. Wire names follow the JSON casing of the HTTP surface
//! (camelCase fields, lowercase enum values, SCREAMING_SNAKE room names).

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role attached to an account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// Regular club client, the only role produced by self-registration
    #[default]
    Client,
    /// Club staff managing rooms and bookings
    Manager,
    /// Operator role with full access
    Admin,
}

impl AccountRole {
    /// Database representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown account role: {other}")),
        }
    }
}

impl Display for AccountRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Provisioning stage of an account
///
/// An account row is written in `Provisioning` before its remote profile
/// exists and flipped to `Active` only once the whole registration pipeline
/// has finished. Rows stuck in `Provisioning` are orphans from an interrupted
/// registration and are removed by the startup sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountState {
    /// Local row exists, remote profile not yet confirmed
    Provisioning,
    /// Registration completed end-to-end
    Active,
}

impl AccountState {
    /// Database representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Provisioning => "provisioning",
            Self::Active => "active",
        }
    }
}

impl FromStr for AccountState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "provisioning" => Ok(Self::Provisioning),
            "active" => Ok(Self::Active),
            other => Err(format!("unknown account state: {other}")),
        }
    }
}

/// A locally stored credential record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique account id
    pub id: Uuid,
    /// Unique email, stored and compared case-sensitively
    pub email: String,
    /// bcrypt password hash, never serialized to clients
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role
    pub role: AccountRole,
    /// Registration pipeline stage
    pub state: AccountState,
    /// Deactivated accounts cannot sign in
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account record in the provisioning stage
    #[must_use]
    pub fn new(email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            role: AccountRole::Client,
            state: AccountState::Provisioning,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public summary returned by the registration and sign-in responses
    #[must_use]
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Projection of an account returned to API clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    /// Account id
    pub id: Uuid,
    /// Account email
    pub email: String,
    /// Account role
    pub role: AccountRole,
}

/// Credentials projection used by the sign-in verifier
///
/// Deliberately narrow: only the columns the password check needs.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    /// Account id
    pub id: Uuid,
    /// Account email
    pub email: String,
    /// bcrypt password hash
    pub password_hash: String,
    /// Account role
    pub role: AccountRole,
    /// Deactivated accounts are rejected before any password comparison
    pub is_active: bool,
}

/// Fixed catalog of bookable rooms
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RoomName {
    /// General training room 1
    #[serde(rename = "TRAINING_ROOM_1")]
    TrainingRoom1,
    /// General training room 2
    #[serde(rename = "TRAINING_ROOM_2")]
    TrainingRoom2,
    /// General training room 3
    #[serde(rename = "TRAINING_ROOM_3")]
    TrainingRoom3,
    /// Aromatherapy room
    #[serde(rename = "AROMATHERAPY_ROOM")]
    AromatherapyRoom,
    /// Default sauna
    #[serde(rename = "DEFAULT_SAUNA")]
    DefaultSauna,
    /// Ice room
    #[serde(rename = "ICE_ROOM")]
    IceRoom,
    /// Steam sauna
    #[serde(rename = "STREAM_SAUNA")]
    StreamSauna,
}

impl RoomName {
    /// Database and wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TrainingRoom1 => "TRAINING_ROOM_1",
            Self::TrainingRoom2 => "TRAINING_ROOM_2",
            Self::TrainingRoom3 => "TRAINING_ROOM_3",
            Self::AromatherapyRoom => "AROMATHERAPY_ROOM",
            Self::DefaultSauna => "DEFAULT_SAUNA",
            Self::IceRoom => "ICE_ROOM",
            Self::StreamSauna => "STREAM_SAUNA",
        }
    }

    /// All rooms in the fixed catalog, in seeding order
    #[must_use]
    pub const fn catalog() -> [Self; 7] {
        [
            Self::TrainingRoom1,
            Self::TrainingRoom2,
            Self::TrainingRoom3,
            Self::AromatherapyRoom,
            Self::DefaultSauna,
            Self::IceRoom,
            Self::StreamSauna,
        ]
    }
}

impl FromStr for RoomName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRAINING_ROOM_1" => Ok(Self::TrainingRoom1),
            "TRAINING_ROOM_2" => Ok(Self::TrainingRoom2),
            "TRAINING_ROOM_3" => Ok(Self::TrainingRoom3),
            "AROMATHERAPY_ROOM" => Ok(Self::AromatherapyRoom),
            "DEFAULT_SAUNA" => Ok(Self::DefaultSauna),
            "ICE_ROOM" => Ok(Self::IceRoom),
            "STREAM_SAUNA" => Ok(Self::StreamSauna),
            other => Err(format!("unknown room name: {other}")),
        }
    }
}

impl Display for RoomName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Static reference data for a bookable room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Room id
    pub id: Uuid,
    /// Room name from the fixed catalog
    pub name: RoomName,
    /// Inactive rooms cannot be booked
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle status of a booking
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Admitted, awaiting confirmation
    Pending,
    /// Confirmed by staff
    Confirmed,
    /// Cancelled, no longer occupies its slot
    Cancelled,
}

impl BookingStatus {
    /// Database representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// A reserved time slot on a room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Booking id
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Booked room
    pub room_id: Uuid,
    /// Membership that was verified at admission time
    pub membership_id: Uuid,
    /// Slot start (inclusive)
    pub start_time: DateTime<Utc>,
    /// Slot end (exclusive); back-to-back bookings do not overlap
    pub end_time: DateTime<Utc>,
    /// Lifecycle status
    pub status: BookingStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Membership tier, as reported by the membership service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MembershipTier {
    /// Entry tier
    Standard,
    /// Mid tier
    Platinum,
    /// Top tier
    Diamond,
}

impl Display for MembershipTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Platinum => write!(f, "platinum"),
            Self::Diamond => write!(f, "diamond"),
        }
    }
}

/// Membership record owned by the membership service
///
/// This service only ever reads memberships over HTTP; the owning service is
/// responsible for expiry and deactivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// Membership id
    pub id: Uuid,
    /// Owning client
    pub client_id: Uuid,
    /// Membership tier
    #[serde(rename = "type")]
    pub tier: MembershipTier,
    /// Whether the membership is currently active
    pub is_active: bool,
    /// Membership start
    pub start_date: DateTime<Utc>,
    /// Membership expiry
    pub end_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_new_starts_provisioning() {
        let account = Account::new("a@b.co".into(), "hash".into());
        assert_eq!(account.state, AccountState::Provisioning);
        assert_eq!(account.role, AccountRole::Client);
        assert!(account.is_active);
    }

    #[test]
    fn room_name_round_trips_through_str() {
        for name in RoomName::catalog() {
            assert_eq!(name.as_str().parse::<RoomName>(), Ok(name));
        }
    }

    #[test]
    fn booking_status_wire_values_are_lowercase() {
        let json = serde_json::to_string(&BookingStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }

    #[test]
    fn account_serialization_skips_password_hash() {
        let account = Account::new("a@b.co".into(), "secret-hash".into());
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
