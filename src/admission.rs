// ABOUTME: Booking admission engine combining local conflict detection with remote tier policy
// ABOUTME: Runs cheap local checks first, then the membership gate, then the guarded insert
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Booking Admission
//!
//! Admission evaluates its checks in a fixed order and stops at the first
//! failure, so error precedence is deterministic and the free, local checks
//! (time bounds, room existence, scheduling conflict) run before any remote
//! round-trip to the membership service.
//!
//! The conflict query runs twice: once before the membership call as a cheap
//! early reject, and again inside the store's write lock together with the
//! insert, which is what actually enforces the no-double-booking invariant
//! under concurrent requests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clients::{MembershipClient, MembershipLookupError};
use crate::config::TierPolicy;
use crate::database::{BookingStore, BookingWrite};
use crate::errors::AdmissionError;
use crate::models::{Booking, BookingStatus};

/// A request to reserve a room slot
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    /// Requesting user
    pub user_id: Uuid,
    /// Requested room
    pub room_id: Uuid,
    /// Slot start (inclusive)
    pub start_time: DateTime<Utc>,
    /// Slot end (exclusive)
    pub end_time: DateTime<Utc>,
}

/// Decides whether a reservation may be created, then creates it
pub struct AdmissionEngine {
    store: Arc<dyn BookingStore>,
    memberships: Arc<dyn MembershipClient>,
    policy: TierPolicy,
    max_duration: Duration,
}

impl AdmissionEngine {
    /// Wire the engine to its store, membership client and policy
    #[must_use]
    pub fn new(
        store: Arc<dyn BookingStore>,
        memberships: Arc<dyn MembershipClient>,
        policy: TierPolicy,
        max_duration_secs: i64,
    ) -> Self {
        Self {
            store,
            memberships,
            policy,
            max_duration: Duration::seconds(max_duration_secs),
        }
    }

    /// Admit a booking request, returning the created booking
    ///
    /// # Errors
    ///
    /// Returns the first failing check as one classified [`AdmissionError`];
    /// later checks are not evaluated.
    pub async fn admit(&self, request: AdmissionRequest) -> Result<Booking, AdmissionError> {
        let AdmissionRequest {
            user_id,
            room_id,
            start_time,
            end_time,
        } = request;

        if end_time <= start_time {
            return Err(AdmissionError::InvalidInterval);
        }

        if start_time < Utc::now() {
            return Err(AdmissionError::StartInPast);
        }

        // Boundary inclusive: a slot of exactly the cap is allowed.
        if end_time - start_time > self.max_duration {
            return Err(AdmissionError::DurationExceeded {
                max_minutes: self.max_duration.num_minutes(),
            });
        }

        let room = self
            .store
            .get_active_room(room_id)
            .await
            .map_err(|e| AdmissionError::PersistenceFailed(e.to_string()))?
            .ok_or(AdmissionError::RoomNotFound(room_id))?;

        // Early reject before spending the membership round-trip. The
        // authoritative check runs again inside the insert's write lock.
        let conflict = self
            .store
            .find_conflicting_booking(room_id, start_time, end_time)
            .await
            .map_err(|e| AdmissionError::PersistenceFailed(e.to_string()))?;
        if conflict.is_some() {
            return Err(AdmissionError::RoomAlreadyBooked(room.name));
        }

        let membership = match self.memberships.active_membership(user_id).await {
            Ok(Some(membership)) => membership,
            Ok(None) | Err(MembershipLookupError::NotAuthenticated) => {
                return Err(AdmissionError::NoActiveMembership)
            }
            Err(MembershipLookupError::Unavailable(reason)) => {
                warn!("Membership verification failed for user {user_id}: {reason}");
                return Err(AdmissionError::MembershipVerificationFailed(reason));
            }
        };

        if self.policy.is_blocked(membership.tier, room.name) {
            return Err(AdmissionError::RoomBlockedForTier {
                tier: membership.tier,
                room: room.name,
            });
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id,
            room_id,
            membership_id: membership.id,
            start_time,
            end_time,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        match self.store.create_booking_if_free(&booking).await {
            Ok(BookingWrite::Created) => {
                info!(
                    "Booking {} admitted for room {} ({} - {})",
                    booking.id, room.name, start_time, end_time
                );
                Ok(booking)
            }
            Ok(BookingWrite::Conflict) => Err(AdmissionError::RoomAlreadyBooked(room.name)),
            Err(e) => Err(AdmissionError::PersistenceFailed(e.to_string())),
        }
    }
}
