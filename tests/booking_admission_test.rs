// ABOUTME: Integration tests for the booking admission engine
// ABOUTME: Covers check ordering, half-open overlap, duration cap, tier policy and persistence
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use atrium_club_server::admission::{AdmissionEngine, AdmissionRequest};
use atrium_club_server::config::TierPolicy;
use atrium_club_server::constants::limits;
use atrium_club_server::database::Database;
use atrium_club_server::errors::AdmissionError;
use atrium_club_server::models::{BookingStatus, MembershipTier, RoomName};
use common::{
    active_membership, test_database, MembershipLookup, StubMembershipClient,
};

fn engine(database: &Database, lookup: MembershipLookup) -> AdmissionEngine {
    AdmissionEngine::new(
        Arc::new(database.clone()),
        Arc::new(StubMembershipClient { lookup }),
        TierPolicy::default(),
        limits::MAX_BOOKING_DURATION_SECS,
    )
}

fn request(room_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> AdmissionRequest {
    AdmissionRequest {
        user_id: Uuid::new_v4(),
        room_id,
        start_time: start,
        end_time: end,
    }
}

/// A slot starting tomorrow, comfortably in the future
fn tomorrow() -> DateTime<Utc> {
    Utc::now() + Duration::days(1)
}

#[tokio::test]
async fn inverted_or_empty_interval_is_rejected() {
    let database = test_database().await;
    let engine = engine(&database, MembershipLookup::NotFound);
    let start = tomorrow();

    let error = engine.admit(request(Uuid::new_v4(), start, start)).await.unwrap_err();
    assert!(matches!(error, AdmissionError::InvalidInterval));

    let error = engine
        .admit(request(Uuid::new_v4(), start, start - Duration::minutes(30)))
        .await
        .unwrap_err();
    assert!(matches!(error, AdmissionError::InvalidInterval));
}

#[tokio::test]
async fn past_start_is_rejected_before_the_room_is_looked_up() {
    let database = test_database().await;
    let engine = engine(&database, MembershipLookup::NotFound);

    // Nonexistent room AND a start in the past: the time check wins.
    let start = Utc::now() - Duration::hours(2);
    let error = engine
        .admit(request(Uuid::new_v4(), start, start + Duration::hours(1)))
        .await
        .unwrap_err();

    assert!(matches!(error, AdmissionError::StartInPast));
}

#[tokio::test]
async fn duration_cap_is_boundary_inclusive() {
    let database = test_database().await;
    let room = database
        .create_room(RoomName::TrainingRoom1, true)
        .await
        .unwrap();
    let membership = active_membership(MembershipTier::Diamond);
    let engine = engine(&database, MembershipLookup::Found(membership));
    let start = tomorrow();

    // One millisecond over the cap is rejected.
    let error = engine
        .admit(request(
            room.id,
            start,
            start + Duration::seconds(limits::MAX_BOOKING_DURATION_SECS) + Duration::milliseconds(1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(error, AdmissionError::DurationExceeded { .. }));

    // Exactly the cap is allowed.
    engine
        .admit(request(
            room.id,
            start,
            start + Duration::seconds(limits::MAX_BOOKING_DURATION_SECS),
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_or_inactive_room_is_not_found() {
    let database = test_database().await;
    let closed = database
        .create_room(RoomName::DefaultSauna, false)
        .await
        .unwrap();
    let engine = engine(
        &database,
        MembershipLookup::Found(active_membership(MembershipTier::Diamond)),
    );
    let start = tomorrow();

    let error = engine
        .admit(request(Uuid::new_v4(), start, start + Duration::hours(1)))
        .await
        .unwrap_err();
    assert!(matches!(error, AdmissionError::RoomNotFound(_)));

    let error = engine
        .admit(request(closed.id, start, start + Duration::hours(1)))
        .await
        .unwrap_err();
    assert!(matches!(error, AdmissionError::RoomNotFound(_)));
}

#[tokio::test]
async fn back_to_back_bookings_do_not_conflict_but_overlap_does() {
    let database = test_database().await;
    let room = database
        .create_room(RoomName::TrainingRoom2, true)
        .await
        .unwrap();
    let engine = engine(
        &database,
        MembershipLookup::Found(active_membership(MembershipTier::Diamond)),
    );
    let ten = tomorrow();
    let eleven = ten + Duration::hours(1);
    let twelve = ten + Duration::hours(2);

    engine.admit(request(room.id, ten, eleven)).await.unwrap();

    // Starts exactly when the first one ends: half-open intervals, no conflict.
    engine.admit(request(room.id, eleven, twelve)).await.unwrap();

    let error = engine
        .admit(request(
            room.id,
            ten + Duration::minutes(30),
            eleven + Duration::minutes(30),
        ))
        .await
        .unwrap_err();
    assert!(matches!(error, AdmissionError::RoomAlreadyBooked(_)));
}

#[tokio::test]
async fn cancelled_bookings_release_their_slot() {
    let database = test_database().await;
    let room = database
        .create_room(RoomName::TrainingRoom3, true)
        .await
        .unwrap();
    let engine = engine(
        &database,
        MembershipLookup::Found(active_membership(MembershipTier::Diamond)),
    );
    let start = tomorrow();
    let end = start + Duration::hours(1);

    let first = engine.admit(request(room.id, start, end)).await.unwrap();

    sqlx::query("UPDATE bookings SET status = 'cancelled' WHERE id = $1")
        .bind(first.id.to_string())
        .execute(database.pool())
        .await
        .unwrap();

    engine.admit(request(room.id, start, end)).await.unwrap();
}

#[tokio::test]
async fn standard_tier_is_blocked_from_recovery_rooms() {
    let database = test_database().await;
    let room = database.create_room(RoomName::IceRoom, true).await.unwrap();
    let engine = engine(
        &database,
        MembershipLookup::Found(active_membership(MembershipTier::Standard)),
    );
    let start = tomorrow();

    // Room exists, is active and has no conflict; only the tier stands in the way.
    let error = engine
        .admit(request(room.id, start, start + Duration::hours(1)))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        AdmissionError::RoomBlockedForTier {
            tier: MembershipTier::Standard,
            room: RoomName::IceRoom,
        }
    ));
}

#[tokio::test]
async fn diamond_tier_may_book_any_room() {
    let database = test_database().await;
    let room = database.create_room(RoomName::IceRoom, true).await.unwrap();
    let engine = engine(
        &database,
        MembershipLookup::Found(active_membership(MembershipTier::Diamond)),
    );
    let start = tomorrow();

    engine
        .admit(request(room.id, start, start + Duration::hours(1)))
        .await
        .unwrap();
}

#[tokio::test]
async fn absent_membership_and_auth_signal_both_mean_no_active_membership() {
    let database = test_database().await;
    let room = database
        .create_room(RoomName::TrainingRoom1, true)
        .await
        .unwrap();
    let start = tomorrow();

    let error = engine(&database, MembershipLookup::NotFound)
        .admit(request(room.id, start, start + Duration::hours(1)))
        .await
        .unwrap_err();
    assert!(matches!(error, AdmissionError::NoActiveMembership));

    let error = engine(&database, MembershipLookup::NotAuthenticated)
        .admit(request(room.id, start, start + Duration::hours(1)))
        .await
        .unwrap_err();
    assert!(matches!(error, AdmissionError::NoActiveMembership));
}

#[tokio::test]
async fn membership_outage_is_classified_as_retryable_verification_failure() {
    let database = test_database().await;
    let room = database
        .create_room(RoomName::TrainingRoom1, true)
        .await
        .unwrap();
    let start = tomorrow();

    let error = engine(
        &database,
        MembershipLookup::Unavailable("connection refused".into()),
    )
    .admit(request(room.id, start, start + Duration::hours(1)))
    .await
    .unwrap_err();

    assert!(matches!(
        error,
        AdmissionError::MembershipVerificationFailed(_)
    ));
}

#[tokio::test]
async fn scheduling_conflict_is_reported_before_the_membership_service_is_consulted() {
    let database = test_database().await;
    let room = database
        .create_room(RoomName::TrainingRoom2, true)
        .await
        .unwrap();
    let start = tomorrow();
    let end = start + Duration::hours(1);

    engine(
        &database,
        MembershipLookup::Found(active_membership(MembershipTier::Diamond)),
    )
    .admit(request(room.id, start, end))
    .await
    .unwrap();

    // The membership service is down, but the conflict check runs first.
    let error = engine(&database, MembershipLookup::Unavailable("down".into()))
        .admit(request(room.id, start, end))
        .await
        .unwrap_err();

    assert!(matches!(error, AdmissionError::RoomAlreadyBooked(_)));
}

#[tokio::test]
async fn admitted_booking_is_persisted_pending_with_the_verified_membership() {
    let database = test_database().await;
    let room = database
        .create_room(RoomName::TrainingRoom3, true)
        .await
        .unwrap();
    let membership = active_membership(MembershipTier::Platinum);
    let membership_id = membership.id;
    let engine = engine(&database, MembershipLookup::Found(membership));
    let start = tomorrow();
    let end = start + Duration::hours(1);
    let req = request(room.id, start, end);

    let booking = engine.admit(req).await.unwrap();

    let stored = database
        .booking_by_id(booking.id)
        .await
        .unwrap()
        .expect("booking persisted");
    assert_eq!(stored.status, BookingStatus::Pending);
    assert_eq!(stored.membership_id, membership_id);
    assert_eq!(stored.user_id, req.user_id);
    assert_eq!(stored.room_id, room.id);
    assert_eq!(stored.start_time, booking.start_time);
    assert_eq!(stored.end_time, booking.end_time);
}
