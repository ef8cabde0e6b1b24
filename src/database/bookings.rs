// ABOUTME: Booking persistence with the conflict-check-and-insert atomic unit
// ABOUTME: Holds the sqlite write lock across the overlap query and the insert
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};
use uuid::Uuid;

use super::{BookingStore, Database};
use crate::models::{Booking, BookingStatus, Room};

/// Outcome of the guarded booking insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingWrite {
    /// The slot was free and the row was written
    Created,
    /// A pending/confirmed booking already overlaps the slot
    Conflict,
}

fn booking_from_row(row: &SqliteRow) -> Result<Booking> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let room_id: String = row.try_get("room_id")?;
    let membership_id: String = row.try_get("membership_id")?;
    let status: String = row.try_get("status")?;

    Ok(Booking {
        id: Uuid::parse_str(&id)?,
        user_id: Uuid::parse_str(&user_id)?,
        room_id: Uuid::parse_str(&room_id)?,
        membership_id: Uuid::parse_str(&membership_id)?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        status: status.parse::<BookingStatus>().map_err(|e| anyhow!(e))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl Database {
    /// Create the bookings table
    pub(super) async fn migrate_bookings(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS bookings (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                room_id TEXT NOT NULL REFERENCES rooms(id),
                membership_id TEXT NOT NULL,
                start_time DATETIME NOT NULL,
                end_time DATETIME NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'confirmed', 'cancelled')),
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bookings_room_time ON bookings(room_id, start_time)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Find any pending/confirmed booking overlapping `[start, end)` on the room
    ///
    /// Half-open overlap: a booking ending exactly when another starts does
    /// not conflict.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn conflicting_booking(
        &self,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Uuid>> {
        let row = sqlx::query(
            r"
            SELECT id FROM bookings
            WHERE room_id = $1
              AND status IN ('pending', 'confirmed')
              AND start_time < $2
              AND end_time > $3
            LIMIT 1
            ",
        )
        .bind(room_id.to_string())
        .bind(end)
        .bind(start)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let id: String = row.try_get("id")?;
            Ok(Uuid::parse_str(&id)?)
        })
        .transpose()
    }

    /// Insert the booking unless a conflicting one exists
    ///
    /// The overlap re-check and the insert run on one connection inside
    /// `BEGIN IMMEDIATE`, so the sqlite write lock is held across both and a
    /// concurrent admission for the same room serializes behind it.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction or the insert fails.
    pub async fn insert_booking_if_free(&self, booking: &Booking) -> Result<BookingWrite> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        match Self::guarded_insert(&mut conn, booking).await {
            Ok(write) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(write)
            }
            Err(e) => {
                // Best effort: the connection is dropped either way
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(e)
            }
        }
    }

    async fn guarded_insert(
        conn: &mut PoolConnection<Sqlite>,
        booking: &Booking,
    ) -> Result<BookingWrite> {
        let conflict = sqlx::query(
            r"
            SELECT id FROM bookings
            WHERE room_id = $1
              AND status IN ('pending', 'confirmed')
              AND start_time < $2
              AND end_time > $3
            LIMIT 1
            ",
        )
        .bind(booking.room_id.to_string())
        .bind(booking.end_time)
        .bind(booking.start_time)
        .fetch_optional(&mut **conn)
        .await?;

        if conflict.is_some() {
            return Ok(BookingWrite::Conflict);
        }

        sqlx::query(
            r"
            INSERT INTO bookings (
                id, user_id, room_id, membership_id,
                start_time, end_time, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(booking.id.to_string())
        .bind(booking.user_id.to_string())
        .bind(booking.room_id.to_string())
        .bind(booking.membership_id.to_string())
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut **conn)
        .await?;

        Ok(BookingWrite::Created)
    }

    /// Fetch a booking by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be decoded.
    pub async fn booking_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let row = sqlx::query("SELECT * FROM bookings WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(booking_from_row).transpose()
    }
}

#[async_trait]
impl BookingStore for Database {
    async fn get_active_room(&self, id: Uuid) -> Result<Option<Room>> {
        self.active_room(id).await
    }

    async fn find_conflicting_booking(
        &self,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Uuid>> {
        self.conflicting_booking(room_id, start, end).await
    }

    async fn create_booking_if_free(&self, booking: &Booking) -> Result<BookingWrite> {
        self.insert_booking_if_free(booking).await
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        self.booking_by_id(id).await
    }
}
