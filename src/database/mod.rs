// ABOUTME: Database management for account, room and booking storage
// ABOUTME: Owns the sqlite pool, migrations and the store traits consumed by orchestrators
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Database Management
//!
//! Sqlite-backed persistence for the record-keeping services. The write-path
//! orchestrators depend on the [`AccountStore`] and [`BookingStore`] traits
//! rather than on [`Database`] directly, so tests can wrap or replace the
//! store behind the same seam.

mod accounts;
mod bookings;
mod rooms;

pub use bookings::BookingWrite;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{Account, AccountCredentials, Booking, Room};

/// Persistence operations needed by the registration saga and sign-in verifier
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account row
    async fn create_account(&self, account: &Account) -> Result<()>;

    /// Fetch a full account by email
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Fetch the narrow credentials projection by email
    async fn get_credentials_by_email(&self, email: &str) -> Result<Option<AccountCredentials>>;

    /// Flip an account from `provisioning` to `active`
    async fn mark_account_active(&self, id: Uuid) -> Result<()>;

    /// Delete an account row by id (compensation path)
    async fn delete_account(&self, id: Uuid) -> Result<()>;

    /// Delete `provisioning` accounts created before `cutoff`, returning the count
    async fn sweep_stale_registrations(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// Persistence operations needed by the booking admission engine
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Fetch a room by id, only if it is active
    async fn get_active_room(&self, id: Uuid) -> Result<Option<Room>>;

    /// Find any pending/confirmed booking overlapping `[start, end)` on the room
    async fn find_conflicting_booking(
        &self,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Uuid>>;

    /// Insert the booking unless a conflicting one exists, as one atomic unit
    async fn create_booking_if_free(&self, booking: &Booking) -> Result<BookingWrite>;

    /// Fetch a booking by id
    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>>;
}

/// Database manager for account, room and booking storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a
    /// migration fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure sqlite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails.
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_accounts().await?;
        self.migrate_rooms().await?;
        self.migrate_bookings().await?;
        Ok(())
    }
}
