// ABOUTME: Room reference-data persistence and startup seeding
// ABOUTME: Rooms are a fixed catalog; the seeder fills an empty table once
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use anyhow::{anyhow, Result};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use super::Database;
use crate::models::{Room, RoomName};

fn room_from_row(row: &SqliteRow) -> Result<Room> {
    let id: String = row.try_get("id")?;
    let name: String = row.try_get("name")?;

    Ok(Room {
        id: Uuid::parse_str(&id)?,
        name: name.parse::<RoomName>().map_err(|e| anyhow!(e))?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl Database {
    /// Create the rooms table
    pub(super) async fn migrate_rooms(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS rooms (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a room row
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_room(&self, name: RoomName, is_active: bool) -> Result<Room> {
        let now = Utc::now();
        let room = Room {
            id: Uuid::new_v4(),
            name,
            is_active,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO rooms (id, name, is_active, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(room.id.to_string())
        .bind(room.name.as_str())
        .bind(room.is_active)
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(room)
    }

    /// Fetch a room by id, only if it is active
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be decoded.
    pub async fn active_room(&self, id: Uuid) -> Result<Option<Room>> {
        let row = sqlx::query("SELECT * FROM rooms WHERE id = $1 AND is_active = 1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(room_from_row).transpose()
    }

    /// Seed the fixed room catalog if the table is empty
    ///
    /// The rooms exist only so bookings have something to reference; seeding
    /// them automatically keeps fresh deployments usable without an admin
    /// step.
    ///
    /// # Errors
    ///
    /// Returns an error if the count query or an insert fails.
    pub async fn seed_rooms(&self) -> Result<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await?;

        if count > 0 {
            info!("Found {count} rooms, skipping seeding");
            return Ok(());
        }

        for name in RoomName::catalog() {
            self.create_room(name, true).await?;
        }
        info!("Seeded {} rooms", RoomName::catalog().len());

        Ok(())
    }
}
