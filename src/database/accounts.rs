// ABOUTME: Account persistence operations for registration and sign-in
// ABOUTME: Handles account rows, the credentials projection and the provisioning sweep
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{AccountStore, Database};
use crate::models::{Account, AccountCredentials, AccountRole, AccountState};

fn account_from_row(row: &SqliteRow) -> Result<Account> {
    let id: String = row.try_get("id")?;
    let role: String = row.try_get("role")?;
    let state: String = row.try_get("state")?;

    Ok(Account {
        id: Uuid::parse_str(&id)?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse::<AccountRole>().map_err(|e| anyhow!(e))?,
        state: state.parse::<AccountState>().map_err(|e| anyhow!(e))?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl Database {
    /// Create the accounts table
    pub(super) async fn migrate_accounts(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'client' CHECK (role IN ('client', 'manager', 'admin')),
                state TEXT NOT NULL DEFAULT 'provisioning' CHECK (state IN ('provisioning', 'active')),
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_accounts_email ON accounts(email)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_accounts_state ON accounts(state)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a new account row
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already taken or the insert fails.
    pub async fn insert_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO accounts (id, email, password_hash, role, state, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(account.id.to_string())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.state.as_str())
        .bind(account.is_active)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a full account by email
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    /// Fetch only the columns the sign-in verifier needs
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn credentials_by_email(&self, email: &str) -> Result<Option<AccountCredentials>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, is_active FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let id: String = row.try_get("id")?;
            let role: String = row.try_get("role")?;
            Ok(AccountCredentials {
                id: Uuid::parse_str(&id)?,
                email: row.try_get("email")?,
                password_hash: row.try_get("password_hash")?,
                role: role.parse::<AccountRole>().map_err(|e| anyhow!(e))?,
                is_active: row.try_get("is_active")?,
            })
        })
        .transpose()
    }

    /// Flip an account from `provisioning` to `active`
    ///
    /// # Errors
    ///
    /// Returns an error if no row with the given id exists.
    pub async fn set_account_active(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE accounts SET state = 'active', updated_at = $2 WHERE id = $1",
        )
        .bind(id.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("account {id} not found"));
        }
        Ok(())
    }

    /// Delete an account row by id
    ///
    /// Idempotent: deleting an id that no longer exists is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete statement fails.
    pub async fn remove_account(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete `provisioning` accounts created before `cutoff`
    ///
    /// # Errors
    ///
    /// Returns an error if the delete statement fails.
    pub async fn delete_stale_registrations(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM accounts WHERE state = 'provisioning' AND created_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl AccountStore for Database {
    async fn create_account(&self, account: &Account) -> Result<()> {
        self.insert_account(account).await
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.account_by_email(email).await
    }

    async fn get_credentials_by_email(&self, email: &str) -> Result<Option<AccountCredentials>> {
        self.credentials_by_email(email).await
    }

    async fn mark_account_active(&self, id: Uuid) -> Result<()> {
        self.set_account_active(id).await
    }

    async fn delete_account(&self, id: Uuid) -> Result<()> {
        self.remove_account(id).await
    }

    async fn sweep_stale_registrations(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.delete_stale_registrations(cutoff).await
    }
}
