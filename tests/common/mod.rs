// ABOUTME: Shared test fixtures and trait-backed doubles for integration tests
// ABOUTME: Provides an in-memory database plus stub capabilities and remote clients
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use atrium_club_server::auth::{PasswordHasher, TokenIssuer};
use atrium_club_server::clients::{
    MembershipClient, MembershipLookupError, NewProfile, ProfileClient,
};
use atrium_club_server::database::{AccountStore, Database};
use atrium_club_server::models::{Account, AccountCredentials, AccountRole, Membership, MembershipTier};
use atrium_club_server::registration::RegistrationService;

/// Fresh in-memory database with migrations applied
pub async fn test_database() -> Database {
    Database::new("sqlite::memory:")
        .await
        .expect("in-memory database")
}

/// Deterministic hasher that counts comparisons
///
/// `hash` is reversible on purpose so tests can sign in with known passwords
/// without paying for bcrypt rounds.
#[derive(Default)]
pub struct CountingHasher {
    pub verify_calls: AtomicUsize,
}

impl CountingHasher {
    pub fn verify_count(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

impl PasswordHasher for CountingHasher {
    fn hash(&self, plain: &str) -> Result<String> {
        Ok(format!("hashed:{plain}"))
    }

    fn verify(&self, plain: &str, password_hash: &str) -> Result<bool> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(password_hash == format!("hashed:{plain}"))
    }
}

/// Profile client double, configurable to fail and counting calls
#[derive(Default)]
pub struct StubProfileClient {
    pub should_fail: bool,
    pub calls: AtomicUsize,
}

impl StubProfileClient {
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileClient for StubProfileClient {
    async fn provision(&self, _profile: &NewProfile) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            bail!("client service responded with status 500 Internal Server Error");
        }
        Ok(())
    }
}

/// Token issuer double
#[derive(Default)]
pub struct StubTokenIssuer {
    pub should_fail: bool,
}

impl StubTokenIssuer {
    pub fn failing() -> Self {
        Self { should_fail: true }
    }
}

impl TokenIssuer for StubTokenIssuer {
    fn issue(&self, account_id: Uuid, _email: &str, _role: AccountRole) -> Result<String> {
        if self.should_fail {
            bail!("token signing key unavailable");
        }
        Ok(format!("token-for-{account_id}"))
    }
}

/// What a membership lookup should report
pub enum MembershipLookup {
    Found(Membership),
    NotFound,
    NotAuthenticated,
    Unavailable(String),
}

/// Membership client double returning a fixed lookup result
pub struct StubMembershipClient {
    pub lookup: MembershipLookup,
}

impl StubMembershipClient {
    pub fn with_membership(membership: Membership) -> Self {
        Self {
            lookup: MembershipLookup::Found(membership),
        }
    }
}

#[async_trait]
impl MembershipClient for StubMembershipClient {
    async fn active_membership(
        &self,
        _user_id: Uuid,
    ) -> Result<Option<Membership>, MembershipLookupError> {
        match &self.lookup {
            MembershipLookup::Found(membership) => Ok(Some(membership.clone())),
            MembershipLookup::NotFound => Ok(None),
            MembershipLookup::NotAuthenticated => Err(MembershipLookupError::NotAuthenticated),
            MembershipLookup::Unavailable(reason) => {
                Err(MembershipLookupError::Unavailable(reason.clone()))
            }
        }
    }
}

/// A currently valid membership of the given tier
pub fn active_membership(tier: MembershipTier) -> Membership {
    Membership {
        id: Uuid::new_v4(),
        client_id: Uuid::new_v4(),
        tier,
        is_active: true,
        start_date: Utc::now() - Duration::days(1),
        end_date: Utc::now() + Duration::days(29),
    }
}

/// Account store wrapper whose delete always fails
pub struct FailingDeleteStore(pub Database);

#[async_trait]
impl AccountStore for FailingDeleteStore {
    async fn create_account(&self, account: &Account) -> Result<()> {
        self.0.insert_account(account).await
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.0.account_by_email(email).await
    }

    async fn get_credentials_by_email(&self, email: &str) -> Result<Option<AccountCredentials>> {
        self.0.credentials_by_email(email).await
    }

    async fn mark_account_active(&self, id: Uuid) -> Result<()> {
        self.0.set_account_active(id).await
    }

    async fn delete_account(&self, _id: Uuid) -> Result<()> {
        bail!("simulated delete failure")
    }

    async fn sweep_stale_registrations(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.0.delete_stale_registrations(cutoff).await
    }
}

/// Account store wrapper whose credentials lookup always fails
pub struct FailingLookupStore(pub Database);

#[async_trait]
impl AccountStore for FailingLookupStore {
    async fn create_account(&self, account: &Account) -> Result<()> {
        self.0.insert_account(account).await
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.0.account_by_email(email).await
    }

    async fn get_credentials_by_email(&self, _email: &str) -> Result<Option<AccountCredentials>> {
        bail!("simulated store outage")
    }

    async fn mark_account_active(&self, id: Uuid) -> Result<()> {
        self.0.set_account_active(id).await
    }

    async fn delete_account(&self, id: Uuid) -> Result<()> {
        self.0.remove_account(id).await
    }

    async fn sweep_stale_registrations(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.0.delete_stale_registrations(cutoff).await
    }
}

/// Registration service over the given store with healthy stub collaborators
pub fn healthy_registration_service(
    store: Arc<dyn AccountStore>,
    hasher: Arc<CountingHasher>,
) -> RegistrationService {
    RegistrationService::new(
        store,
        Arc::new(StubProfileClient::default()),
        hasher,
        Arc::new(StubTokenIssuer::default()),
    )
}
