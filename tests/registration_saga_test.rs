// ABOUTME: Integration tests for the registration pipeline and its compensation behavior
// ABOUTME: Exercises uniqueness, rollback on remote failures and the stale-registration sweep
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use atrium_club_server::database::Database;
use atrium_club_server::errors::RegistrationError;
use atrium_club_server::models::{Account, AccountState};
use atrium_club_server::registration::{RegisterInput, RegistrationService};
use common::{
    healthy_registration_service, test_database, CountingHasher, FailingDeleteStore,
    StubProfileClient, StubTokenIssuer,
};

fn input(email: &str) -> RegisterInput {
    RegisterInput {
        email: email.to_owned(),
        password: "swordfish".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        phone: Some("555-0100".into()),
    }
}

async fn account_count(database: &Database, email: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE email = $1")
        .bind(email)
        .fetch_one(database.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn register_creates_active_account_and_returns_token() {
    let database = test_database().await;
    let service = healthy_registration_service(
        Arc::new(database.clone()),
        Arc::new(CountingHasher::default()),
    );

    let outcome = service.register(input("ada@atrium.club")).await.unwrap();

    assert!(!outcome.access_token.is_empty());
    assert_eq!(outcome.account.email, "ada@atrium.club");

    let stored = database
        .account_by_email("ada@atrium.club")
        .await
        .unwrap()
        .expect("account persisted");
    assert_eq!(stored.state, AccountState::Active);
    assert_eq!(stored.id, outcome.account.id);
}

#[tokio::test]
async fn second_registration_with_same_email_is_rejected() {
    let database = test_database().await;
    let service = healthy_registration_service(
        Arc::new(database.clone()),
        Arc::new(CountingHasher::default()),
    );

    service.register(input("ada@atrium.club")).await.unwrap();
    let error = service.register(input("ada@atrium.club")).await.unwrap_err();

    assert!(matches!(error, RegistrationError::DuplicateAccount));
    assert_eq!(account_count(&database, "ada@atrium.club").await, 1);
}

#[tokio::test]
async fn profile_provisioning_failure_removes_the_account() {
    let database = test_database().await;
    let service = RegistrationService::new(
        Arc::new(database.clone()),
        Arc::new(StubProfileClient::failing()),
        Arc::new(CountingHasher::default()),
        Arc::new(StubTokenIssuer::default()),
    );

    let error = service.register(input("ada@atrium.club")).await.unwrap_err();

    assert!(matches!(
        error,
        RegistrationError::ProfileProvisioningFailed(_)
    ));
    assert!(database
        .account_by_email("ada@atrium.club")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn token_issuance_failure_removes_the_account() {
    let database = test_database().await;
    let profiles = Arc::new(StubProfileClient::default());
    let service = RegistrationService::new(
        Arc::new(database.clone()),
        profiles.clone(),
        Arc::new(CountingHasher::default()),
        Arc::new(StubTokenIssuer::failing()),
    );

    let error = service.register(input("ada@atrium.club")).await.unwrap_err();

    assert!(matches!(error, RegistrationError::TokenIssuanceFailed(_)));
    // The profile call did happen; the failure came after it.
    assert_eq!(profiles.call_count(), 1);
    assert!(database
        .account_by_email("ada@atrium.club")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn failed_compensation_supersedes_the_original_error() {
    let database = test_database().await;
    let service = RegistrationService::new(
        Arc::new(FailingDeleteStore(database.clone())),
        Arc::new(StubProfileClient::failing()),
        Arc::new(CountingHasher::default()),
        Arc::new(StubTokenIssuer::default()),
    );

    let error = service.register(input("ada@atrium.club")).await.unwrap_err();

    match error {
        RegistrationError::CompensationFailed { original, .. } => {
            assert!(original.contains("client profile"));
        }
        other => panic!("expected CompensationFailed, got {other:?}"),
    }

    // The orphan really is left behind, which is the whole point of the
    // louder error kind.
    assert_eq!(account_count(&database, "ada@atrium.club").await, 1);
}

#[tokio::test]
async fn sweep_removes_only_stale_provisioning_accounts() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("atrium.db").display());

    {
        let database = Database::new(&url).await.unwrap();

        let mut stuck = Account::new("stuck@atrium.club".into(), "hash".into());
        stuck.created_at = chrono::Utc::now() - chrono::Duration::hours(1);
        stuck.updated_at = stuck.created_at;
        database.insert_account(&stuck).await.unwrap();

        let mut old_but_done = Account::new("done@atrium.club".into(), "hash".into());
        old_but_done.created_at = chrono::Utc::now() - chrono::Duration::hours(1);
        old_but_done.updated_at = old_but_done.created_at;
        database.insert_account(&old_but_done).await.unwrap();
        database.set_account_active(old_but_done.id).await.unwrap();

        let fresh = Account::new("fresh@atrium.club".into(), "hash".into());
        database.insert_account(&fresh).await.unwrap();

        database.pool().close().await;
    }

    // Reopen as a restarted process would.
    let database = Database::new(&url).await.unwrap();
    let service = healthy_registration_service(
        Arc::new(database.clone()),
        Arc::new(CountingHasher::default()),
    );

    let swept = service
        .sweep_stale_registrations(chrono::Duration::minutes(15))
        .await
        .unwrap();

    assert_eq!(swept, 1);
    assert!(database
        .account_by_email("stuck@atrium.club")
        .await
        .unwrap()
        .is_none());
    assert!(database
        .account_by_email("done@atrium.club")
        .await
        .unwrap()
        .is_some());
    assert!(database
        .account_by_email("fresh@atrium.club")
        .await
        .unwrap()
        .is_some());
}
