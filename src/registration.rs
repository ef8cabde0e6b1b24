// ABOUTME: Registration saga orchestrator and sign-in verifier
// ABOUTME: Creates local accounts, provisions remote profiles, issues tokens, compensates on failure
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Registration and Sign-in
//!
//! Registration is a linear pipeline over a local account store and two
//! capabilities: once the account row exists, any later failure deletes it
//! again so no half-registered account survives. The pipeline stages are:
//!
//! 1. uniqueness check by email (terminal, nothing to undo)
//! 2. hash password, persist the account in the `provisioning` state
//! 3. provision the remote client profile
//! 4. issue the access token
//! 5. flip the account to `active` and return
//!
//! A failed compensation is reported as its own failure kind instead of the
//! original error, because it leaves an orphaned row an operator has to
//! clean up. Accounts stuck in `provisioning` (a crash between steps 2 and
//! the compensation) are removed by [`RegistrationService::sweep_stale_registrations`].
//!
//! Sign-in is stateless: fetch the credentials projection, reject inactive
//! accounts before touching the password, compare, issue a token.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::clients::{NewProfile, ProfileClient};
use crate::database::AccountStore;
use crate::errors::{RegistrationError, SignInError};
use crate::models::{Account, AccountSummary};

/// Input to the registration pipeline, already shape-validated
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    /// Unique account email
    pub email: String,
    /// Plaintext password, hashed in step 2
    pub password: String,
    /// Given name, forwarded to the profile service
    pub first_name: String,
    /// Family name, forwarded to the profile service
    pub last_name: String,
    /// Optional phone number, forwarded to the profile service
    pub phone: Option<String>,
}

/// Successful registration result
#[derive(Debug, Serialize)]
pub struct RegisterOutcome {
    /// Freshly issued access token
    pub access_token: String,
    /// Public summary of the created account
    pub account: AccountSummary,
}

/// Successful sign-in result
#[derive(Debug, Serialize)]
pub struct SignInOutcome {
    /// Freshly issued access token
    pub access_token: String,
}

/// Orchestrator for account registration and sign-in
pub struct RegistrationService {
    accounts: Arc<dyn AccountStore>,
    profiles: Arc<dyn ProfileClient>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl RegistrationService {
    /// Wire the orchestrator to its store and capabilities
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        profiles: Arc<dyn ProfileClient>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            accounts,
            profiles,
            hasher,
            tokens,
        }
    }

    /// Run the registration pipeline end-to-end
    ///
    /// # Errors
    ///
    /// Returns one classified [`RegistrationError`]; if the account row was
    /// already written, every failure path deletes it again first.
    pub async fn register(
        &self,
        input: RegisterInput,
    ) -> Result<RegisterOutcome, RegistrationError> {
        info!("Registration attempt for email: {}", input.email);

        match self.accounts.get_account_by_email(&input.email).await {
            Ok(Some(_)) => return Err(RegistrationError::DuplicateAccount),
            Ok(None) => {}
            Err(e) => return Err(RegistrationError::UnexpectedFailure(e.to_string())),
        }

        let password_hash = self
            .hasher
            .hash(&input.password)
            .map_err(|e| RegistrationError::UnexpectedFailure(e.to_string()))?;

        let account = Account::new(input.email.clone(), password_hash);
        self.accounts
            .create_account(&account)
            .await
            .map_err(|e| RegistrationError::UnexpectedFailure(e.to_string()))?;

        // The local row exists from here on; any failure must undo it.
        match self.provision_and_finalize(&account, &input).await {
            Ok(access_token) => {
                info!(
                    "Account registered successfully: {} ({})",
                    account.email, account.id
                );
                Ok(RegisterOutcome {
                    access_token,
                    account: account.summary(),
                })
            }
            Err(original) => Err(self.compensate(account.id, original).await),
        }
    }

    async fn provision_and_finalize(
        &self,
        account: &Account,
        input: &RegisterInput,
    ) -> Result<String, RegistrationError> {
        let profile = NewProfile {
            id: account.id,
            email: account.email.clone(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            phone: input.phone.clone(),
        };

        self.profiles.provision(&profile).await.map_err(|e| {
            warn!("Profile provisioning failed for {}: {e}", account.id);
            RegistrationError::ProfileProvisioningFailed(e.to_string())
        })?;

        let access_token = self
            .tokens
            .issue(account.id, &account.email, account.role)
            .map_err(|e| RegistrationError::TokenIssuanceFailed(e.to_string()))?;
        if access_token.is_empty() {
            return Err(RegistrationError::TokenIssuanceFailed(
                "issuer returned an empty token".into(),
            ));
        }

        self.accounts
            .mark_account_active(account.id)
            .await
            .map_err(|e| RegistrationError::UnexpectedFailure(e.to_string()))?;

        Ok(access_token)
    }

    /// Delete the account created earlier in this pipeline
    ///
    /// A failed delete supersedes the original error: the caller must learn
    /// about the orphaned row, not about the failure that caused it.
    async fn compensate(
        &self,
        account_id: Uuid,
        original: RegistrationError,
    ) -> RegistrationError {
        match self.accounts.delete_account(account_id).await {
            Ok(()) => {
                info!("Compensated registration for account {account_id}: {original}");
                original
            }
            Err(e) => {
                error!(
                    account_id = %account_id,
                    original = %original,
                    "Compensation failed, orphaned account requires operator attention: {e}"
                );
                RegistrationError::CompensationFailed {
                    account_id,
                    reason: e.to_string(),
                    original: original.to_string(),
                }
            }
        }
    }

    /// Remove accounts stuck in `provisioning` longer than `grace`
    ///
    /// Run at startup so a crash between account creation and compensation
    /// does not leave orphans behind forever.
    ///
    /// # Errors
    ///
    /// Returns an error if the store delete fails.
    pub async fn sweep_stale_registrations(&self, grace: Duration) -> anyhow::Result<u64> {
        let cutoff = Utc::now() - grace;
        let swept = self.accounts.sweep_stale_registrations(cutoff).await?;
        if swept > 0 {
            warn!("Swept {swept} accounts stuck mid-registration");
        }
        Ok(swept)
    }

    /// Verify credentials and issue an access token
    ///
    /// Inactive accounts are rejected before any password comparison so an
    /// inactive account never learns whether the supplied password was
    /// correct.
    ///
    /// # Errors
    ///
    /// Returns one classified [`SignInError`].
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome, SignInError> {
        let credentials = self
            .accounts
            .get_credentials_by_email(email)
            .await
            .map_err(|e| SignInError::LookupFailed(e.to_string()))?;

        let Some(credentials) = credentials else {
            return Err(SignInError::InvalidCredentials);
        };

        if !credentials.is_active {
            return Err(SignInError::AccountInactive);
        }

        // A comparison error counts as a mismatch; the caller learns nothing
        // beyond "invalid credentials" either way.
        let matches = self
            .hasher
            .verify(password, &credentials.password_hash)
            .unwrap_or(false);
        if !matches {
            return Err(SignInError::InvalidCredentials);
        }

        let access_token = self
            .tokens
            .issue(credentials.id, &credentials.email, credentials.role)
            .map_err(|e| SignInError::TokenIssuanceFailed(e.to_string()))?;

        info!("Sign-in succeeded for account {}", credentials.id);
        Ok(SignInOutcome { access_token })
    }
}
