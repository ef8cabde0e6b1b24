// ABOUTME: Read-only membership lookup against the membership service
// ABOUTME: Distinguishes a not-authenticated signal from service unavailability
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Membership;

/// Ways a membership lookup can fail
#[derive(Debug, Error)]
pub enum MembershipLookupError {
    /// The membership service answered 401: the user holds no membership it
    /// is willing to disclose
    #[error("membership service rejected the lookup as unauthenticated")]
    NotAuthenticated,
    /// Transport failure, timeout or unexpected response; retrying may succeed
    #[error("membership service unavailable: {0}")]
    Unavailable(String),
}

/// Remote membership read capability
#[async_trait]
pub trait MembershipClient: Send + Sync {
    /// Fetch the user's active membership, if any
    ///
    /// A `2xx` response with an empty or `null` body means the user has no
    /// active membership and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipLookupError::NotAuthenticated`] on a 401 response
    /// and [`MembershipLookupError::Unavailable`] on any other failure.
    async fn active_membership(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Membership>, MembershipLookupError>;
}

/// reqwest-backed membership client
pub struct HttpMembershipClient {
    client: Client,
    base_url: String,
}

impl HttpMembershipClient {
    /// Create a client against the given base URL
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MembershipClient for HttpMembershipClient {
    async fn active_membership(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Membership>, MembershipLookupError> {
        let url = format!("{}/memberships/user/{user_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MembershipLookupError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(MembershipLookupError::NotAuthenticated);
        }
        if !status.is_success() {
            return Err(MembershipLookupError::Unavailable(format!(
                "membership service responded with status {status}"
            )));
        }

        // The membership service answers 200 with an empty body when the user
        // has no active membership.
        let body = response
            .text()
            .await
            .map_err(|e| MembershipLookupError::Unavailable(e.to_string()))?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }

        serde_json::from_str::<Membership>(trimmed)
            .map(Some)
            .map_err(|e| {
                MembershipLookupError::Unavailable(format!("malformed membership payload: {e}"))
            })
    }
}
