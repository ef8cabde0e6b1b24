// ABOUTME: Client-profile provisioning over HTTP for the registration saga
// ABOUTME: POSTs the new profile to the client service and reports any non-2xx as failure
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// Profile payload sent to the client service
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    /// Account id, shared between both services
    pub id: Uuid,
    /// Account email
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Optional phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Remote profile provisioning capability
#[async_trait]
pub trait ProfileClient: Send + Sync {
    /// Create the profile in the client service
    ///
    /// # Errors
    ///
    /// Returns an error on any non-2xx response, transport failure or timeout.
    async fn provision(&self, profile: &NewProfile) -> Result<()>;
}

/// reqwest-backed profile client
pub struct HttpProfileClient {
    client: Client,
    base_url: String,
}

impl HttpProfileClient {
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
impl ProfileClient for HttpProfileClient {
    async fn provision(&self, profile: &NewProfile) -> Result<()> {
        let url = format!("{}/client", self.base_url);
        debug!("Provisioning client profile for account {}", profile.id);

        let response = self
            .client
            .post(&url)
            .json(profile)
            .send()
            .await
            .context("client service unreachable")?;

        let status = response.status();
        if !status.is_success() {
            bail!("client service responded with status {status}");
        }

        Ok(())
    }
}
