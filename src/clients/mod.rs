// ABOUTME: Outbound HTTP clients for the sibling record-keeping services
// ABOUTME: Shared reqwest client construction with bounded connect and request timeouts
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Remote Service Clients
//!
//! The registration saga provisions client profiles over HTTP and the booking
//! admission engine reads memberships over HTTP. Both collaborators are trait
//! objects so orchestrator tests can swap in doubles; the `Http*`
//! implementations here are what production wires in.

/// Membership service read client
pub mod membership;

/// Client-profile provisioning client
pub mod profile;

pub use membership::{HttpMembershipClient, MembershipClient, MembershipLookupError};
pub use profile::{HttpProfileClient, NewProfile, ProfileClient};

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::config::environment::HttpClientConfig;

/// Build the shared outbound HTTP client
///
/// Every outbound call carries both a connect timeout and an overall request
/// timeout; a remote service that hangs classifies as a transport failure
/// rather than stalling the admission pipeline.
#[must_use]
pub fn build_http_client(config: &HttpClientConfig) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| Client::new())
}
