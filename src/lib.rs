// ABOUTME: Main library entry point for the Atrium Club record-keeping services
// ABOUTME: Provides registration, sign-in and booking admission over a REST API
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

#![deny(unsafe_code)]

//! # Atrium Club Server
//!
//! Record-keeping services for a wellness club: account registration,
//! sign-in and room-booking admission. The interesting parts are the two
//! write-path orchestrators:
//!
//! - **Registration** creates a local account, provisions a profile in the
//!   client service over HTTP and issues an access token, deleting the local
//!   account again if any later step fails.
//! - **Booking admission** combines local conflict detection (no two
//!   pending/confirmed bookings may overlap on a room) with a tier policy
//!   driven by a remotely fetched membership.
//!
//! Everything else is plumbing in the shape you'd expect: axum routes, a
//! sqlite store behind trait seams, reqwest clients for the sibling
//! services, and env-based configuration.
//!
//! ## Example
//!
//! ```rust,no_run
//! use atrium_club_server::config::ServerConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ServerConfig::from_env()?;
//! println!("Atrium Club Server configured with port: HTTP={}", config.http_port);
//! # Ok(())
//! # }
//! ```

/// Booking admission engine
pub mod admission;

/// Password hashing and token capabilities
pub mod auth;

/// Outbound HTTP clients for sibling services
pub mod clients;

/// Configuration management
pub mod config;

/// Application constants and defaults
pub mod constants;

/// Database management for accounts, rooms and bookings
pub mod database;

/// Classified error types and HTTP error responses
pub mod errors;

/// Production logging and structured output
pub mod logging;

/// Common data models
pub mod models;

/// Registration saga orchestrator and sign-in verifier
pub mod registration;

/// HTTP routes
pub mod routes;
