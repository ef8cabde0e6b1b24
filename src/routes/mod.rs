// ABOUTME: Route module organization for the Atrium Club HTTP endpoints
// ABOUTME: Assembles the axum router with tracing, request-id, CORS and timeout layers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! HTTP routes
//!
//! Handlers are thin: they validate request shape, delegate to the
//! orchestrators and translate classified errors into HTTP responses. No
//! business rule lives here.

/// Registration and sign-in routes
pub mod auth;

/// Booking admission routes
pub mod booking;

/// Health check and readiness routes
pub mod health;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::admission::AdmissionEngine;
use crate::constants::timeouts;
use crate::registration::RegistrationService;

/// Shared state handed to every route handler
pub struct AppState {
    /// Registration saga orchestrator and sign-in verifier
    pub registration: RegistrationService,
    /// Booking admission engine
    pub admission: AdmissionEngine,
}

/// Assemble the full application router
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(auth::routes())
        .merge(booking::routes())
        .merge(health::routes())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(
            timeouts::DEFAULT_REQUEST_TIMEOUT_SECS,
        )))
        .with_state(state)
}
