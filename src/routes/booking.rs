// ABOUTME: Booking admission route handler
// ABOUTME: Forwards the reservation request to the admission engine and maps its error taxonomy
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use super::AppState;
use crate::admission::AdmissionRequest;
use crate::errors::ApiError;
use crate::models::Booking;

/// Booking routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/booking", post(create_booking))
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AdmissionRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let booking = state.admission.admit(request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}
