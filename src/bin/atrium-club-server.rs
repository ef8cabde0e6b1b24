// ABOUTME: Production server binary wiring configuration, storage, clients and routes
// ABOUTME: Seeds the room catalog and sweeps stale registrations before serving
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Atrium Club Server Binary
//!
//! Starts the record-keeping HTTP API with account registration, sign-in and
//! booking admission.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use atrium_club_server::{
    admission::AdmissionEngine,
    auth::{BcryptHasher, JwtIssuer},
    clients::{build_http_client, HttpMembershipClient, HttpProfileClient},
    config::{ServerConfig, TierPolicy},
    database::Database,
    logging,
    registration::RegistrationService,
    routes::{self, AppState},
};

#[derive(Parser)]
#[command(name = "atrium-club-server")]
#[command(about = "Atrium Club - accounts, bookings and membership-gated admission")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Atrium Club Server");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url).await?;
    info!("Database initialized: {}", config.database.url);

    database.seed_rooms().await?;

    let http_client = build_http_client(&config.http_client);
    let profiles = Arc::new(HttpProfileClient::new(
        http_client.clone(),
        config.services.client_service_url.clone(),
    ));
    let memberships = Arc::new(HttpMembershipClient::new(
        http_client,
        config.services.membership_service_url.clone(),
    ));

    let registration = RegistrationService::new(
        Arc::new(database.clone()),
        profiles,
        Arc::new(BcryptHasher),
        Arc::new(JwtIssuer::new(&config.auth)),
    );

    // Clean up accounts orphaned by a crash mid-registration.
    let swept = registration
        .sweep_stale_registrations(chrono::Duration::seconds(
            config.registration.sweep_grace_secs,
        ))
        .await?;
    info!("Registration sweep removed {swept} stale accounts");

    let admission = AdmissionEngine::new(
        Arc::new(database),
        memberships,
        TierPolicy::default(),
        config.booking.max_duration_secs,
    );

    let app = routes::router(Arc::new(AppState {
        registration,
        admission,
    }));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    info!("Listening on port {}", config.http_port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
