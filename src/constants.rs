// ABOUTME: System-wide constants and defaults for the Atrium Club server
// ABOUTME: Contains limits, default ports and service naming used across modules
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Constants Module
//!
//! Hardcoded constants and the defaults behind the environment-variable
//! configuration in [`crate::config::environment`].

/// Service naming
pub mod service {
    /// Service name used in logs and as the default JWT issuer
    pub const NAME: &str = "atrium-club-server";

    /// Server version from Cargo.toml
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Default ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// Operational limits
pub mod limits {
    /// Longest slot a single booking may reserve, in seconds (2 hours)
    pub const MAX_BOOKING_DURATION_SECS: i64 = 2 * 60 * 60;

    /// Default access-token lifetime, in seconds
    pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

    /// How long a `provisioning` account may linger before the recovery
    /// sweep considers it orphaned, in seconds
    pub const REGISTRATION_SWEEP_GRACE_SECS: i64 = 15 * 60;

    /// Password length bounds enforced at the HTTP boundary
    pub const MIN_PASSWORD_LEN: usize = 5;
    /// Upper password length bound
    pub const MAX_PASSWORD_LEN: usize = 50;

    /// Longest accepted first/last name
    pub const MAX_NAME_LEN: usize = 30;
    /// Longest accepted phone number
    pub const MAX_PHONE_LEN: usize = 20;
}

/// Outbound HTTP timeouts
pub mod timeouts {
    /// Default request timeout for calls to sibling services, in seconds
    pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

    /// Default connect timeout for calls to sibling services, in seconds
    pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;

    /// Default timeout applied to inbound requests, in seconds
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
}

/// Default connection strings and URLs
pub mod defaults {
    /// Default sqlite database location
    pub const DATABASE_URL: &str = "sqlite:data/atrium.db";

    /// Default base URL for the client-profile service
    pub const CLIENT_SERVICE_URL: &str = "http://localhost:3001";

    /// Default base URL for the membership service
    pub const MEMBERSHIP_SERVICE_URL: &str = "http://localhost:3003";

    /// Default JWT audience
    pub const JWT_AUDIENCE: &str = "atrium-club";

    /// Default JWT issuer
    pub const JWT_ISSUER: &str = "atrium-club-server";
}
