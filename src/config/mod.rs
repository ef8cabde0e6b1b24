// ABOUTME: Configuration module organization for environment and policy settings
// ABOUTME: Groups env-based server configuration and the injectable tier policy
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Configuration management
//!
//! All runtime configuration is environment-based; there is no config file.
//! The tier policy lives here as well so deployments (and tests) can swap
//! the blocked-room tables without touching the admission engine.

/// Environment-based server configuration
pub mod environment;

/// Membership tier booking policy
pub mod policy;

pub use environment::ServerConfig;
pub use policy::TierPolicy;
