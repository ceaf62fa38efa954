//! Client runtime for the Microsoft Bookings OData API.
//!
//! Entities are sent as partial payloads containing only the fields the
//! caller set, collections are walked lazily by following the server's
//! continuation links, and every request carries a bearer token from a
//! pluggable [`CredentialProvider`](auth::CredentialProvider).

/// Authentication helpers for Microsoft identity flows.
pub mod auth;
/// Microsoft Bookings entity schemas and actions.
pub mod bookings;
/// Client and credential configuration.
pub mod config;
/// Crate-wide error type.
pub mod error;
/// Generic OData client primitives.
pub mod odata;

pub use error::{Error, Result};

/// Logging verbosity for SDK operations.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Also log request and response payloads.
    Debug,
    /// Log requests and outcomes only.
    #[default]
    Information,
}
