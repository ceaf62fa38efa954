//! Error type shared by every client operation.
//!
//! Variants follow the boundary where the failure happened: the identity
//! exchange (`Auth`), the network (`Transport`), the remote API (`Client`,
//! `Server`, `NotFound`), or the caller's own entity usage (`Schema`).

use reqwest::StatusCode;

/// Unified error for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Acquiring or refreshing the bearer token failed.
    #[error("authentication failed: {message}")]
    Auth {
        /// Description including the identity provider's response body, if any.
        message: String,
        /// Underlying transport or parse failure.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The request never produced an HTTP status (DNS, TCP, TLS, timeout).
    #[error("transport error (request {request_id}): {source}")]
    Transport {
        /// `client-request-id` sent with the failed request.
        request_id: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a 4xx status.
    #[error("client error {status}: {message}")]
    Client {
        status: StatusCode,
        /// Server-provided message from the OData error envelope, or the raw body.
        message: String,
    },

    /// The API answered with a 5xx status.
    #[error("server error {status}: {message} (request {request_id})")]
    Server {
        status: StatusCode,
        /// Server-provided message, as for `Client`.
        message: String,
        request_id: String,
    },

    /// A 404 on an operation addressing a single entity.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// Attempt to set a field the entity schema does not declare as settable.
    #[error("{entity} has no settable field '{field}'")]
    Schema { entity: &'static str, field: String },

    /// The response body was not the JSON shape the operation expects.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// Configuration could not be loaded or is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn auth(message: impl Into<String>) -> Self {
        Error::Auth {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn auth_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Auth {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// `true` for failures a caller may reasonably retry (network and 5xx).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Server { .. })
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Client { status, .. } | Error::Server { status, .. } => Some(*status),
            Error::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            _ => None,
        }
    }

    /// Rewrites a 404 `Client` error into `NotFound` for the given path.
    pub(crate) fn not_found_for(self, path: &str) -> Self {
        match self {
            Error::Client { status, .. } if status == StatusCode::NOT_FOUND => Error::NotFound {
                path: path.to_string(),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn only_transport_and_server_errors_are_retryable() {
        let server = Error::Server {
            status: StatusCode::BAD_GATEWAY,
            message: "upstream".to_string(),
            request_id: "r1".to_string(),
        };
        let client = Error::Client {
            status: StatusCode::BAD_REQUEST,
            message: "bad".to_string(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(!Error::auth("nope").is_retryable());
        assert!(
            !Error::Schema {
                entity: "bookingBusiness",
                field: "colour".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn not_found_rewrite_only_touches_404() {
        let err = Error::Client {
            status: StatusCode::NOT_FOUND,
            message: "gone".to_string(),
        }
        .not_found_for("solutions/bookingBusinesses/x");
        assert!(
            matches!(err, Error::NotFound { ref path } if path == "solutions/bookingBusinesses/x")
        );

        let err = Error::Client {
            status: StatusCode::FORBIDDEN,
            message: "denied".to_string(),
        }
        .not_found_for("anything");
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    }

    #[test]
    fn auth_error_chains_source() {
        let json_err = serde_json::from_str::<String>("not-json").unwrap_err();
        let err = Error::auth_with_source("token response was not JSON", json_err);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("authentication failed"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
