use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use uuid::Uuid;

use crate::LogLevel;
use crate::auth::token::{BearerToken, CredentialProvider};
use crate::config::ClientConfig;
use crate::error::{Error, Result};

const REQUEST_ID_HEADER: &str = "client-request-id";

/// Status and decoded JSON body of a successful call.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    /// `None` when the server sent no body (e.g. 204).
    pub body: Option<Value>,
}

/// Sends authenticated JSON requests and classifies failures.
///
/// Stateless between calls apart from the token cache owned by the
/// credential provider. Cloning is cheap and shares the connection pool.
#[derive(Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
    log_level: LogLevel,
}

impl Transport {
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.service_root.trim_end_matches('/').to_string(),
            credentials,
            log_level: config.log_level,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs pass through untouched; caller paths are rooted at the
    /// service base URL.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("https://") || path.starts_with("http://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Response> {
        self.send_with_headers(method, path, body, &[]).await
    }

    /// Like [`send`](Self::send) with extra request headers.
    ///
    /// A 401 invalidates the token and resends once with a fresh one; no
    /// other failure is retried.
    pub async fn send_with_headers(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> Result<Response> {
        let url = self.url_for(path);
        let request_id = Uuid::new_v4().to_string();

        log::debug!("{} {} (request {})", method, url, request_id);
        if matches!(self.log_level, LogLevel::Debug) {
            if let Some(payload) = body {
                log::debug!("Request body: {}", payload);
            }
        }

        let token = self.credentials.token().await?;
        let mut resp = self
            .execute(method.clone(), &url, &token, body, headers, &request_id)
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            log::info!("{} {} returned 401, retrying with a fresh token", method, url);
            self.credentials.invalidate(&token).await;
            let fresh = self.credentials.token().await?;
            resp = self
                .execute(method.clone(), &url, &fresh, body, headers, &request_id)
                .await?;
        }

        self.classify(resp, &method, &url, &request_id).await
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        token: &BearerToken,
        body: Option<&Value>,
        headers: &[(&str, &str)],
        request_id: &str,
    ) -> Result<reqwest::Response> {
        let mut req = self
            .client
            .request(method, url)
            .bearer_auth(&token.access_token)
            .header("Accept", "application/json")
            .header(REQUEST_ID_HEADER, request_id);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        if let Some(payload) = body {
            req = req.json(payload);
        }

        req.send().await.map_err(|source| Error::Transport {
            request_id: request_id.to_string(),
            source,
        })
    }

    async fn classify(
        &self,
        resp: reqwest::Response,
        method: &Method,
        url: &str,
        request_id: &str,
    ) -> Result<Response> {
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|source| Error::Transport {
            request_id: request_id.to_string(),
            source,
        })?;

        if status.is_success() {
            if matches!(self.log_level, LogLevel::Debug) {
                log::debug!("Response {}: {}", status, String::from_utf8_lossy(&bytes));
            }
            let body = if bytes.iter().all(u8::is_ascii_whitespace) {
                None
            } else {
                Some(serde_json::from_slice(&bytes).map_err(|e| {
                    Error::Decode(format!("{method} {url} returned invalid JSON: {e}"))
                })?)
            };
            return Ok(Response { status, body });
        }

        let text = String::from_utf8_lossy(&bytes);
        log::warn!(
            "{} {} failed with {} (request {})",
            method,
            url,
            status,
            request_id
        );

        if status.is_server_error() {
            return Err(Error::Server {
                status,
                message: server_message(&text),
                request_id: request_id.to_string(),
            });
        }
        if status.is_client_error() {
            return Err(Error::Client {
                status,
                message: server_message(&text),
            });
        }
        Err(Error::Decode(format!("{method} {url} returned unexpected status {status}")))
    }
}

/// Message from an OData error envelope, or the raw body.
fn server_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::StaticToken;

    fn transport(root: &str) -> Transport {
        Transport::new(
            &ClientConfig::with_service_root(root),
            Arc::new(StaticToken::new("t")),
        )
        .unwrap()
    }

    #[test]
    fn relative_paths_are_rooted_at_service_root() {
        let transport = transport("https://graph.microsoft.com/v1.0/");
        assert_eq!(
            transport.url_for("/solutions/bookingBusinesses"),
            "https://graph.microsoft.com/v1.0/solutions/bookingBusinesses"
        );
    }

    #[test]
    fn absolute_links_pass_through() {
        let transport = transport("https://graph.microsoft.com/v1.0");
        let link = "https://graph.microsoft.com/v1.0/x?$skiptoken=abc%3D%3D";
        assert_eq!(transport.url_for(link), link);
    }

    #[test]
    fn server_message_prefers_odata_envelope() {
        let body = r#"{"error":{"code":"BadRequest","message":"displayName is required"}}"#;
        assert_eq!(server_message(body), "displayName is required");
        assert_eq!(server_message("  plain failure \n"), "plain failure");
    }

    #[test]
    fn invalid_service_root_is_a_config_error() {
        let result = Transport::new(
            &ClientConfig::with_service_root("not a url"),
            Arc::new(StaticToken::new("t")),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
