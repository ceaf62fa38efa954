use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::auth::token::{BearerToken, TokenExchange};
use crate::config::ClientCredentialsConfig;
use crate::error::{Error, Result};

/// Form body for the client-credentials grant.
#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    scope: &'a str,
    grant_type: &'a str,
}

/// Fields of the token endpoint response we rely on; extras such as
/// `ext_expires_in` are ignored.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// OAuth2 client-credentials exchange against the Microsoft identity platform.
pub struct ClientCredentials {
    client: Client,
    config: ClientCredentialsConfig,
}

impl ClientCredentials {
    pub fn new(config: ClientCredentialsConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl TokenExchange for ClientCredentials {
    async fn exchange(&self) -> Result<BearerToken> {
        let params = TokenRequest {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            scope: &self.config.scope,
            grant_type: "client_credentials",
        };

        let token_url = self.config.token_url();
        log::debug!("Requesting client-credentials token from {}", token_url);

        let resp = self
            .client
            .post(&token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::auth_with_source("token request failed", e))?;

        // Read the body before checking status so AADSTS diagnostics survive.
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::auth_with_source("failed to read token response", e))?;

        if !status.is_success() {
            return Err(Error::auth(format!("token request failed ({status}): {body}")));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::auth_with_source("token response was not valid JSON", e))?;

        if parsed.access_token.trim().is_empty() {
            return Err(Error::auth("access token was empty"));
        }

        let expires_at = match parsed.expires_in {
            Some(expires_in) => Some(now_secs()?.saturating_add(expires_in)),
            None => None,
        };

        Ok(BearerToken {
            access_token: parsed.access_token,
            expires_at,
        })
    }
}

fn now_secs() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| Error::auth_with_source("system clock is before the unix epoch", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_request_serializes_as_form_fields() {
        let params = TokenRequest {
            client_id: "cid",
            client_secret: "s3cr~t",
            scope: "https://graph.microsoft.com/.default",
            grant_type: "client_credentials",
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["grant_type"], "client_credentials");
        assert_eq!(value["client_id"], "cid");
    }

    #[test]
    fn token_response_tolerates_missing_expiry_and_extra_fields() {
        let parsed: TokenResponse = serde_json::from_str(
            r#"{ "token_type": "Bearer", "ext_expires_in": 3599, "access_token": "tok" }"#,
        )
        .unwrap();
        assert_eq!(parsed.access_token, "tok");
        assert!(parsed.expires_in.is_none());
    }
}
