use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::LogLevel;
use crate::error::{Error, Result};

/// Graph v1.0 service root hosting the Bookings entity sets.
pub const DEFAULT_SERVICE_ROOT: &str = "https://graph.microsoft.com/v1.0";
/// Default scope requested by the client-credentials grant.
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";
/// Microsoft identity platform host.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

const CONFIG_DIR_NAME: &str = "bookings-client";
const CONFIG_FILE_NAME: &str = "config.json";

/// Settings for a [`ServiceClient`](crate::odata::serviceclient::ServiceClient).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Base URL every relative request path is rooted at.
    pub service_root: String,
    pub connect_timeout_secs: u64,
    /// Full round-trip limit for a single request, body download included.
    pub request_timeout_secs: u64,
    pub log_level: LogLevel,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_root: DEFAULT_SERVICE_ROOT.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
            log_level: LogLevel::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults pointed at a different service root (e.g. a mock server).
    pub fn with_service_root(service_root: &str) -> Self {
        Self {
            service_root: service_root.to_string(),
            ..Self::default()
        }
    }

    /// Read a JSON config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: ClientConfig = serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("invalid {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `<config dir>/bookings-client/config.json`, or defaults if it does not exist.
    pub fn load_default() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let root = self.service_root.trim();
        if !(root.starts_with("https://") || root.starts_with("http://")) {
            return Err(Error::Config(format!(
                "serviceRoot must be an absolute http(s) URL, got '{}'",
                self.service_root
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("requestTimeoutSecs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Inputs for the OAuth2 client-credentials grant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCredentialsConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_authority_host")]
    pub authority_host: String,
}

impl ClientCredentialsConfig {
    pub fn new(tenant_id: &str, client_id: &str, client_secret: &str) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            scope: default_scope(),
            authority_host: default_authority_host(),
        }
    }

    /// Token endpoint for the configured tenant.
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("invalid {}: {e}", path.display())))
    }
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_authority_host() -> String {
    DEFAULT_AUTHORITY_HOST.to_string()
}

fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push(CONFIG_DIR_NAME);
    path.push(CONFIG_FILE_NAME);
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{ "requestTimeoutSecs": 5, "logLevel": "debug" }"#).unwrap();
        assert_eq!(config.service_root, DEFAULT_SERVICE_ROOT);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(matches!(config.log_level, LogLevel::Debug));
    }

    #[test]
    fn relative_service_root_is_rejected() {
        let config = ClientConfig::with_service_root("graph.microsoft.com/v1.0");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn token_url_uses_authority_and_tenant() {
        let mut creds = ClientCredentialsConfig::new("contoso", "cid", "secret");
        assert_eq!(
            creds.token_url(),
            "https://login.microsoftonline.com/contoso/oauth2/v2.0/token"
        );
        creds.authority_host = "http://127.0.0.1:9000/".to_string();
        assert_eq!(creds.token_url(), "http://127.0.0.1:9000/contoso/oauth2/v2.0/token");
    }

    #[test]
    fn credentials_scope_defaults_to_graph() {
        let creds: ClientCredentialsConfig = serde_json::from_str(
            r#"{ "tenantId": "t", "clientId": "c", "clientSecret": "s" }"#,
        )
        .unwrap();
        assert_eq!(creds.scope, DEFAULT_SCOPE);
        assert_eq!(creds.authority_host, DEFAULT_AUTHORITY_HOST);
    }

    #[test]
    fn from_file_reports_missing_file_as_config_error() {
        let err = ClientConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
