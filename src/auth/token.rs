use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tokio::sync::Mutex;

use crate::error::{Error, Result};

/// Tokens expiring within this window are refreshed ahead of time.
const REFRESH_SKEW_SECS: u64 = 300;

/// Opaque bearer credential plus its expiry, when known.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    pub access_token: String,
    /// Unix seconds. `None` means the token is used until the server rejects it.
    pub expires_at: Option<u64>,
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl BearerToken {
    pub fn new(access_token: &str, expires_at: Option<u64>) -> Self {
        Self {
            access_token: access_token.to_string(),
            expires_at,
        }
    }

    pub fn is_expiring_soon(&self) -> bool {
        is_expiring_soon(self.expires_at)
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub fn is_expiring_soon(expires_at: Option<u64>) -> bool {
    let Some(exp) = expires_at else {
        return false;
    };
    now_secs().saturating_add(REFRESH_SKEW_SECS) >= exp
}

/// Reads the `exp` claim from a JWT without verifying it.
pub fn jwt_expiry(token: &str) -> Option<u64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_u64()
}

/// Supplies the bearer token attached to every outbound request.
///
/// Implementations must be safe to call once per request from many tasks.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn token(&self) -> Result<BearerToken>;

    /// Called when the server answered 401 to a request carrying `rejected`.
    async fn invalidate(&self, _rejected: &BearerToken) {}
}

/// One round trip to an identity provider.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(&self) -> Result<BearerToken>;
}

/// Caches the token from a [`TokenExchange`] and refreshes it when it is
/// missing, expiring, or invalidated.
///
/// The cache lock is held across the exchange, so concurrent callers that
/// find no usable token wait for the single in-flight refresh. Dropping a
/// waiting or refreshing caller releases the lock.
pub struct RefreshingProvider<E> {
    exchange: E,
    cache: Mutex<Option<BearerToken>>,
}

impl<E: TokenExchange> RefreshingProvider<E> {
    pub fn new(exchange: E) -> Self {
        Self {
            exchange,
            cache: Mutex::new(None),
        }
    }

    /// Seeds the cache, e.g. with a token persisted by a previous run.
    pub fn with_cached(exchange: E, token: BearerToken) -> Self {
        Self {
            exchange,
            cache: Mutex::new(Some(token)),
        }
    }
}

#[async_trait]
impl<E: TokenExchange> CredentialProvider for RefreshingProvider<E> {
    async fn token(&self) -> Result<BearerToken> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if !cached.access_token.trim().is_empty() && !cached.is_expiring_soon() {
                return Ok(cached.clone());
            }
        }

        log::debug!("Refreshing bearer token");
        let fresh = self.exchange.exchange().await?;
        *cache = Some(fresh.clone());
        Ok(fresh)
    }

    async fn invalidate(&self, rejected: &BearerToken) {
        let mut cache = self.cache.lock().await;
        if cache
            .as_ref()
            .is_some_and(|cached| cached.access_token == rejected.access_token)
        {
            log::info!("Discarding bearer token rejected by the server");
            *cache = None;
        }
    }
}

/// A fixed token obtained out of band. It cannot refresh.
pub struct StaticToken {
    token: BearerToken,
}

impl StaticToken {
    /// Uses the JWT `exp` claim as expiry when the token is a JWT.
    pub fn new(access_token: &str) -> Self {
        Self {
            token: BearerToken::new(access_token, jwt_expiry(access_token)),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn token(&self) -> Result<BearerToken> {
        if self
            .token
            .expires_at
            .is_some_and(|exp| now_secs() >= exp)
        {
            return Err(Error::auth("static bearer token has expired"));
        }
        Ok(self.token.clone())
    }
}
