//! Per-role token cache with an expiry safety margin.
//!
//! A cached token is only handed out while it has more than the configured
//! safety margin of validity left. Refreshes are single-flight per role: when
//! several callers find the same role's entry stale, one of them logs in and
//! the others reuse its token.

use crate::authenticator::Authenticator;
use crate::clock::{Clock, SystemClock};
use crate::role::Role;
use harness_common::{HarnessConfig, HarnessResult};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Default remaining validity a token must have to be reused.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(5 * 60);

static SHARED: Lazy<TokenCache> =
    Lazy::new(|| TokenCache::new(CacheConfig::from_env(), Arc::new(SystemClock)));

/// Token cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Remaining validity below which a cached token is refreshed
    pub safety_margin: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

impl From<&HarnessConfig> for CacheConfig {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            safety_margin: config.token_safety_margin(),
        }
    }
}

impl CacheConfig {
    /// Margin from `TOKEN_SAFETY_MARGIN`, or the default when the environment
    /// does not load.
    #[must_use]
    pub fn from_env() -> Self {
        match HarnessConfig::from_env() {
            Ok(config) => Self::from(&config),
            Err(e) => {
                warn!(error = %e, "Invalid harness environment, using default token margin");
                Self::default()
            }
        }
    }

    /// Set the safety margin.
    #[must_use]
    pub const fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    fn margin_millis(&self) -> i64 {
        i64::try_from(self.safety_margin.as_millis()).unwrap_or(i64::MAX)
    }
}

/// A bearer token and the instant it stops being valid.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    /// Bearer token
    pub token: String,
    /// Expiry in epoch milliseconds
    pub expires_at: i64,
}

impl CachedToken {
    /// Whether the token is still valid for more than `margin_millis` at `now`.
    #[must_use]
    pub const fn is_fresh(&self, now: i64, margin_millis: i64) -> bool {
        self.expires_at > now.saturating_add(margin_millis)
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Role-keyed bearer token cache.
pub struct TokenCache {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<Role, CachedToken>>,
    refresh_locks: Mutex<HashMap<Role, Arc<Mutex<()>>>>,
}

impl TokenCache {
    /// Create a cache with the given configuration and clock.
    #[must_use]
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            entries: RwLock::new(HashMap::new()),
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create a cache with the default margin and the system clock.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default(), Arc::new(SystemClock))
    }

    /// Process-wide cache, created on first use with the margin from
    /// [`CacheConfig::from_env`].
    ///
    /// Lives until process exit; call [`TokenCache::clear_cache`] to force
    /// re-authentication between tests.
    #[must_use]
    pub fn shared() -> &'static Self {
        &SHARED
    }

    /// Get a token for `role`, logging in through `authenticator` when the
    /// cached one is missing or inside the safety margin.
    ///
    /// The authenticator is called at most once per call and never retried.
    ///
    /// # Errors
    ///
    /// Propagates the authenticator's error unchanged.
    #[instrument(skip(self, authenticator), fields(role = %role))]
    pub async fn get_token(
        &self,
        role: &Role,
        authenticator: &dyn Authenticator,
    ) -> HarnessResult<String> {
        if let Some(token) = self.fresh_token(role).await {
            debug!("Token cache hit");
            return Ok(token);
        }

        let lock = self.refresh_lock(role).await;
        let _guard = lock.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(token) = self.fresh_token(role).await {
            debug!("Token refreshed by concurrent caller");
            return Ok(token);
        }

        let grant = authenticator.authenticate(role).await.inspect_err(|e| {
            warn!(error = %e, "Login failed");
        })?;

        let expires_at = self
            .clock
            .now_millis()
            .saturating_add(grant.expires_in_millis());
        if grant.expires_in_millis() <= self.config.margin_millis() {
            warn!(
                expires_in_secs = grant.expires_in_secs,
                safety_margin_secs = self.config.safety_margin.as_secs(),
                "Issued token lifetime does not exceed the safety margin"
            );
        }

        self.entries.write().await.insert(
            role.clone(),
            CachedToken {
                token: grant.token.clone(),
                expires_at,
            },
        );

        info!(expires_in_secs = grant.expires_in_secs, "Refreshed token");
        Ok(grant.token)
    }

    /// Drop every cached token.
    pub async fn clear_cache(&self) {
        self.entries.write().await.clear();
        debug!("Token cache cleared");
    }

    /// Cached token for `role`, ignoring expiry. Diagnostic only.
    pub async fn peek(&self, role: &Role) -> Option<String> {
        self.entries
            .read()
            .await
            .get(role)
            .map(|entry| entry.token.clone())
    }

    /// Cached entry for `role`, ignoring expiry.
    pub async fn entry(&self, role: &Role) -> Option<CachedToken> {
        self.entries.read().await.get(role).cloned()
    }

    /// Number of cached roles.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// The configured safety margin.
    #[must_use]
    pub const fn safety_margin(&self) -> Duration {
        self.config.safety_margin
    }

    async fn fresh_token(&self, role: &Role) -> Option<String> {
        let now = self.clock.now_millis();
        let margin = self.config.margin_millis();
        self.entries
            .read()
            .await
            .get(role)
            .filter(|entry| entry.is_fresh(now, margin))
            .map(|entry| entry.token.clone())
    }

    async fn refresh_lock(&self, role: &Role) -> Arc<Mutex<()>> {
        self.refresh_locks
            .lock()
            .await
            .entry(role.clone())
            .or_default()
            .clone()
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}
