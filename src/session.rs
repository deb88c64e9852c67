// ABOUTME: Session manager owning the connection config and the authentication state machine
// ABOUTME: Coalesces concurrent logins into one in-flight attempt and tracks token expiry per config generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

//! # Session Manager
//!
//! Holds the only shared mutable state in the adapter: the current
//! [`ConnectionConfig`] and its authentication session.
//!
//! ```text
//! Unauthenticated ──(auth needed)──▶ Authenticating ──ok──▶ Authenticated
//!        ▲                                 │                     │
//!        └──────────────failure────────────┘                401/403
//!                                                                ▼
//! Expired ─────────────(auth needed)──▶ Authenticating        Expired
//! ```
//!
//! Every config replacement bumps a generation counter and resets the state
//! to `Unauthenticated`. Callers work from a [`SessionLease`], a snapshot of
//! config, token, and generation, so a token can never be paired with a
//! config it was not issued for.
//!
//! Logins are single-flight: the first caller to need one installs a shared
//! [`OnceCell`], and every concurrent caller awaits that same cell. If the
//! caller running the login is cancelled, the cell stays empty and the next
//! waiter runs the login instead.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::endpoints::{self, LOGIN};
use crate::http;
use crate::types::ScadaError;

type LoginOutcome = Result<Option<String>, ScadaError>;
type LoginCell = Arc<OnceCell<LoginOutcome>>;

/// Authentication state of the current connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    /// No login attempted under the current config
    Unauthenticated,
    /// A login is in flight
    Authenticating,
    /// Login succeeded; token (possibly none, for guest sessions) is cached
    Authenticated,
    /// Upstream rejected the cached token; next request logs in again
    Expired,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Config, token, and generation a single request runs under
#[derive(Clone)]
pub struct SessionLease {
    config: Arc<ConnectionConfig>,
    token: Option<String>,
    generation: u64,
}

impl SessionLease {
    /// Connection the lease was issued for
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Bearer token, if the session has one
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Config generation the lease belongs to
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for SessionLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLease")
            .field("base_url", &self.config.base_url())
            .field("has_token", &self.token.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}

/// Read-only view of the session for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Current authentication state
    pub state: AuthState,
    /// Configured base URL
    pub base_url: Option<String>,
    /// Configured username
    pub username: Option<String>,
    /// Whether a token is cached
    pub has_token: bool,
    /// Seconds since the cached login completed
    pub token_age_secs: Option<u64>,
    /// Number of config replacements so far
    pub generation: u64,
}

struct SessionInner {
    config: Option<Arc<ConnectionConfig>>,
    generation: u64,
    state: AuthState,
    token: Option<String>,
    obtained_at: Option<Instant>,
    login: Option<LoginCell>,
}

impl SessionInner {
    fn reset(&mut self, state: AuthState) {
        self.state = state;
        self.token = None;
        self.obtained_at = None;
    }
}

/// Owner of the connection config and its authentication session
///
/// The internal lock is held only for bookkeeping, never across network I/O.
pub struct SessionManager {
    http: reqwest::Client,
    inner: Mutex<SessionInner>,
}

impl SessionManager {
    /// Create an unconfigured session manager sharing the given HTTP client
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            inner: Mutex::new(SessionInner {
                config: None,
                generation: 0,
                state: AuthState::Unauthenticated,
                token: None,
                obtained_at: None,
                login: None,
            }),
        }
    }

    /// Replace the connection config and reset to `Unauthenticated`
    ///
    /// An in-flight login for the previous config may still finish, but its
    /// outcome is discarded. Returns the new generation.
    pub async fn configure(&self, config: ConnectionConfig) -> u64 {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.config = Some(Arc::new(config));
        inner.login = None;
        inner.reset(AuthState::Unauthenticated);
        info!(generation = inner.generation, "Connection config replaced, session reset");
        inner.generation
    }

    /// Whether a connection has been configured
    pub async fn is_configured(&self) -> bool {
        self.inner.lock().await.config.is_some()
    }

    /// Current authentication state
    pub async fn state(&self) -> AuthState {
        self.inner.lock().await.state
    }

    /// Diagnostic snapshot of config and auth state
    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().await;
        SessionSnapshot {
            state: inner.state,
            base_url: inner.config.as_ref().map(|c| c.base_url().to_owned()),
            username: inner
                .config
                .as_ref()
                .and_then(|c| c.username().map(ToOwned::to_owned)),
            has_token: inner.token.is_some(),
            token_age_secs: inner.obtained_at.map(|t| t.elapsed().as_secs()),
            generation: inner.generation,
        }
    }

    /// Get a lease carrying a valid session, logging in if necessary
    pub async fn ensure_authenticated(&self) -> Result<SessionLease, ScadaError> {
        self.lease(true).await
    }

    /// Get a lease for a request
    ///
    /// Endpoints that do not require auth get a lease without a token and
    /// never trigger a login. For the rest, a cached session is reused, an
    /// in-flight login is joined, or a new login is started.
    pub async fn lease(&self, requires_auth: bool) -> Result<SessionLease, ScadaError> {
        loop {
            let (cell, config, generation) = {
                let mut inner = self.inner.lock().await;
                let Some(config) = inner.config.clone() else {
                    return Err(ScadaError::auth(
                        "SCADA-LTS connection not configured. Use configure_connection first.",
                    ));
                };
                let generation = inner.generation;

                if !requires_auth {
                    return Ok(SessionLease {
                        config,
                        token: None,
                        generation,
                    });
                }

                match (inner.state, inner.login.clone()) {
                    (AuthState::Authenticated, _) => {
                        return Ok(SessionLease {
                            config,
                            token: inner.token.clone(),
                            generation,
                        });
                    }
                    (AuthState::Authenticating, Some(cell)) => {
                        debug!(generation, "Joining in-flight login");
                        (cell, config, generation)
                    }
                    _ => {
                        let cell: LoginCell = Arc::new(OnceCell::new());
                        inner.state = AuthState::Authenticating;
                        inner.login = Some(Arc::clone(&cell));
                        (cell, config, generation)
                    }
                }
            };

            let login_config = Arc::clone(&config);
            let outcome = cell
                .get_or_init(|| self.run_login(login_config, generation))
                .await
                .clone();

            if !self.is_current(generation).await {
                debug!(generation, "Config replaced during login, starting over");
                continue;
            }
            return outcome.map(|token| SessionLease {
                config,
                token,
                generation,
            });
        }
    }

    /// Mark the session expired after the upstream rejected `lease`'s token
    ///
    /// No-op when the session has already moved on (new config, or another
    /// request already refreshed the token). Returns whether it expired.
    pub async fn mark_expired(&self, lease: &SessionLease) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.generation != lease.generation
            || inner.state != AuthState::Authenticated
            || inner.token != lease.token
        {
            return false;
        }
        inner.reset(AuthState::Expired);
        info!(generation = inner.generation, "Session expired by upstream");
        true
    }

    async fn is_current(&self, generation: u64) -> bool {
        self.inner.lock().await.generation == generation
    }

    /// Perform the login and record its outcome if the config is still current
    async fn run_login(&self, config: Arc<ConnectionConfig>, generation: u64) -> LoginOutcome {
        let outcome = self.login(&config).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            debug!(generation, "Discarding login outcome for superseded config");
            return outcome;
        }

        inner.login = None;
        match &outcome {
            Ok(token) => {
                inner.state = AuthState::Authenticated;
                inner.token.clone_from(token);
                inner.obtained_at = Some(Instant::now());
                info!(
                    base_url = %config.base_url(),
                    has_token = token.is_some(),
                    "Authenticated with SCADA-LTS"
                );
            }
            Err(e) => {
                inner.reset(AuthState::Unauthenticated);
                warn!(base_url = %config.base_url(), error = %e, "SCADA-LTS login failed");
            }
        }
        outcome
    }

    async fn login(&self, config: &ConnectionConfig) -> LoginOutcome {
        let operation = endpoints::resolve(LOGIN)?;
        let url = operation.url(config.base_url(), &[])?;
        let target = format!("{} {}", operation.method, url.path());

        let body = match (config.username(), config.password()) {
            (Some(username), Some(password)) => {
                json!({ "username": username, "password": password })
            }
            _ => {
                debug!("No credentials configured, attempting guest login");
                json!({})
            }
        };

        let request = self
            .http
            .request(operation.method.as_reqwest(), url)
            .json(&body);
        let response = http::send(request, &target).await?;

        if !response.is_success() {
            let message = if response.body.trim().is_empty() {
                format!("Login rejected with HTTP {}", response.status)
            } else {
                response.body
            };
            return Err(ScadaError::auth_rejected(response.status, message));
        }

        parse_login_token(&response.body)
    }
}

/// Extract the session token from a 2xx login body
///
/// An empty body, or one without a `token` field, is a tokenless session.
fn parse_login_token(body: &str) -> LoginOutcome {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ScadaError::auth(format!("Login response was not valid JSON: {e}")))?;
    Ok(value
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(ToOwned::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    fn manager() -> SessionManager {
        SessionManager::new(reqwest::Client::new())
    }

    fn config() -> ConnectionConfig {
        ConnectionConfig::new("http://127.0.0.1:9/Scada-LTS").expect("valid")
    }

    #[tokio::test]
    async fn unconfigured_lease_is_auth_error() {
        let session = manager();
        let err = session.lease(true).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Auth);
        let err = session.lease(false).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Auth);
        assert_eq!(session.state().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn open_endpoint_lease_needs_no_login() {
        let session = manager();
        session.configure(config()).await;
        let lease = session.lease(false).await.expect("lease");
        assert!(lease.token().is_none());
        assert_eq!(lease.generation(), 1);
        assert_eq!(session.state().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn configure_bumps_generation_and_resets() {
        let session = manager();
        assert_eq!(session.configure(config()).await, 1);
        assert_eq!(session.configure(config()).await, 2);
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.state, AuthState::Unauthenticated);
        assert_eq!(snapshot.generation, 2);
        assert!(!snapshot.has_token);
        assert_eq!(snapshot.base_url.as_deref(), Some("http://127.0.0.1:9/Scada-LTS"));
    }

    #[tokio::test]
    async fn stale_lease_does_not_expire_session() {
        let session = manager();
        session.configure(config()).await;
        let lease = session.lease(false).await.expect("lease");
        session.configure(config()).await;
        assert!(!session.mark_expired(&lease).await);
        assert_eq!(session.state().await, AuthState::Unauthenticated);
    }

    #[test]
    fn login_token_parsing() {
        assert_eq!(parse_login_token("").expect("ok"), None);
        assert_eq!(
            parse_login_token(r#"{"token":"abc"}"#).expect("ok"),
            Some("abc".to_owned())
        );
        assert_eq!(parse_login_token(r#"{"user":"admin"}"#).expect("ok"), None);
        assert_eq!(parse_login_token(r#"{"token":""}"#).expect("ok"), None);
        let err = parse_login_token("<html/>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Auth);
    }

    #[test]
    fn lease_debug_hides_token() {
        let lease = SessionLease {
            config: Arc::new(config()),
            token: Some("secret-token".to_owned()),
            generation: 3,
        };
        let rendered = format!("{lease:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("has_token: true"));
    }
}
