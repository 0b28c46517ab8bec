//! # Session Manager
//!
//! JWT session lifecycle: login, silent refresh, keep-alive, logout.
//!
//! ## Session States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Session State Machine                             │
//! │                                                                         │
//! │                    login ok                                             │
//! │  ┌───────────────┐ ────────► ┌───────────────┐                         │
//! │  │Unauthenticated│           │ Authenticated │ ◄────────┐              │
//! │  └───────────────┘ ◄──────── └───────┬───────┘          │              │
//! │        ▲             logout          │ exp reached      │ refresh ok   │
//! │        │                             ▼                  │              │
//! │        │                     ┌───────────────┐          │              │
//! │        └──────────────────── │  Refreshing   │ ─────────┘              │
//! │          refresh failed      └───────────────┘                         │
//! │          (terminal for this session: new login required)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Token Handling
//! The client decodes claims (`exp`, identity) without verifying the
//! signature; the backend owns the secret and is the only verifier. An
//! expired `exp` triggers exactly one refresh before any authenticated
//! call proceeds; refresh failure clears the session and signals the UI
//! through [`SessionEvents`].

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use keylimar_core::types::Role;
use keylimar_core::validation::validate_credentials;
use keylimar_core::CoreError;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::store::{TokenPair, TokenStore};

// =============================================================================
// Claims
// =============================================================================

/// Claims the backend embeds in the access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub job_position: String,
    #[serde(default)]
    pub is_superuser: bool,
    /// Expiry as unix epoch seconds.
    pub exp: i64,
}

impl SessionClaims {
    pub fn is_expired_at(&self, now_epoch_secs: i64) -> bool {
        self.exp <= now_epoch_secs
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// The effective role; superusers act as admins regardless of the
    /// job-position string.
    pub fn role(&self) -> ApiResult<Role> {
        if self.is_superuser {
            return Ok(Role::Admin);
        }
        self.job_position
            .parse()
            .map_err(|e| ApiError::Rule(CoreError::Validation(e)))
    }
}

/// Decodes claims from a token without signature verification.
///
/// The client never holds the signing secret; it only needs `exp` and the
/// identity claims for local decisions. Authorization remains server-side.
pub fn decode_claims(token: &str) -> ApiResult<SessionClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let data = decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

// =============================================================================
// Session Events
// =============================================================================

/// Sink for out-of-band session signals.
///
/// The UI injects an implementation that routes to the login screen;
/// nothing in this crate knows what navigation means.
pub trait SessionEvents: Send + Sync {
    /// The session became unusable (refresh failure, backend 401/403).
    fn session_invalidated(&self, reason: &str);
}

/// No-op sink for tests and headless use.
pub struct NoOpSessionEvents;

impl SessionEvents for NoOpSessionEvents {
    fn session_invalidated(&self, _reason: &str) {}
}

// =============================================================================
// Session State
// =============================================================================

/// Observable phase of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Authenticated,
    Refreshing,
}

#[derive(Debug, Clone)]
struct ActiveSession {
    tokens: TokenPair,
    claims: SessionClaims,
}

#[derive(Debug)]
enum SessionState {
    Unauthenticated,
    Authenticated(ActiveSession),
    /// Tokens kept while the refresh request is in flight.
    Refreshing(ActiveSession),
}

// =============================================================================
// Wire DTOs
// =============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Both tokens optional: a 2xx body missing either is treated as a failed
/// login, not a decode error.
#[derive(Deserialize)]
struct LoginResponse {
    access: Option<String>,
    refresh: Option<String>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    /// Present when the backend rotates refresh tokens.
    refresh: Option<String>,
}

#[derive(Serialize)]
struct LogoutRequest<'a> {
    refresh: &'a str,
}

// =============================================================================
// Session Manager
// =============================================================================

/// Maintains a valid bearer token for API calls, re-authenticating
/// transparently when possible.
pub struct SessionManager {
    config: ClientConfig,
    http: reqwest::Client,
    store: Arc<dyn TokenStore>,
    events: Arc<dyn SessionEvents>,
    state: RwLock<SessionState>,
}

impl SessionManager {
    /// Creates a session manager with no event sink.
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> ApiResult<Self> {
        Self::with_events(config, store, Arc::new(NoOpSessionEvents))
    }

    /// Creates a session manager with an injected event sink.
    pub fn with_events(
        config: ClientConfig,
        store: Arc<dyn TokenStore>,
        events: Arc<dyn SessionEvents>,
    ) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(SessionManager {
            config,
            http,
            store,
            events,
            state: RwLock::new(SessionState::Unauthenticated),
        })
    }

    /// Current phase of the state machine.
    pub async fn phase(&self) -> SessionPhase {
        match &*self.state.read().await {
            SessionState::Unauthenticated => SessionPhase::Unauthenticated,
            SessionState::Authenticated(_) => SessionPhase::Authenticated,
            SessionState::Refreshing(_) => SessionPhase::Refreshing,
        }
    }

    /// Claims of the active session, or `NoSession`.
    pub async fn claims(&self) -> ApiResult<SessionClaims> {
        match &*self.state.read().await {
            SessionState::Authenticated(s) | SessionState::Refreshing(s) => {
                Ok(s.claims.clone())
            }
            SessionState::Unauthenticated => Err(ApiError::NoSession),
        }
    }

    /// Restores a session from persisted tokens at startup.
    ///
    /// Returns `Ok(true)` when tokens were found and decoded. An
    /// undecodable stored token is wiped rather than left to poison every
    /// subsequent call.
    pub async fn restore(&self) -> ApiResult<bool> {
        let Some(tokens) = self.store.load()? else {
            return Ok(false);
        };

        match decode_claims(&tokens.access) {
            Ok(claims) => {
                info!(username = %claims.username, "session restored from storage");
                *self.state.write().await =
                    SessionState::Authenticated(ActiveSession { tokens, claims });
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "stored access token undecodable, clearing");
                self.store.clear()?;
                Ok(false)
            }
        }
    }

    /// Authenticates with the backend.
    ///
    /// Returns `Ok(false)` on bad credentials or a success body missing
    /// either token; `Err` only on transport-level failure. Tokens and
    /// decoded claims are persisted on success.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<bool> {
        validate_credentials(username, password)
            .map_err(|e| ApiError::Rule(CoreError::Validation(e)))?;

        let url = self.config.endpoint("auth/login/")?;
        let response = self
            .http
            .post(url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::BAD_REQUEST
        {
            info!(username, "login rejected by backend");
            return Ok(false);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: LoginResponse = response.json().await?;
        let (Some(access), Some(refresh)) = (body.access, body.refresh) else {
            warn!("login response missing tokens");
            return Ok(false);
        };

        let claims = decode_claims(&access)?;
        let tokens = TokenPair { access, refresh };
        self.store.save(&tokens)?;

        info!(username = %claims.username, job_position = %claims.job_position, "login ok");
        *self.state.write().await =
            SessionState::Authenticated(ActiveSession { tokens, claims });
        Ok(true)
    }

    /// Returns an access token whose `exp` is still in the future,
    /// refreshing silently when needed.
    ///
    /// An expired token triggers exactly one refresh attempt; concurrent
    /// callers wait on the state lock and reuse its result. Refresh
    /// failure is terminal for the session.
    pub async fn get_valid_access_token(&self) -> ApiResult<String> {
        // Fast path without the write lock.
        {
            match &*self.state.read().await {
                SessionState::Authenticated(s) if !s.claims.is_expired() => {
                    return Ok(s.tokens.access.clone());
                }
                SessionState::Unauthenticated => return Err(ApiError::NoSession),
                _ => {}
            }
        }

        let mut guard = self.state.write().await;

        // Double-check after acquiring the write lock: another caller may
        // have completed the refresh while we waited.
        let session = match &*guard {
            SessionState::Authenticated(s) if !s.claims.is_expired() => {
                return Ok(s.tokens.access.clone());
            }
            SessionState::Authenticated(s) | SessionState::Refreshing(s) => s.clone(),
            SessionState::Unauthenticated => return Err(ApiError::NoSession),
        };

        debug!("access token expired, refreshing");
        *guard = SessionState::Refreshing(session.clone());

        match self.do_refresh(&session.tokens).await {
            Ok((tokens, claims)) => {
                self.store.save(&tokens)?;
                let access = tokens.access.clone();
                info!(exp = claims.exp, "access token refreshed");
                *guard = SessionState::Authenticated(ActiveSession { tokens, claims });
                Ok(access)
            }
            Err(e) => {
                // Fatal for this session: wipe everything, tell the UI.
                *guard = SessionState::Unauthenticated;
                if let Err(store_err) = self.store.clear() {
                    warn!(error = %store_err, "failed to clear token store");
                }
                warn!(error = %e, "token refresh failed, session invalidated");
                self.events.session_invalidated(&e.to_string());
                Err(ApiError::SessionExpired(e.to_string()))
            }
        }
    }

    /// Posts the refresh token; any failure here is session-fatal.
    async fn do_refresh(&self, current: &TokenPair) -> ApiResult<(TokenPair, SessionClaims)> {
        let url = self.config.endpoint("auth/token/refresh/")?;
        let response = self
            .http
            .post(url)
            .json(&RefreshRequest {
                refresh: &current.refresh,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::SessionExpired(format!(
                "refresh rejected with status {}",
                status.as_u16()
            )));
        }

        let body: RefreshResponse = response.json().await?;
        let claims = decode_claims(&body.access)?;
        let tokens = TokenPair {
            access: body.access,
            // Keep the old refresh token unless the backend rotated it.
            refresh: body.refresh.unwrap_or_else(|| current.refresh.clone()),
        };
        Ok((tokens, claims))
    }

    /// Pings an authenticated endpoint to keep the backend session warm.
    pub async fn ping(&self) -> ApiResult<()> {
        let token = self.get_valid_access_token().await?;
        let url = self.config.endpoint("auth/ping/")?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Api {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// Marks the session invalid from the outside (the API client's
    /// 401/403 handler). Clears storage and notifies the event sink.
    pub(crate) async fn invalidate(&self, reason: &str) {
        *self.state.write().await = SessionState::Unauthenticated;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear token store");
        }
        warn!(reason, "session invalidated");
        self.events.session_invalidated(reason);
    }

    /// Logs out: best-effort server-side revocation, then an unconditional
    /// local wipe. The local wipe happens even when the server call fails.
    pub async fn logout(&self) {
        let tokens = match &*self.state.read().await {
            SessionState::Authenticated(s) | SessionState::Refreshing(s) => {
                Some(s.tokens.clone())
            }
            SessionState::Unauthenticated => None,
        };

        if let Some(pair) = tokens {
            match self.config.endpoint("auth/logout/") {
                Ok(url) => {
                    let result = self
                        .http
                        .post(url)
                        .bearer_auth(&pair.access)
                        .json(&LogoutRequest {
                            refresh: &pair.refresh,
                        })
                        .send()
                        .await;
                    if let Err(e) = result {
                        debug!(error = %e, "server-side logout failed (ignored)");
                    }
                }
                Err(e) => debug!(error = %e, "logout URL invalid (ignored)"),
            }
        }

        *self.state.write().await = SessionState::Unauthenticated;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear token store on logout");
        }
        info!("logged out");
    }

    // =========================================================================
    // Keep-Alive
    // =========================================================================

    /// Spawns the keep-alive task: every ping interval while a session is
    /// active, check expiry (refreshing if needed) and ping the backend.
    /// Ping errors are swallowed; liveness is best-effort only.
    pub fn spawn_keepalive(self: &Arc<Self>) -> KeepaliveHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let session = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(session.config.ping_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval fires immediately; the first real ping waits a period
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if session.phase().await == SessionPhase::Unauthenticated {
                            continue;
                        }
                        match session.ping().await {
                            Ok(()) => debug!("keep-alive ping ok"),
                            Err(e) => warn!(error = %e, "keep-alive ping failed (ignored)"),
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("keep-alive task stopped");
                        break;
                    }
                }
            }
        });

        KeepaliveHandle { shutdown_tx }
    }
}

/// Handle for stopping the keep-alive task on teardown.
pub struct KeepaliveHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl KeepaliveHandle {
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
