//! The session guard: single source of truth for authentication state.
//!
//! The guard reconciles three things that can disagree:
//! - the persisted record in an [`AuthStore`] (may be stale),
//! - the identity endpoint behind an [`IdentityApi`] (authoritative, but
//!   slow and fallible),
//! - 401/403 responses seen by any other API call (an early hint that the
//!   token died).
//!
//! Every disagreement resolves toward "logged out". That's the fail-closed
//! policy: a session is only ever authenticated when the guard has positive
//! evidence for it.
//!
//! # Concurrency note
//!
//! All methods take `&self`; share the guard with `Arc`. In-memory state
//! sits behind a `std::sync::Mutex` that is never held across an `.await`,
//! and the expired flag is an atomic so the sequencer can read it from a
//! synchronous `stop()`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use painel_protocol::{LoginRequest, Role};
use painel_transport::{ApiError, IdentityApi};
use tokio::task::JoinHandle;
use tokio::time;

use crate::error::{INVALID_CREDENTIALS, SERVER_UNREACHABLE};
use crate::session::Session;
use crate::{
    Access, AuthKey, AuthRecord, AuthStore, ExpiryGate, SessionConfig,
    SessionError, SessionInfo,
};

/// Owns the token lifecycle for one user of the dashboard.
///
/// ## Lifecycle
///
/// ```text
///                 login() ok
///   [Anonymous] ─────────────→ [Authenticated] ──(401/403 seen)──→ expired flag set
///        ↑                          │    │                              │
///        │     initialize() fails   │    │ logout()                     │ settle_expired()
///        ├──────────────────────────┘    │                              │
///        ├───────────────────────────────┘                              │
///        └──────────────────────────────────────────────────────────────┘
/// ```
///
/// Only `login()`, `logout()` and `settle_expired()` lower the expired
/// flag. Dropping to Anonymous through a failed `initialize()` or a lapsed
/// local expiry leaves it raised for the next stop point.
pub struct SessionGuard<A: IdentityApi, S: AuthStore> {
    api: A,
    store: S,
    config: SessionConfig,

    /// `Some` while authenticated.
    state: Mutex<Option<Session>>,

    /// Set by [`on_unauthorized_response`](Self::on_unauthorized_response),
    /// cleared only by login, logout, or a forced logout.
    expired: AtomicBool,
}

impl<A: IdentityApi, S: AuthStore> SessionGuard<A, S> {
    /// Creates a guard. It starts anonymous; call
    /// [`initialize`](Self::initialize) to pick up a stored session.
    pub fn new(api: A, store: S, config: SessionConfig) -> Self {
        Self {
            api,
            store,
            config: config.validated(),
            state: Mutex::new(None),
            expired: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The identity API this guard validates against.
    pub fn api(&self) -> &A {
        &self.api
    }

    fn lock_state(&self) -> MutexGuard<'_, Option<Session>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =====================================================================
    // Validation
    // =====================================================================

    /// Reconciles the stored session with the identity endpoint.
    ///
    /// - No stored token → anonymous, no network call.
    /// - Stored expiry missing, unreadable or past → storage cleared,
    ///   anonymous, no network call.
    /// - Otherwise `GET /current_user`, bounded by
    ///   [`SessionConfig::validate_timeout`]. `logged_in: true` adopts the
    ///   returned user and role; anything else (logged out, HTTP error,
    ///   network error, timeout) clears storage.
    ///
    /// If the stored token changes while the call is in flight (a login
    /// happened meanwhile), the stale result is discarded.
    ///
    /// Returns whether the guard is authenticated afterwards.
    pub async fn initialize(&self) -> bool {
        let record = match self.store.load() {
            Ok(Some(record)) => record,
            Ok(None) => {
                *self.lock_state() = None;
                tracing::debug!("no stored session");
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored session unreadable, clearing");
                self.clear_local();
                return false;
            }
        };

        let Some(expires_at) = record.expires_at.filter(|exp| Utc::now() < *exp) else {
            tracing::info!(username = %record.username, "stored session expired locally");
            self.clear_local();
            return false;
        };

        let outcome = time::timeout(
            self.config.validate_timeout,
            self.api.current_user(&record.token),
        )
        .await;

        let mut state = self.lock_state();

        match self.store.get(AuthKey::Token) {
            Ok(Some(current)) if current == record.token => {}
            _ => {
                tracing::debug!("token changed during validation, discarding result");
                return state.as_ref().is_some_and(|s| s.is_live(Utc::now()));
            }
        }

        let rejection = match outcome {
            Ok(Ok(resp)) if resp.logged_in => {
                let session = Session {
                    token: record.token.clone(),
                    username: resp.user.unwrap_or(record.username),
                    role: resp.role.unwrap_or(record.role),
                    expires_at,
                };
                let adopted = AuthRecord {
                    token: session.token.clone(),
                    username: session.username.clone(),
                    role: session.role,
                    expires_at: Some(expires_at),
                };
                if let Err(e) = self.store.save(&adopted) {
                    tracing::warn!(error = %e, "failed to refresh stored session");
                }
                tracing::info!(
                    username = %session.username,
                    role = %session.role,
                    "session validated"
                );
                *state = Some(session);
                return true;
            }
            Ok(Ok(resp)) => resp
                .message
                .unwrap_or_else(|| "identity endpoint reports logged out".into()),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "validation timed out after {:?}",
                self.config.validate_timeout
            ),
        };

        tracing::info!(reason = %rejection, "session validation failed, logging out");
        *state = None;
        self.clear_store();
        false
    }

    /// Spawns a task that re-runs [`initialize`](Self::initialize) every
    /// `every`, starting one period from now.
    ///
    /// Abort the returned handle to stop it.
    pub fn spawn_revalidation(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let guard = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + every, every);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                guard.initialize().await;
            }
        })
    }

    // =====================================================================
    // Login / logout
    // =====================================================================

    /// Logs in and persists the session with an expiry of
    /// [`SessionConfig::ttl`] from now.
    ///
    /// A failed login leaves any existing session untouched.
    ///
    /// # Errors
    /// - [`SessionError::Rejected`] — the server refused; carries its
    ///   message, or a generic one if it sent none
    /// - [`SessionError::Unreachable`] — network error, timeout, or a
    ///   response that couldn't be decoded
    /// - [`SessionError::Protocol`] — accepted, but without a token
    /// - [`SessionError::Storage`] — the session couldn't be persisted
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionInfo, SessionError> {
        let request = LoginRequest::new(username, password);
        let response = self.api.login(&request).await.map_err(classify_login_error)?;

        if !response.success {
            let message = response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| INVALID_CREDENTIALS.to_string());
            tracing::info!(%username, %message, "login rejected");
            return Err(SessionError::Rejected(message));
        }

        let grant = response.into_grant(username)?;
        let ttl = TimeDelta::from_std(self.config.ttl).unwrap_or_else(|_| TimeDelta::hours(8));
        let session = Session {
            token: grant.token,
            username: grant.username,
            role: grant.role,
            expires_at: Utc::now() + ttl,
        };

        let mut state = self.lock_state();
        self.store.save(&AuthRecord {
            token: session.token.clone(),
            username: session.username.clone(),
            role: session.role,
            expires_at: Some(session.expires_at),
        })?;
        self.expired.store(false, Ordering::SeqCst);
        let info = session.info();
        *state = Some(session);

        tracing::info!(username = %info.username, role = %info.role, "login succeeded");
        Ok(info)
    }

    /// Logs out. Always succeeds locally.
    ///
    /// The server is told first, best-effort; a failure there is logged and
    /// ignored. Then the stored record, the in-memory session and the
    /// expired flag are all cleared.
    pub async fn logout(&self) {
        if let Some(token) = self.token() {
            if let Err(e) = self.api.logout(&token).await {
                tracing::warn!(error = %e, "logout request failed, clearing local session anyway");
            }
        }
        self.clear_local();
        self.expired.store(false, Ordering::SeqCst);
        tracing::info!("logged out");
    }

    /// Clears every trace of the session without calling the server.
    fn clear_local(&self) {
        *self.lock_state() = None;
        self.clear_store();
    }

    /// Storage only. The expired flag survives until a login, a logout or
    /// a stop point settles it.
    fn clear_store(&self) {
        if let Err(e) = self.store.clear_auth() {
            tracing::warn!(error = %e, "failed to clear stored session");
        }
    }

    // =====================================================================
    // Unauthorized responses
    // =====================================================================

    /// Records that some API call came back 401/403.
    ///
    /// Only raises the expired flag. The session is cleared later, when
    /// the sequencer reaches a stop point and calls
    /// [`settle_expired`](ExpiryGate::settle_expired).
    pub fn on_unauthorized_response(&self) {
        if !self.expired.swap(true, Ordering::SeqCst) {
            tracing::warn!("api reported unauthorized, session marked expired");
        }
    }

    /// Routes an API result through the guard: a 401/403 error raises the
    /// expired flag. The result itself is returned untouched.
    pub fn observe<'r, T>(&self, result: &'r Result<T, ApiError>) -> &'r Result<T, ApiError> {
        if let Err(e) = result {
            if e.is_unauthorized() {
                self.on_unauthorized_response();
            }
        }
        result
    }

    // =====================================================================
    // Queries
    // =====================================================================

    /// Whether the user is logged in right now.
    ///
    /// A session whose local expiry has passed is cleared on the spot.
    pub fn is_authenticated(&self) -> bool {
        let mut state = self.lock_state();
        match state.as_ref() {
            Some(session) if session.is_live(Utc::now()) => true,
            Some(session) => {
                tracing::info!(username = %session.username, "session expired locally");
                *state = None;
                self.clear_store();
                false
            }
            None => false,
        }
    }

    /// Whether the current role is at least `min`. Always `false` when
    /// logged out.
    pub fn has_role(&self, min: Role) -> bool {
        self.role().is_some_and(|role| role.satisfies(min))
    }

    /// Decides whether a route requiring `min` may be opened.
    pub fn check_access(&self, min: Role) -> Access {
        match self.role() {
            None => Access::RedirectLogin,
            Some(role) if role.satisfies(min) => Access::Allowed,
            Some(_) => Access::RedirectHome,
        }
    }

    /// The current role, if authenticated.
    pub fn role(&self) -> Option<Role> {
        self.session().map(|info| info.role)
    }

    /// Who is logged in, if anyone.
    pub fn session(&self) -> Option<SessionInfo> {
        if !self.is_authenticated() {
            return None;
        }
        self.lock_state().as_ref().map(Session::info)
    }

    /// The current token, if authenticated.
    pub fn token(&self) -> Option<String> {
        if !self.is_authenticated() {
            return None;
        }
        self.lock_state().as_ref().map(|s| s.token.clone())
    }

    /// `Authorization` header value for the current token.
    pub fn bearer_header(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {t}"))
    }
}

impl<A: IdentityApi, S: AuthStore> ExpiryGate for SessionGuard<A, S> {
    fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    fn settle_expired(&self) -> bool {
        if !self.expired.swap(false, Ordering::SeqCst) {
            return false;
        }
        tracing::info!("deferred expiry reached a stop point, forcing logout");
        self.clear_local();
        true
    }
}

/// Maps a transport failure on `POST /login` to what the user should see.
fn classify_login_error(err: ApiError) -> SessionError {
    match err {
        ApiError::Status { message, status } => {
            tracing::info!(status, ?message, "login rejected by server");
            SessionError::Rejected(message.unwrap_or_else(|| INVALID_CREDENTIALS.to_string()))
        }
        other => {
            tracing::warn!(error = %other, "login endpoint unreachable");
            SessionError::Unreachable(SERVER_UNREACHABLE.to_string())
        }
    }
}
