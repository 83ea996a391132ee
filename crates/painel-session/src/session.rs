//! Session types: configuration and what the guard knows about the user.

use std::time::Duration;

use chrono::{DateTime, Utc};
use painel_protocol::Role;
use tracing::warn;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a fresh login stays valid locally before the stored
    /// expiry forces a logout. Default: 8 hours.
    pub ttl: Duration,

    /// Upper bound on a single token validation call. A validation that
    /// takes longer counts as a failure (fail-closed). Default: 15 seconds.
    pub validate_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(8 * 60 * 60),
            validate_timeout: Duration::from_secs(15),
        }
    }
}

impl SessionConfig {
    /// Longest validation timeout accepted before clamping.
    pub const MAX_VALIDATE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`SessionGuard::new`](crate::SessionGuard::new).
    /// Rules:
    /// - a zero `ttl` falls back to the default (a session that is born
    ///   expired is never what the caller meant);
    /// - `validate_timeout` of zero falls back to the default, and anything
    ///   above [`Self::MAX_VALIDATE_TIMEOUT`] is clamped to it.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.ttl.is_zero() {
            warn!("session ttl is zero, using default");
            self.ttl = defaults.ttl;
        }
        if self.validate_timeout.is_zero() {
            warn!("validate_timeout is zero, using default");
            self.validate_timeout = defaults.validate_timeout;
        } else if self.validate_timeout > Self::MAX_VALIDATE_TIMEOUT {
            warn!(
                timeout_secs = self.validate_timeout.as_secs(),
                max_secs = Self::MAX_VALIDATE_TIMEOUT.as_secs(),
                "validate_timeout exceeds maximum, clamping"
            );
            self.validate_timeout = Self::MAX_VALIDATE_TIMEOUT;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Who is logged in, as shown to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub username: String,
    pub role: Role,
}

/// The guard's in-memory record of an authenticated session.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub(crate) token: String,
    pub(crate) username: String,
    pub(crate) role: Role,
    pub(crate) expires_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub(crate) fn info(&self) -> SessionInfo {
        SessionInfo {
            username: self.username.clone(),
            role: self.role,
        }
    }
}
