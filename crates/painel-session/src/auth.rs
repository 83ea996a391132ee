//! Access decisions and the expiry hook consumed by the sequencer.

use std::sync::Arc;

/// Outcome of checking whether the current session may open a route.
///
/// Mirrors a protected route: anonymous users go to the login page,
/// authenticated users without the required role go home.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Authenticated with a sufficient role.
    Allowed,
    /// No valid session. Send the user to the login route.
    RedirectLogin,
    /// Authenticated, but the role is below the route's minimum.
    RedirectHome,
}

impl Access {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// The narrow view of the session guard that the sequencer needs.
///
/// The sequencer never decides on its own that a session is over; it asks
/// this gate whenever a run reaches Idle. Keeping it a trait lets the
/// sequencer be tested without an identity API behind it.
pub trait ExpiryGate: Send + Sync + 'static {
    /// Whether a 401/403 has been observed since the last login/logout.
    fn is_expired(&self) -> bool;

    /// If the expired flag is set, clear the local session and the flag
    /// and return `true`. Otherwise do nothing and return `false`.
    ///
    /// Must be synchronous: it runs inside `Sequencer::stop`.
    fn settle_expired(&self) -> bool;
}

impl<T: ExpiryGate> ExpiryGate for Arc<T> {
    fn is_expired(&self) -> bool {
        (**self).is_expired()
    }

    fn settle_expired(&self) -> bool {
        (**self).settle_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_is_allowed_only_for_allowed() {
        assert!(Access::Allowed.is_allowed());
        assert!(!Access::RedirectLogin.is_allowed());
        assert!(!Access::RedirectHome.is_allowed());
    }
}
