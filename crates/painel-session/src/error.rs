//! Error types for the session layer.

use painel_protocol::ProtocolError;

/// Message shown when the server rejects a login without explaining why.
pub(crate) const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Message shown when the login endpoint could not be reached.
pub(crate) const SERVER_UNREACHABLE: &str = "cannot reach the server";

/// Errors surfaced by [`SessionGuard`](crate::SessionGuard).
///
/// Only login reports errors to the caller. Validation problems resolve
/// to "logged out" and logout transport failures are swallowed, so
/// neither ever produces one of these.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server answered and said no. Carries the server's message
    /// verbatim when it sent one.
    #[error("login rejected: {0}")]
    Rejected(String),

    /// The server could not be reached (network error, timeout, or a
    /// response that wasn't the API at all).
    #[error("login failed: {0}")]
    Unreachable(String),

    /// The server accepted the login but the response was unusable.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from an [`AuthStore`](crate::AuthStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading, writing or removing the backing file failed.
    #[error("auth storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record exists but can't be decoded.
    #[error("auth storage is corrupt: {0}")]
    Corrupt(#[from] ProtocolError),
}
