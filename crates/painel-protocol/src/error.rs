//! Error types for the protocol layer.
//!
//! Each crate in painel defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in the shape of a message,
//! not in networking or storage.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: an HTML error page where JSON was expected,
    /// missing required fields, or a truncated body.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded fine but violates the protocol.
    ///
    /// For example, a login response that claims `success: true` but
    /// carries no token.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
