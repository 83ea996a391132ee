//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The HTTP transport and the file-backed auth store both need to turn
//! typed values into bytes and back. Neither cares HOW — they hold
//! something that implements [`Codec`]. Today that is always
//! [`JsonCodec`], because the dashboard API speaks JSON.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because codecs are stored inside clients that
/// are shared across Tokio tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use painel_protocol::{Codec, JsonCodec, LoginRequest};
///
/// let codec = JsonCodec;
/// let req = LoginRequest::new("hiury", "thebest");
///
/// let bytes = codec.encode(&req).unwrap();
/// let decoded: LoginRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(req, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::CurrentUserResponse;

    #[test]
    fn test_decode_malformed_bytes_returns_decode_error() {
        let result: Result<CurrentUserResponse, _> =
            JsonCodec.decode(b"<html>502 Bad Gateway</html>");

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_produces_plain_json_object() {
        let bytes = JsonCodec
            .encode(&crate::LogoutRequest::new("abc"))
            .unwrap();

        assert_eq!(bytes, br#"{"token":"abc"}"#);
    }
}
