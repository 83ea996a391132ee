//! Unified error type for painel.

use painel_protocol::ProtocolError;
use painel_sequencer::CatalogError;
use painel_session::{SessionError, StorageError};
use painel_transport::ApiError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PainelError {
    /// An API call failed (network, timeout, HTTP status).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A body couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Login failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The auth store couldn't be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The route catalog is invalid.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The configuration file couldn't be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
