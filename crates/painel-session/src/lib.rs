//! Client-side session management for painel.
//!
//! This crate owns the answer to "is the current user authenticated, and
//! with what role":
//!
//! 1. **Storage** — the persisted token/username/role/expiry record
//!    ([`AuthStore`], [`MemoryAuthStore`], [`FileAuthStore`])
//! 2. **Validation** — reconciling that record against the identity
//!    endpoint, fail-closed ([`SessionGuard::initialize`])
//! 3. **Deferred expiry** — recording 401/403 responses without acting on
//!    them until a safe point ([`ExpiryGate`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Sequencer (above)  ← asks the guard what to do when a run stops
//!     ↕
//! Session Layer (this crate)  ← token lifecycle, roles, expired flag
//!     ↕
//! Transport Layer (below)  ← IdentityApi: login, logout, current_user
//! ```

mod auth;
mod error;
mod guard;
mod session;
mod store;

pub use auth::{Access, ExpiryGate};
pub use error::{SessionError, StorageError};
pub use guard::SessionGuard;
pub use session::{SessionConfig, SessionInfo};
pub use store::{AuthKey, AuthRecord, AuthStore, FileAuthStore, MemoryAuthStore};
