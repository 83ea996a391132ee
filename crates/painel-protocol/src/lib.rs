//! Wire protocol for the painel dashboard client.
//!
//! This crate defines the "language" spoken with the dashboard API:
//!
//! - **Types** ([`LoginRequest`], [`LoginResponse`], [`CurrentUserResponse`],
//!   [`Role`], etc.) — the structures that travel in HTTP bodies.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those structures are
//!   converted to/from bytes, both on the wire and in local storage.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits below the HTTP transport and the session guard.
//! It doesn't know about requests, timers or storage — it only knows what
//! the messages look like.
//!
//! ```text
//! Transport (HTTP bytes) → Protocol (typed messages) → Session (identity)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    CurrentUserResponse, ErrorBody, LoginGrant, LoginRequest, LoginResponse,
    LogoutRequest, Role,
};
