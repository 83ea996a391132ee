//! API abstraction layer for painel.
//!
//! Provides the [`IdentityApi`] and [`ResourceApi`] traits that the session
//! guard and the dashboard facade talk to, so neither depends on a concrete
//! HTTP stack. Tests swap in in-memory implementations; production uses
//! [`HttpApi`].
//!
//! # Feature Flags
//!
//! - `http` (default) — HTTP implementation via `reqwest`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "http")]
mod http;

pub use error::ApiError;
#[cfg(feature = "http")]
pub use http::HttpApi;

use std::future::Future;
use std::sync::Arc;

use painel_protocol::{CurrentUserResponse, LoginRequest, LoginResponse};

/// The identity endpoints: login, logout, and token validation.
///
/// Methods return `impl Future + Send` so implementations can be driven
/// from spawned Tokio tasks (the session guard's re-validation loop).
pub trait IdentityApi: Send + Sync + 'static {
    /// `POST /login`. A rejected login may come back either as
    /// `Ok(LoginResponse { success: false, .. })` or as
    /// `Err(ApiError::Status { .. })`, depending on the server.
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// `POST /logout`. Callers treat this as best-effort.
    fn logout(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /current_user` with a bearer token.
    fn current_user(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<CurrentUserResponse, ApiError>> + Send;
}

/// Any other authenticated dashboard endpoint (lists, counters, uploads).
///
/// Returns the raw body; the caller decodes it with whatever type the
/// endpoint serves.
pub trait ResourceApi: Send + Sync + 'static {
    fn get(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send;
}

impl<T: IdentityApi> IdentityApi for Arc<T> {
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send {
        (**self).login(request)
    }

    fn logout(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).logout(token)
    }

    fn current_user(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<CurrentUserResponse, ApiError>> + Send {
        (**self).current_user(token)
    }
}

impl<T: ResourceApi> ResourceApi for Arc<T> {
    fn get(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send {
        (**self).get(path, token)
    }
}

/// Joins a base URL and an endpoint path with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(
            join_url("https://api.technoblade.shop/", "/login"),
            "https://api.technoblade.shop/login"
        );
        assert_eq!(
            join_url("http://127.0.0.1:5050", "current_user"),
            "http://127.0.0.1:5050/current_user"
        );
    }
}
