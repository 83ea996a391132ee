//! Message types exchanged with the dashboard API.
//!
//! Every type here maps one-to-one onto a JSON body the API sends or
//! accepts. Optional fields are `Option<T>` because the API omits them
//! freely (a rejected login has no token, a rejected validation has no
//! user).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Access level of a dashboard user.
///
/// Roles are totally ordered: `Comum < Admin < Ti`. The derive of
/// `PartialOrd`/`Ord` follows declaration order, which matches the
/// numeric levels returned by [`Role::level`].
///
/// On the wire a role is a lowercase string. Anything the client doesn't
/// recognize (a new server-side role, a typo, an empty string) decodes as
/// [`Role::Comum`], the least privileged level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Regular user. Level 1.
    #[default]
    Comum,
    /// Administrator: can upload spreadsheets and manage content. Level 2.
    Admin,
    /// IT staff: everything. Level 3.
    Ti,
}

impl Role {
    /// Numeric level used for role comparisons (`comum=1, admin=2, ti=3`).
    pub fn level(self) -> u8 {
        match self {
            Self::Comum => 1,
            Self::Admin => 2,
            Self::Ti => 3,
        }
    }

    /// Parses a role string, falling back to [`Role::Comum`].
    pub fn parse_lossy(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "ti" => Self::Ti,
            _ => Self::Comum,
        }
    }

    /// The wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comum => "comum",
            Self::Admin => "admin",
            Self::Ti => "ti",
        }
    }

    /// Returns `true` if this role is at least as privileged as `min`.
    pub fn satisfies(self, min: Role) -> bool {
        self.level() >= min.level()
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Self::parse_lossy(&raw)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Body of `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Response of `POST /login`, for both the accepted and rejected case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub token: Option<String>,
    pub user: Option<String>,
    pub role: Option<Role>,
    /// Human-readable reason, present on rejection.
    pub message: Option<String>,
}

/// The part of an accepted login the client keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub token: String,
    pub username: String,
    pub role: Role,
}

impl LoginResponse {
    /// Extracts the grant from an accepted login.
    ///
    /// `fallback_user` is used when the server omits `user` (it echoes the
    /// submitted username in practice, but isn't required to).
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if `success` is false or
    /// the token is missing or empty.
    pub fn into_grant(self, fallback_user: &str) -> Result<LoginGrant, ProtocolError> {
        if !self.success {
            return Err(ProtocolError::InvalidMessage(
                self.message.unwrap_or_else(|| "login not successful".into()),
            ));
        }
        let token = self
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProtocolError::InvalidMessage("login response without token".into()))?;
        Ok(LoginGrant {
            token,
            username: self.user.unwrap_or_else(|| fallback_user.to_string()),
            role: self.role.unwrap_or_default(),
        })
    }
}

// ---------------------------------------------------------------------------
// Logout / current user
// ---------------------------------------------------------------------------

/// Body of `POST /logout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub token: String,
}

impl LogoutRequest {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// Response of `GET /current_user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    #[serde(default)]
    pub logged_in: bool,
    pub user: Option<String>,
    pub role: Option<Role>,
    pub message: Option<String>,
}

/// Error body the API attaches to 4xx/5xx responses.
///
/// Depending on the endpoint the text lives in `message` or in `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    /// The server's explanation, whichever field carried it.
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.trim().is_empty())
    }
}
