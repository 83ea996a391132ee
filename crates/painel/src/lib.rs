//! # Painel
//!
//! Client core for the operations dashboard: who is logged in, and which
//! page the wall display shows next.
//!
//! Two pieces cooperate:
//!
//! - the **session guard** ([`SessionGuard`](painel_session::SessionGuard))
//!   owns the token, validates it fail-closed and records 401/403
//!   responses as a deferred expiry;
//! - the **sequencer** ([`Sequencer`](painel_sequencer::Sequencer)) cycles
//!   through the selected dashboard routes on a timer and, when a run
//!   stops, asks the guard whether to send the user to the login page.
//!
//! [`Dashboard`] wires both together behind one handle.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use painel::prelude::*;
//!
//! # async fn run() -> Result<(), PainelError> {
//! let config = PainelConfig::load("painel.toml")?;
//! let dashboard = DashboardBuilder::new()
//!     .config(config)
//!     .build_http(FileAuthStore::new("auth.json"))?;
//!
//! if !dashboard.guard().initialize().await {
//!     dashboard.guard().login("hiury", "thebest").await?;
//! }
//! let nav = NavigationConfig::default().with_category("Ptrac").with_loop(true);
//! dashboard.start_navigation(&nav, |route| println!("→ {route}"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dashboard;
pub mod error;
pub mod telemetry;

pub use config::{ApiConfig, ConfigError, PainelConfig};
pub use dashboard::{Dashboard, DashboardBuilder};
pub use error::PainelError;

pub mod prelude {
    //! The types most callers need, in one import.

    pub use crate::config::{ApiConfig, PainelConfig};
    pub use crate::dashboard::{Dashboard, DashboardBuilder};
    pub use crate::error::PainelError;
    pub use painel_protocol::Role;
    pub use painel_sequencer::{
        NavigationConfig, RouteCatalog, RunState, SequencerConfig, StartOutcome,
    };
    pub use painel_session::{
        Access, AuthStore, ExpiryGate, FileAuthStore, MemoryAuthStore, SessionConfig,
        SessionGuard, SessionInfo,
    };
    #[cfg(feature = "http")]
    pub use painel_transport::HttpApi;
    pub use painel_transport::{ApiError, IdentityApi, ResourceApi};
}
