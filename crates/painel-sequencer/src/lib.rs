//! Timed auto-navigation for painel.
//!
//! Walks a list of dashboard routes on a timer so a wall display can cycle
//! through pages unattended. The list is derived from what the user picked
//! in the configuration modal ([`NavigationConfig`]) and a validated
//! [`RouteCatalog`].
//!
//! # Run lifecycle
//!
//! ```text
//!           start()                       sequence exhausted, loop off
//!   [Idle] ────────→ [Running] ──────────────────────────────────→ [Idle]
//!      ↑                 │  ↺ sequence exhausted, loop on
//!      │                 │
//!      └── [Stopping] ←──┘ stop()
//! ```
//!
//! Every transition back to Idle asks the session's [`ExpiryGate`] whether a
//! 401/403 was seen during the run. If so, the session is cleared and the
//! navigation callback is sent to the login route.
//!
//! # Integration
//!
//! ```ignore
//! let sequencer = Sequencer::new(RouteCatalog::default(), SequencerConfig::default(), guard);
//! let nav = NavigationConfig::default().with_category("Ptrac").with_loop(true);
//! sequencer.start(&nav, |route| router.push(route));
//! // ... later, from the stop button:
//! sequencer.stop();
//! ```
//!
//! [`ExpiryGate`]: painel_session::ExpiryGate

mod catalog;
mod config;
mod sequencer;

pub use catalog::{CatalogError, CategoryEntry, RouteCatalog};
pub use config::{NavigationConfig, SequencerConfig};
pub use sequencer::{RunState, Sequencer, StartOutcome};
