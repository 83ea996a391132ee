//! TOML configuration for a painel client.
//!
//! Every section is optional; a missing file section falls back to the
//! defaults of the crate it configures.
//!
//! ```toml
//! [api]
//! base_url = "https://api.technoblade.shop"
//! local_base_url = "http://127.0.0.1:5050"
//! request_timeout_secs = 30
//!
//! [session]
//! ttl_hours = 8
//! validate_timeout_secs = 15
//!
//! [sequencer]
//! debounce_ms = 300
//! login_route = "/login"
//!
//! [navigation]
//! selected_categories = ["Polos", "Ptrac"]
//! interval_secs = 10
//! loop = true
//! selected_sub_items = { Polos = ["955", "921"] }
//!
//! [[catalog]]
//! name = "Polos"
//! sub_items = { "955" = "/itaim", "921" = "/penha" }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use painel_sequencer::{CatalogError, CategoryEntry, NavigationConfig, RouteCatalog, SequencerConfig};
use painel_session::SessionConfig;
use serde::Deserialize;
use tracing::debug;

/// Environment variable that replaces `[api] base_url`.
pub const API_URL_ENV: &str = "PAINEL_API_URL";

/// Errors from loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// `[api]`: where the dashboard API lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Production API.
    pub base_url: String,
    /// API used when the dashboard itself is served from a local host.
    pub local_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.technoblade.shop".to_string(),
            local_base_url: "http://127.0.0.1:5050".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Picks the API for the host the dashboard is served from: the local
    /// API for `localhost`, `127.0.0.1` and `192.168.*`, production
    /// otherwise.
    pub fn base_url_for_host(&self, host: &str) -> &str {
        let host = host.split(':').next().unwrap_or(host);
        if host == "localhost" || host == "127.0.0.1" || host.starts_with("192.168.") {
            &self.local_base_url
        } else {
            &self.base_url
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// `[session]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub ttl_hours: u64,
    pub validate_timeout_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            ttl_hours: defaults.ttl.as_secs() / 3600,
            validate_timeout_secs: defaults.validate_timeout.as_secs(),
        }
    }
}

/// `[sequencer]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SequencerSection {
    pub debounce_ms: u64,
    pub login_route: String,
}

impl Default for SequencerSection {
    fn default() -> Self {
        let defaults = SequencerConfig::default();
        Self {
            debounce_ms: defaults.debounce.as_millis() as u64,
            login_route: defaults.login_route,
        }
    }
}

/// One `[[catalog]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntryConfig {
    pub name: String,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub sub_items: BTreeMap<String, String>,
}

impl From<&CatalogEntryConfig> for CategoryEntry {
    fn from(cfg: &CatalogEntryConfig) -> Self {
        let entry = CategoryEntry::new(cfg.name.clone());
        let entry = match &cfg.route {
            Some(route) => entry.with_route(route.clone()),
            None => entry,
        };
        cfg.sub_items
            .iter()
            .fold(entry, |e, (code, route)| e.with_sub_item(code.clone(), route.clone()))
    }
}

// ---------------------------------------------------------------------------
// PainelConfig
// ---------------------------------------------------------------------------

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PainelConfig {
    pub api: ApiConfig,
    pub session: SessionSection,
    pub sequencer: SequencerSection,
    /// Selection used when nothing else provides one (the kiosk demo).
    pub navigation: NavigationConfig,
    /// Replaces the built-in route catalog when non-empty.
    pub catalog: Vec<CatalogEntryConfig>,
}

impl PainelConfig {
    /// Reads a TOML file, then applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.override_base_url(std::env::var(API_URL_ENV).ok());
        debug!(path = %path.display(), base_url = %config.api.base_url, "config loaded");
        Ok(config)
    }

    /// Parses TOML without touching the environment.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Replaces `api.base_url` when `url` is present and non-blank.
    pub fn override_base_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            debug!(%url, "api base_url overridden from environment");
            self.api.base_url = url;
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            ttl: Duration::from_secs(self.session.ttl_hours.saturating_mul(3600)),
            validate_timeout: Duration::from_secs(self.session.validate_timeout_secs),
        }
    }

    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig {
            debounce: Duration::from_millis(self.sequencer.debounce_ms),
            login_route: self.sequencer.login_route.clone(),
        }
    }

    /// The configured catalog, validated, or the built-in one when the
    /// file declares none.
    pub fn route_catalog(&self) -> Result<RouteCatalog, CatalogError> {
        if self.catalog.is_empty() {
            return Ok(RouteCatalog::default());
        }
        RouteCatalog::new(self.catalog.iter().map(CategoryEntry::from).collect())
    }
}
