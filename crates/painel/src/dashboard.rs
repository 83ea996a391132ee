//! `Dashboard` builder and handle.
//!
//! Ties the layers together: transport → session guard → sequencer. The
//! sequencer holds the guard as its [`ExpiryGate`](painel_session::ExpiryGate),
//! and every resource fetch is routed through the guard so a 401/403 marks
//! the session expired.

use std::sync::Arc;

use painel_protocol::{Codec, JsonCodec, Role};
use painel_sequencer::{NavigationConfig, Sequencer, StartOutcome};
use painel_session::{Access, AuthStore, SessionGuard};
#[cfg(feature = "http")]
use painel_transport::HttpApi;
use painel_transport::{IdentityApi, ResourceApi};
use serde::de::DeserializeOwned;

use crate::{PainelConfig, PainelError};

/// Builder for a [`Dashboard`].
///
/// # Example
///
/// ```rust,ignore
/// let dashboard = DashboardBuilder::new()
///     .config(PainelConfig::load("painel.toml")?)
///     .build(api, MemoryAuthStore::new())?;
/// ```
#[derive(Debug, Default)]
pub struct DashboardBuilder {
    config: PainelConfig,
}

impl DashboardBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: PainelConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the dashboard over the given API and auth store.
    ///
    /// # Errors
    /// [`PainelError::Catalog`] if the configured route catalog is invalid.
    pub fn build<A: IdentityApi, S: AuthStore>(
        self,
        api: A,
        store: S,
    ) -> Result<Dashboard<A, S>, PainelError> {
        let catalog = self.config.route_catalog()?;
        let guard = Arc::new(SessionGuard::new(api, store, self.config.session_config()));
        let sequencer = Sequencer::new(
            catalog,
            self.config.sequencer_config(),
            Arc::clone(&guard),
        );
        tracing::debug!(categories = sequencer.catalog().len(), "dashboard built");

        Ok(Dashboard {
            guard,
            sequencer,
            navigation: self.config.navigation,
            codec: JsonCodec,
        })
    }

    /// Builds the dashboard over [`HttpApi`] pointed at `[api] base_url`.
    #[cfg(feature = "http")]
    pub fn build_http<S: AuthStore>(self, store: S) -> Result<Dashboard<HttpApi, S>, PainelError> {
        let base_url = self.config.api.base_url.clone();
        self.build_http_at(base_url, store)
    }

    /// Like [`build_http`](Self::build_http), but the API is chosen for the
    /// host the dashboard is served from: `[api] local_base_url` for local
    /// and LAN hosts, `[api] base_url` otherwise.
    #[cfg(feature = "http")]
    pub fn build_http_for_host<S: AuthStore>(
        self,
        host: &str,
        store: S,
    ) -> Result<Dashboard<HttpApi, S>, PainelError> {
        let base_url = self.config.api.base_url_for_host(host).to_string();
        tracing::debug!(%host, %base_url, "api selected for host");
        self.build_http_at(base_url, store)
    }

    #[cfg(feature = "http")]
    fn build_http_at<S: AuthStore>(
        self,
        base_url: String,
        store: S,
    ) -> Result<Dashboard<HttpApi, S>, PainelError> {
        let api = HttpApi::new(base_url, self.config.api.request_timeout())?;
        self.build(api, store)
    }
}

/// A session guard and a sequencer wired to each other.
pub struct Dashboard<A: IdentityApi, S: AuthStore> {
    guard: Arc<SessionGuard<A, S>>,
    sequencer: Sequencer<Arc<SessionGuard<A, S>>>,
    navigation: NavigationConfig,
    codec: JsonCodec,
}

impl<A: IdentityApi, S: AuthStore> Dashboard<A, S> {
    pub fn guard(&self) -> &Arc<SessionGuard<A, S>> {
        &self.guard
    }

    pub fn sequencer(&self) -> &Sequencer<Arc<SessionGuard<A, S>>> {
        &self.sequencer
    }

    /// The selection from `[navigation]`, used when the caller has none.
    pub fn navigation(&self) -> &NavigationConfig {
        &self.navigation
    }

    /// Whether a page requiring `min` may be opened right now.
    pub fn open(&self, min: Role) -> Access {
        self.guard.check_access(min)
    }

    pub fn start_navigation<F>(&self, nav: &NavigationConfig, navigate: F) -> StartOutcome
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.sequencer.start(nav, navigate)
    }

    pub fn stop_navigation(&self) -> bool {
        self.sequencer.stop()
    }

    /// Ends any active run, then logs out.
    pub async fn logout(&self) {
        self.sequencer.stop();
        self.guard.logout().await;
    }
}

impl<A: IdentityApi + ResourceApi, S: AuthStore> Dashboard<A, S> {
    /// `GET path` with the current token, decoded as JSON.
    ///
    /// A 401/403 marks the session expired (acted on when the current run
    /// stops) and is still returned as an error.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, PainelError> {
        let token = self.guard.token();
        let result = self.guard.api().get(path, token.as_deref()).await;
        self.guard.observe(&result);
        let bytes = result?;
        Ok(self.codec.decode(&bytes)?)
    }
}
