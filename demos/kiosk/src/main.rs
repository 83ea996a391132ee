//! Wall-display kiosk: logs in, then prints each route the sequencer
//! navigates to until Ctrl-C.
//!
//! ```text
//! PAINEL_USER=hiury PAINEL_PASSWORD=... cargo run -p kiosk -- demos/kiosk/painel.toml
//! ```
//!
//! `PAINEL_HOST` names the host the kiosk is served from; a local or LAN
//! host switches to `[api] local_base_url`.

use std::time::Duration;

use painel::prelude::*;
use painel::telemetry;

const REVALIDATE_EVERY: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing("info,painel_sequencer=debug");

    let config = match std::env::args().nth(1) {
        Some(path) => PainelConfig::load(path)?,
        None => PainelConfig::default(),
    };
    let builder = DashboardBuilder::new().config(config);
    let store = FileAuthStore::new("kiosk-auth.json");
    let dashboard = match std::env::var("PAINEL_HOST") {
        Ok(host) => builder.build_http_for_host(&host, store)?,
        Err(_) => builder.build_http(store)?,
    };
    let guard = dashboard.guard();

    if !guard.initialize().await {
        let user = std::env::var("PAINEL_USER")?;
        let password = std::env::var("PAINEL_PASSWORD")?;
        guard.login(&user, &password).await?;
    }
    if let Some(info) = guard.session() {
        tracing::info!(username = %info.username, role = %info.role, "kiosk session ready");
    }
    let revalidation = guard.spawn_revalidation(REVALIDATE_EVERY);

    let nav = dashboard.navigation().clone();
    match dashboard.start_navigation(&nav, |route| println!("→ {route}")) {
        StartOutcome::Started { routes } => {
            tracing::info!(?routes, "cycling");
        }
        other => {
            tracing::warn!(outcome = ?other, "nothing to show, check [navigation]");
            revalidation.abort();
            return Ok(());
        }
    }

    tokio::signal::ctrl_c().await?;
    dashboard.stop_navigation();
    revalidation.abort();
    Ok(())
}
