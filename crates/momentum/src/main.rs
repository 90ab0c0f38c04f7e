//! # momentum
//!
//! Momentum tracker server binary: loads settings, wires the session hub
//! and starts the HTTP/WebSocket server.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use momentum_settings::{ClampPolicyMode, MomentumSettings};
use momentum_server::config::ServerConfig;
use momentum_server::hub::{HubConfig, SessionHub};
use momentum_server::server::MomentumServer;
use momentum_server::websocket::broadcast::BroadcastManager;

/// Momentum tracker server.
#[derive(Parser, Debug)]
#[command(name = "momentum", about = "Shared momentum tracker server")]
struct Cli {
    /// Host to bind (overrides settings if specified).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings if specified).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the settings file.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Clamping rules for updates: `baseline` or `capped`.
    #[arg(long)]
    clamp_policy: Option<ClampPolicyMode>,
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings.
    fn apply(&self, settings: &mut MomentumSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(mode) = self.clamp_policy {
            settings.session.clamp_policy = mode;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings_path = args.settings.clone().unwrap_or_else(momentum_settings::settings_path);
    let mut settings = momentum_settings::load_settings_from_path(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    args.apply(&mut settings);

    momentum_core::logging::init_subscriber(&settings.logging.level);
    let metrics_handle =
        momentum_server::metrics::install_recorder().context("Failed to install metrics recorder")?;

    let hub = SessionHub::new(
        HubConfig::from_settings(&settings.session),
        Arc::new(BroadcastManager::new()),
    );
    let config = ServerConfig::from_settings(&settings);
    let server = MomentumServer::new(config, Arc::clone(&hub), metrics_handle);

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!(
        policy = ?settings.session.clamp_policy,
        reclaim_grace_secs = settings.session.reclaim_grace_secs,
        "Momentum server listening on http://{addr}"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!(
        sessions = hub.session_count(),
        pending_reclaims = hub.pending_reclaims(),
        "Shutting down..."
    );
    server.shutdown().graceful_shutdown(vec![handle], None).await;
    hub.shutdown();

    tracing::info!("Shutdown complete");
    Ok(())
}
