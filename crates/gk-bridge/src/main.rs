//! Gatekeeper daemon
//!
//! Connects to an OpenVPN management interface and answers client
//! authentication requests.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gk_bridge::auth::checkers;
use gk_bridge::{AuthMiddleware, ManagementClient, ManagementSession, StateTracker};
use gk_core::config::{self, GatekeeperConfig};
use gk_core::traits::Middleware;

#[derive(Parser)]
#[command(name = "gatekeeper")]
#[command(about = "OpenVPN management-interface authentication bridge")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "GATEKEEPER_CONFIG")]
    config: Option<PathBuf>,

    /// Management interface address (overrides config)
    #[arg(short, long)]
    management: Option<String>,

    /// Run in foreground with verbose output
    #[arg(short, long)]
    foreground: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.foreground { "debug" } else { &args.log_level };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Gatekeeper starting...");

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        config::load_config(config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        let default_path = config::default_config_path();
        if default_path.exists() {
            config::load_config(&default_path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
                GatekeeperConfig::default()
            })
        } else {
            tracing::info!("Using default configuration");
            GatekeeperConfig::default()
        }
    };

    if let Some(address) = args.management {
        config.management.address = address;
    }
    config.validate().context("Invalid configuration")?;

    let checker = checkers::from_config(&config.verifier).context("Failed to set up verifier")?;
    tracing::info!("Using {:?} credential verifier", config.verifier.kind);

    let middlewares: Vec<Box<dyn Middleware>> = vec![
        Box::new(AuthMiddleware::new(checker)?),
        Box::new(StateTracker::new()?),
    ];
    let mut client =
        ManagementClient::new(config.management.clone(), ManagementSession::new(middlewares));

    // Create cancellation token for graceful shutdown
    let cancel = CancellationToken::new();

    // Setup signal handlers
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
        }

        cancel_clone.cancel();
    });

    client.run(cancel).await?;

    tracing::info!("Gatekeeper shutdown complete");
    Ok(())
}
