use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf};
use tokio::net::TcpListener;
use tracing::info;
use weather_core::{Config, WeatherService, provider_from_config, router};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-proxy", version, about = "Weather proxy server")]
pub struct Cli {
    /// Path to a `config.toml`; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// Address to listen on, e.g. "0.0.0.0:8000".
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Look up a city once and print the JSON payload.
    Lookup {
        /// City name, passed to the provider as-is.
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        // Fails before anything is bound when the API key is missing.
        let config = Config::load(self.config.as_deref()).context("Failed to load configuration")?;
        let service = WeatherService::new(provider_from_config(&config)?);

        match self.command.unwrap_or(Command::Serve { bind: None }) {
            Command::Serve { bind } => serve(service, bind.unwrap_or(config.bind)).await,
            Command::Lookup { city } => lookup(service, &city).await,
        }
    }
}

async fn serve(service: WeatherService, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "weather-proxy listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("weather-proxy stopped");
    Ok(())
}

async fn lookup(service: WeatherService, city: &str) -> Result<()> {
    match service.lookup(Some(city)).await {
        Ok(resp) => {
            println!("{}", serde_json::to_string_pretty(&resp)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&e.to_body())?);
            anyhow::bail!("lookup failed with status {}", e.status())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
