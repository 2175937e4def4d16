use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gps_serial_bridge::config::{Config, ConfigLoader, LogFormat, LoggingConfig};
use gps_serial_bridge::{serve, AppError, AppResult};

// Command-line arguments. Every flag is optional and overrides the environment.
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Serves the latest fix of a serial GPS receiver over HTTP.",
    long_about = "Reads newline-delimited JSON fixes from a GPS receiver on a serial port and serves the most recent one at GET /location. Configuration comes from PORT, SERIAL_PORT and BAUD_RATE, an optional TOML file, and these flags."
)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP listen port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,

    /// Serial device path (overrides SERIAL_PORT).
    #[arg(short, long)]
    serial_port: Option<String>,

    /// Serial baud rate (overrides BAUD_RATE).
    #[arg(short, long)]
    baud_rate: Option<u32>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(serial_port) = self.serial_port {
            config.serial.port = serial_port;
        }
        if let Some(baud_rate) = self.baud_rate {
            config.serial.baud_rate = baud_rate;
        }
    }
}

// --- Main Application Entry Point ---
#[tokio::main]
async fn main() -> AppResult<()> {
    let args = Args::parse();
    let config = load_config(args)?;
    init_logging(&config.logging)?;

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let result = serve(config, listener, shutdown_signal()).await;
    if let Err(e) = &result {
        error!(error = %e, "bridge stopped");
    }
    result
}

fn load_config(args: Args) -> AppResult<Config> {
    let loader = match args.config.as_ref() {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    let mut config = loader.into_config();
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn init_logging(config: &LoggingConfig) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| AppError::Logging(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    installed.map_err(|e| AppError::Logging(e.to_string()))
}

// --- Graceful Shutdown Handler ---
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("signal received, starting graceful shutdown");
}
