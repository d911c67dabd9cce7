//! # Ridgeline Daemon
//!
//! The terrain chunk streaming server.
//!
//! ## Usage
//!
//! ```bash
//! ridgelined --config ridgeline.toml
//! ridgelined --bind 0.0.0.0:6000 --seed 42
//! ```
//!
//! `RUST_LOG` controls verbosity (default `info`).

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ridgeline_server::{ServerConfig, SourceConfig, StreamServer};

fn print_help() {
    println!("Usage: ridgelined [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>    TOML config file");
    println!("  -b, --bind <ADDR>      Listen address (default: 0.0.0.0:6000)");
    println!("  -d, --data-dir <PATH>  Serve tiles from a directory");
    println!("  -s, --seed <SEED>      Serve procedural terrain instead");
    println!("  -h, --help             Show this help");
}

fn parse_config(args: &[String]) -> Result<Option<ServerConfig>, String> {
    let mut config = ServerConfig::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(None),
            "--config" | "-c" => {
                let path = args.get(i + 1).ok_or("--config needs a path")?;
                config = ServerConfig::load(path).map_err(|e| e.to_string())?;
                i += 1;
            }
            "--bind" | "-b" => {
                config.bind_addr = args.get(i + 1).ok_or("--bind needs an address")?.clone();
                i += 1;
            }
            "--data-dir" | "-d" => {
                let path = args.get(i + 1).ok_or("--data-dir needs a path")?;
                config.source = SourceConfig::Directory { path: path.into() };
                i += 1;
            }
            "--seed" | "-s" => {
                let seed = args
                    .get(i + 1)
                    .ok_or("--seed needs a value")?
                    .parse()
                    .map_err(|_| "--seed must be an unsigned integer".to_string())?;
                config.source = SourceConfig::Generated { seed };
                i += 1;
            }
            other => return Err(format!("unknown option: {other}")),
        }
        i += 1;
    }
    Ok(Some(config))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match parse_config(&args) {
        Ok(Some(config)) => config,
        Ok(None) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            error!(%message, "bad arguments");
            print_help();
            return ExitCode::from(2);
        }
    };

    let server = match StreamServer::new(config) {
        Ok(server) => server,
        Err(err) => {
            error!(%err, "invalid configuration");
            return ExitCode::from(2);
        }
    };

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("shutdown signal received");
        shutdown.trigger();
    });

    match server.run().await {
        Ok(()) => {
            info!("server stopped");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "server exited abnormally");
            ExitCode::FAILURE
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(err) => {
            error!(%err, "cannot install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
