//! # Stream Server
//!
//! The accept loop tying everything together:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RIDGELINE SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │ accept ─▶ admission permit ─▶ spawn connection task         │
//! │                                   │                         │
//! │                 ┌─────────────────┼──────────────────┐      │
//! │                 ▼                 ▼                  ▼      │
//! │           ChunkSource      SessionStore       PayloadCache  │
//! │           (shared, Arc)    (task-owned)       (shared)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Admission is a counting semaphore acquired *before* `accept()`: when
//! the budget is spent, the accepting task parks and pending peers wait in
//! the OS backlog, while every admitted connection keeps being served. The
//! owned permit moves into the connection task and is released by drop on
//! every exit path.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use ridgeline_core::ChunkSource;

use crate::cache::PayloadCache;
use crate::config::{ConfigError, ServerConfig};
use crate::connection::{log_outcome, ConnectionHandler};
use crate::shutdown::ShutdownHandle;

/// The chunk streaming server.
pub struct StreamServer {
    config: ServerConfig,
    source: Arc<dyn ChunkSource>,
    cache: Arc<PayloadCache>,
    admission: Arc<Semaphore>,
    shutdown: ShutdownHandle,
}

impl StreamServer {
    /// Creates a server from a validated config, building the configured
    /// chunk source.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the config fails validation.
    pub fn new(config: ServerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let source = config.build_source();
        Self::with_source(config, source)
    }

    /// Creates a server around an externally-built chunk source.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the config fails validation.
    pub fn with_source(
        config: ServerConfig,
        source: Arc<dyn ChunkSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let cache = Arc::new(PayloadCache::new(config.cache_capacity, config.cache_ttl()));
        let admission = Arc::new(Semaphore::new(config.max_connections));
        Ok(Self {
            config,
            source,
            cache,
            admission,
            shutdown: ShutdownHandle::new(),
        })
    }

    /// Handle for requesting cooperative shutdown.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Binds the configured address and serves until shutdown.
    ///
    /// # Errors
    ///
    /// Binding failure or a fatal accept-loop error.
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serves connections from an already-bound listener until shutdown.
    ///
    /// # Errors
    ///
    /// A fatal accept-loop error (individual accept failures are logged
    /// and survived).
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        info!(
            addr = %listener.local_addr()?,
            max_connections = self.config.max_connections,
            "listening"
        );

        loop {
            if self.shutdown.is_triggered() {
                info!("shutdown requested, no longer accepting");
                return Ok(());
            }

            // Park here when the budget is spent; a permit frees when any
            // connection task finishes.
            let permit = tokio::select! {
                permit = Arc::clone(&self.admission).acquire_owned() => {
                    match permit {
                        Ok(permit) => permit,
                        // The semaphore is never closed; treat it as shutdown.
                        Err(_) => return Ok(()),
                    }
                }
                () = self.shutdown.triggered() => continue,
            };

            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok(pair) => pair,
                        Err(err) => {
                            warn!(%err, "accept failed");
                            continue;
                        }
                    }
                }
                () = self.shutdown.triggered() => continue,
            };

            if let Err(err) = stream.set_nodelay(true) {
                warn!(%peer, %err, "could not disable Nagle");
            }
            info!(%peer, "connection admitted");

            let handler = ConnectionHandler::new(
                Arc::clone(&self.source),
                Arc::clone(&self.cache),
                self.config.retry_policy(),
                self.config.compression_level,
                self.shutdown.clone(),
            );
            tokio::spawn(async move {
                let result = handler.run(stream).await;
                log_outcome(&peer.to_string(), &result);
                // Admission slot released here, on every exit path.
                drop(permit);
            });
        }
    }
}
