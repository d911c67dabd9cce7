//! # Connection Handler
//!
//! One client's request/response loop:
//!
//! ```text
//! AwaitingHeader ──▶ Processing ──▶ Sending ──▶ AwaitingHeader
//!       │                                            │
//!       ▼ EOF / short read                           ▼ shutdown flag
//!     Closed                                       Closed
//! ```
//!
//! - EOF or a short read while awaiting a header is a normal disconnect,
//!   not an error.
//! - The data source never fails a connection; absent chunks are zero
//!   grids.
//! - The session entry for a key is updated only after its frame is
//!   delivered, so retry exhaustion closes the connection with the
//!   baseline still matching what the client last received.
//!
//! Requests on one connection are strictly FIFO; the session's baseline
//! for a key is exactly the payload of the previous request for that key.

use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use ridgeline_core::{lod, ChunkSource};
use ridgeline_protocol::{
    encode_frame, ChunkPayload, ChunkRequest, Delta, ProtocolError, REQUEST_HEADER_SIZE,
};

use crate::cache::{CachedFull, PayloadCache};
use crate::delivery::{deliver, DeliveryFailed, RetryPolicy};
use crate::session::{SessionKey, SessionStore};
use crate::shutdown::ShutdownHandle;

/// Why a connection had to be closed abnormally.
///
/// Connection-scoped by construction: a handler logs its own error and
/// dies; no other connection sees it.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Malformed request or unencodable payload.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Frame delivery exhausted its retry budget.
    #[error(transparent)]
    Delivery(#[from] DeliveryFailed),

    /// Transport failure outside a delivery attempt.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a connection task needs, shared pieces included.
pub struct ConnectionHandler {
    source: Arc<dyn ChunkSource>,
    cache: Arc<PayloadCache>,
    policy: RetryPolicy,
    compression_level: u32,
    shutdown: ShutdownHandle,
    session: SessionStore,
}

impl ConnectionHandler {
    /// Creates a handler with a fresh, empty session.
    #[must_use]
    pub fn new(
        source: Arc<dyn ChunkSource>,
        cache: Arc<PayloadCache>,
        policy: RetryPolicy,
        compression_level: u32,
        shutdown: ShutdownHandle,
    ) -> Self {
        Self {
            source,
            cache,
            policy,
            compression_level,
            shutdown,
            session: SessionStore::new(),
        }
    }

    /// Runs the request/response loop until disconnect, error or shutdown.
    ///
    /// A clean disconnect is `Ok`; the session dies with the handler.
    ///
    /// # Errors
    ///
    /// [`ConnectionError`] for anything that forces an abnormal close.
    pub async fn run<S>(mut self, stream: S) -> Result<(), ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (mut reader, mut writer) = tokio::io::split(stream);

        // Shutdown is observed here, between requests, and nowhere else.
        while !self.shutdown.is_triggered() {
            let mut header = [0u8; REQUEST_HEADER_SIZE];
            match reader.read_exact(&mut header).await {
                Ok(_) => {}
                Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("peer disconnected");
                    break;
                }
                Err(err) => return Err(err.into()),
            }

            let request = ChunkRequest::decode(&header)?;
            self.serve(&mut writer, request).await?;
        }

        let _ = writer.shutdown().await;
        Ok(())
    }

    /// Serves one decoded request: fetch, sample, diff, frame, deliver.
    async fn serve<W>(&mut self, writer: &mut W, request: ChunkRequest) -> Result<(), ConnectionError>
    where
        W: AsyncWrite + Unpin,
    {
        let key = SessionKey::new(request.coord, request.lod);
        let native = self.source.fetch(request.coord);
        let sampled = lod::sample(&native, request.lod);

        let baseline = (!request.full)
            .then(|| self.session.last_sent(&key))
            .flatten();

        if let Some(previous) = baseline {
            let delta = Delta::between_grids(previous, &sampled);
            debug!(
                coord = %request.coord,
                lod = %request.lod,
                no_change = delta.is_no_change(),
                "sending delta"
            );
            let frame = encode_frame(&ChunkPayload::Delta(delta), self.compression_level)?;
            deliver(writer, &frame, &self.policy).await?;
            self.session.remember(key, sampled);
            return Ok(());
        }

        // Full payload: either forced by the client or no baseline exists.
        // Full frames are identical for every connection, so they flow
        // through the shared pre-compressed cache.
        let cached = match self.cache.get(&key) {
            Some(hit) => hit,
            None => {
                let frame = encode_frame(
                    &ChunkPayload::Full(sampled.clone()),
                    self.compression_level,
                )?;
                let entry = Arc::new(CachedFull {
                    frame,
                    grid: sampled,
                });
                self.cache.insert(key, Arc::clone(&entry));
                entry
            }
        };
        debug!(
            coord = %request.coord,
            lod = %request.lod,
            bytes = cached.frame.len(),
            "sending full grid"
        );
        deliver(writer, &cached.frame, &self.policy).await?;
        // The session must track the grid that actually went out - which,
        // on a cache hit, can lag the source by up to the cache TTL.
        self.session.remember(key, cached.grid.clone());
        Ok(())
    }
}

/// Logs the outcome of a finished connection task.
pub(crate) fn log_outcome(peer: &str, result: &Result<(), ConnectionError>) {
    match result {
        Ok(()) => info!(peer, "connection closed"),
        Err(err) => info!(peer, %err, "connection closed on error"),
    }
}
