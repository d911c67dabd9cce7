//! # Delivery Engine
//!
//! Writes one frame to the peer with bounded retries and exponential
//! backoff: `delay = min(base * 2^attempt, cap)` between attempts.
//!
//! Exhausting the retries yields a typed error rather than a silent drop.
//! The connection handler reacts by closing the connection *without*
//! recording the frame as sent - continuing as if delivery succeeded
//! would desynchronize the session baseline from what the client actually
//! holds, permanently corrupting every later delta for that key.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::sleep;
use tracing::warn;

/// A frame that could not be written within the retry budget.
#[derive(Error, Debug)]
#[error("frame delivery failed after {attempts} attempts: {source}")]
pub struct DeliveryFailed {
    /// Attempts made.
    pub attempts: u32,
    /// The final write error.
    #[source]
    pub source: std::io::Error,
}

/// Retry schedule for frame delivery.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Write attempts per frame, at least 1.
    pub max_retries: u32,
    /// Backoff for the first retry.
    pub base_delay: Duration,
    /// Backoff ceiling.
    pub cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            cap: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after the given zero-based attempt.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.cap)
    }
}

/// Writes `frame` to `writer`, retrying per `policy`.
///
/// # Errors
///
/// [`DeliveryFailed`] carrying the final write error once the retry
/// budget is spent.
pub async fn deliver<W>(
    writer: &mut W,
    frame: &[u8],
    policy: &RetryPolicy,
) -> Result<(), DeliveryFailed>
where
    W: AsyncWrite + Unpin,
{
    let mut last_error = None;
    for attempt in 0..policy.max_retries {
        match write_once(writer, frame).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                warn!(attempt, %err, "frame write failed");
                // Sleep between attempts only; the final failure surfaces
                // immediately.
                if attempt + 1 < policy.max_retries {
                    sleep(policy.backoff(attempt)).await;
                }
                last_error = Some(err);
            }
        }
    }
    Err(DeliveryFailed {
        attempts: policy.max_retries,
        source: last_error
            .unwrap_or_else(|| std::io::Error::other("delivery configured with zero attempts")),
    })
}

async fn write_once<W>(writer: &mut W, frame: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame).await?;
    writer.flush().await
}
