//! # Ridgeline Server
//!
//! Differential terrain chunk streaming over TCP.
//!
//! ## Architecture
//!
//! One lightweight task per connection, a global admission budget, and a
//! per-connection session remembering the last grid sent for each
//! `(chunk, LOD)` key. Incremental requests diff against that session and
//! ship only what changed; full requests flow through a shared bounded
//! cache of pre-compressed frames.
//!
//! ## Correctness model
//!
//! - Sessions are task-owned and never shared: no locks, and per-
//!   connection FIFO ordering keeps each baseline equal to the payload of
//!   the previous request for the same key.
//! - A session entry is updated only after its frame is delivered;
//!   delivery exhaustion closes the connection instead of silently
//!   desynchronizing server and client state.
//! - Shutdown is cooperative, observed between requests.

#![deny(unsafe_code)]

pub mod cache;
pub mod config;
pub mod connection;
pub mod delivery;
pub mod server;
pub mod session;
pub mod shutdown;

pub use cache::{CachedFull, PayloadCache};
pub use config::{ConfigError, ServerConfig, SourceConfig};
pub use connection::{ConnectionError, ConnectionHandler};
pub use delivery::{deliver, DeliveryFailed, RetryPolicy};
pub use server::StreamServer;
pub use session::{SessionKey, SessionStore};
pub use shutdown::ShutdownHandle;
