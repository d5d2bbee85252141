//! Consistent, typed access to rFactor 2 shared-memory telemetry.
//!
//! The simulator publishes its scoring and telemetry buffers through shared
//! memory. A background reader mirrors them into the process; this crate turns
//! that mirror into documents a caller can serve:
//!
//! - **Decoding**: the raw C-layout mirror becomes a JSON tree, with text
//!   buffers recovered from UTF-8 or Windows-1252
//! - **Snapshots**: reads are bracketed by the buffer's version counters and
//!   retried when torn, falling back to a stale-flagged result
//! - **Typed records**: every domain field is optional, only the write
//!   counters are enforced
//! - **Session view**: per-player sector splits, lap times and speed
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rf2_pitwall::{Endpoint, Pitwall, PitwallConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pitwall = Pitwall::replay("race.jsonl", &PitwallConfig::default()).await?;
//!
//!     let response = pitwall.handle(Endpoint::Session)?;
//!     println!("{}", response.document);
//!
//!     pitwall.shutdown().await;
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod adapters;
pub mod config;
pub mod decode;
mod error;
pub mod snapshot;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Background reader
pub mod driver;
pub mod mirror;
pub mod provider;
pub mod providers;

// Request path
pub mod connection;
pub mod schema;
pub mod session;

// Core exports
pub use config::PitwallConfig;
pub use error::*;
pub use snapshot::{Snapshot, SnapshotReader};
pub use types::{RawNode, RawRecord, Scalar, Topic};

// Main API exports
pub use connection::{Endpoint, Health, Pitwall, Response, Running};
pub use mirror::Mirror;
pub use provider::{MirrorUpdate, Provider};
pub use providers::ReplayProvider;
pub use schema::{Scoring, Telemetry};
pub use session::{Player, Session};
