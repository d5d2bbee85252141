//! Typed records for the rFactor 2 shared-memory buffers.
//!
//! Field names and meanings follow the rF2 shared-memory map plugin. Every
//! domain field is optional: a field that is missing from a snapshot, or whose
//! shape does not match, is simply `None`. Only the top-level write counters
//! (and the telemetry vehicle count) are enforced, see [`crate::adapters`].

mod common;
mod scoring;
mod telemetry;

pub use common::Vec3;
pub use scoring::{Scoring, ScoringInfo, VehicleScoring};
pub use telemetry::{Telemetry, VehicleTelemetry, Wheel};
