//! Binding of decoded snapshot trees onto typed records.
//!
//! The binder is deliberately asymmetric:
//! - **Required counters** (`mVersionUpdateBegin`, `mVersionUpdateEnd`,
//!   `mBytesUpdatedHint`, and `mNumVehicles` for telemetry) must be present and
//!   correctly typed, or the snapshot fails with a validation error
//! - **Everything else** is optional and resolves to `None` when missing or
//!   mistyped, recursing into nested records and sequences
//!
//! # Example Usage
//!
//! ```rust
//! use rf2_pitwall::{adapters::FromSnapshot, schema::Scoring};
//! use serde_json::json;
//!
//! let value = json!({
//!     "mVersionUpdateBegin": 3,
//!     "mVersionUpdateEnd": 3,
//!     "mBytesUpdatedHint": 128,
//!     "mScoringInfo": { "mTrackName": "Spa", "mSession": "race" },
//! });
//!
//! let scoring = Scoring::from_snapshot(&value).unwrap();
//! let info = scoring.scoring_info.unwrap();
//! assert_eq!(info.track_name.as_deref(), Some("Spa"));
//! assert_eq!(info.session, None);
//! ```

mod bind;
mod record;
mod validation;

use serde_json::Value;

use crate::Result;
use crate::types::Topic;

pub use bind::{Bind, shape_of};
pub use validation::Fields;

/// A top-level record bound from one shared-memory buffer.
pub trait FromSnapshot: Sized {
    /// Buffer this record is read from.
    const TOPIC: Topic;

    /// Bind a decoded snapshot, failing only on required fields.
    fn from_snapshot(value: &Value) -> Result<Self>;
}

/// Records carrying the simulator's write counters.
pub trait VersionedBlock {
    fn version_begin(&self) -> u32;
    fn version_end(&self) -> u32;
    fn bytes_updated_hint(&self) -> i32;

    /// Whether the counters describe a completed write.
    fn is_consistent(&self) -> bool {
        self.version_begin() == self.version_end()
    }
}
