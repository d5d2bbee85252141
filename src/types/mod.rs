//! Core types shared between the mirror, the decoder and the request path.
//!
//! - [`RawNode`] is the untyped structure the shared-memory reader produces
//! - [`Topic`] names the two mirrored shared-memory buffers
//!
//! ```rust
//! use rf2_pitwall::types::{RawNode, RawRecord};
//!
//! let scoring: RawNode = RawRecord::new()
//!     .with("mVersionUpdateBegin", RawNode::int(12))
//!     .with("mVersionUpdateEnd", RawNode::int(12))
//!     .into();
//!
//! assert_eq!(scoring.counter("mVersionUpdateBegin"), Some(12));
//! ```

mod raw;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use raw::{RawNode, RawRecord, Scalar};

/// Shared-memory buffer mirrored by the background reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Scoring,
    Telemetry,
}

impl Topic {
    pub const fn as_str(self) -> &'static str {
        match self {
            Topic::Scoring => "scoring",
            Topic::Telemetry => "telemetry",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
