//! # Session View
//!
//! A simplified, human-facing projection of the scoring buffer: track and
//! session metadata plus one [`Player`] per vehicle. Views are rebuilt from a
//! fresh scoring snapshot on every request and never fed back into the model.
//!
//! Derived values never fail. Whenever an input field is absent, the fields
//! computed from it are absent too.
//!
//! ```rust
//! use rf2_pitwall::{adapters::FromSnapshot, schema::Scoring, session::Session};
//! use serde_json::json;
//!
//! let scoring = Scoring::from_snapshot(&json!({
//!     "mVersionUpdateBegin": 1,
//!     "mVersionUpdateEnd": 1,
//!     "mBytesUpdatedHint": 0,
//!     "mScoringInfo": { "mSession": 11, "mNumVehicles": 1, "mCurrentET": 90.0 },
//!     "mVehicles": [{ "mLapStartET": 60.0 }],
//! }))
//! .unwrap();
//!
//! let session = Session::new(&scoring, true);
//! assert_eq!(session.session_name, Some("Race2"));
//! assert_eq!(session.players[0].current_lap_time, Some(30.0));
//! ```

mod names;
mod player;

use serde::Serialize;

use crate::schema::Scoring;

pub use names::{UNKNOWN, finish_status_name, session_name};
pub use player::Player;

/// Current session as shown to humans.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The simulator is not paused.
    pub active: bool,
    pub track_name: Option<String>,
    /// Absent when the scoring info carries no session code.
    pub session_name: Option<&'static str>,
    /// meters
    pub lap_distance: Option<f64>,
    pub max_laps: Option<i32>,
    pub raining: Option<f64>,
    /// Celsius
    pub ambient_temp: Option<f64>,
    /// Celsius
    pub track_temp: Option<f64>,
    pub min_path_wetness: Option<f64>,
    pub max_path_wetness: Option<f64>,
    pub players: Vec<Player>,
}

impl Session {
    /// Derive the session view from one scoring snapshot.
    ///
    /// Players are built for the first `mNumVehicles` entries of the vehicle
    /// list, in order; when the count is absent every entry is used.
    pub fn new(scoring: &Scoring, active: bool) -> Self {
        let info = scoring.scoring_info.as_ref();
        let vehicles = scoring.vehicles.as_deref().unwrap_or_default();
        let current_et = info.and_then(|info| info.current_et);

        let count = match info.and_then(|info| info.num_vehicles) {
            Some(count) => usize::try_from(count).unwrap_or(0).min(vehicles.len()),
            None if info.is_some() => vehicles.len(),
            None => 0,
        };

        Self {
            active,
            track_name: info.and_then(|info| info.track_name.clone()),
            session_name: info.and_then(|info| info.session).map(session_name),
            lap_distance: info.and_then(|info| info.lap_dist),
            max_laps: info.and_then(|info| info.max_laps),
            raining: info.and_then(|info| info.raining),
            ambient_temp: info.and_then(|info| info.ambient_temp),
            track_temp: info.and_then(|info| info.track_temp),
            min_path_wetness: info.and_then(|info| info.min_path_wetness),
            max_path_wetness: info.and_then(|info| info.max_path_wetness),
            players: vehicles[..count]
                .iter()
                .map(|vehicle| Player::from_vehicle(vehicle, current_et))
                .collect(),
        }
    }
}
