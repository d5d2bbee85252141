//! Scoring buffer layout (`$rFactor2SMMP_Scoring$`)

use serde::Serialize;
use serde_json::Value;

use super::Vec3;
use crate::adapters::{Fields, FromSnapshot, VersionedBlock};
use crate::snapshot::{BYTES_UPDATED_HINT, VERSION_BEGIN, VERSION_END};
use crate::types::Topic;
use crate::Result;

crate::record! {
    /// Track, session, weather and server state.
    pub struct ScoringInfo {
        "mTrackName" => track_name: String,
        /// 0=testday, 1-4=practice, 5-8=qual, 9=warmup, 10-13=race
        "mSession" => session: i32,
        "mCurrentET" => current_et: f64,
        "mEndET" => end_et: f64,
        "mMaxLaps" => max_laps: i32,
        /// meters around the track
        "mLapDist" => lap_dist: f64,
        "pointer1" => pointer1: Vec<u8>,

        "mNumVehicles" => num_vehicles: i32,
        "mGamePhase" => game_phase: u8,
        /// Full-course yellow state, a single char in the layout
        "mYellowFlagState" => yellow_flag_state: String,
        /// Local yellows per sector
        "mSectorFlag" => sector_flag: Vec<i8>,
        "mStartLight" => start_light: u8,
        "mNumRedLights" => num_red_lights: u8,
        "mInRealtime" => in_realtime: bool,
        "mPlayerName" => player_name: String,
        "mPlrFileName" => plr_file_name: String,

        "mDarkCloud" => dark_cloud: f64,
        "mRaining" => raining: f64,
        /// Celsius
        "mAmbientTemp" => ambient_temp: f64,
        /// Celsius
        "mTrackTemp" => track_temp: f64,
        "mWind" => wind: Vec3,
        "mMinPathWetness" => min_path_wetness: f64,
        "mMaxPathWetness" => max_path_wetness: f64,

        /// 1=server, 2=client, 3=server and client
        "mGameMode" => game_mode: u8,
        "mIsPasswordProtected" => is_password_protected: bool,
        "mServerPort" => server_port: u16,
        "mServerPublicIP" => server_public_ip: u32,
        "mMaxPlayers" => max_players: i32,
        "mServerName" => server_name: String,
        /// Seconds since midnight
        "mStartET" => start_et: f64,
        "mAvgPathWetness" => avg_path_wetness: f64,

        "mExpansion" => expansion: Vec<u8>,
        "pointer2" => pointer2: Vec<u8>,
    }
}

crate::record! {
    /// Timing, position and control state of one vehicle.
    pub struct VehicleScoring {
        "mID" => id: i32,
        "mDriverName" => driver_name: String,
        "mVehicleName" => vehicle_name: String,
        "mTotalLaps" => total_laps: i32,
        /// 0=sector3, 1=sector1, 2=sector2
        "mSector" => sector: i8,
        /// 0=none, 1=finished, 2=dnf, 3=dq
        "mFinishStatus" => finish_status: i8,
        "mLapDist" => lap_dist: f64,
        "mPathLateral" => path_lateral: f64,
        "mTrackEdge" => track_edge: f64,

        "mBestSector1" => best_sector1: f64,
        /// Cumulative, includes sector 1
        "mBestSector2" => best_sector2: f64,
        "mBestLapTime" => best_lap_time: f64,
        "mLastSector1" => last_sector1: f64,
        /// Cumulative, includes sector 1
        "mLastSector2" => last_sector2: f64,
        "mLastLapTime" => last_lap_time: f64,
        "mCurSector1" => cur_sector1: f64,
        /// Cumulative, includes sector 1
        "mCurSector2" => cur_sector2: f64,

        "mNumPitstops" => num_pitstops: i32,
        "mNumPenalties" => num_penalties: i32,
        "mIsPlayer" => is_player: bool,

        /// -1=nobody, 0=player, 1=AI, 2=remote, 3=replay
        "mControl" => control: i8,
        "mInPits" => in_pits: bool,
        /// 1-based
        "mPlace" => place: u8,
        "mVehicleClass" => vehicle_class: String,

        "mTimeBehindNext" => time_behind_next: f64,
        "mLapsBehindNext" => laps_behind_next: i32,
        "mTimeBehindLeader" => time_behind_leader: f64,
        "mLapsBehindLeader" => laps_behind_leader: i32,
        "mLapStartET" => lap_start_et: f64,

        "mPos" => pos: Vec3,
        /// meters/sec in local vehicle coordinates
        "mLocalVel" => local_vel: Vec3,
        "mLocalAccel" => local_accel: Vec3,

        "mOri" => ori: Vec<Vec3>,
        "mLocalRot" => local_rot: Vec3,
        "mLocalRotAccel" => local_rot_accel: Vec3,

        "mHeadlights" => headlights: u8,
        /// 0=none, 1=request, 2=entering, 3=stopped, 4=exiting
        "mPitState" => pit_state: u8,
        "mServerScored" => server_scored: u8,
        "mIndividualPhase" => individual_phase: u8,

        /// 1-based, -1 when invalid
        "mQualification" => qualification: i32,
        "mTimeIntoLap" => time_into_lap: f64,
        "mEstimatedLapTime" => estimated_lap_time: f64,

        "mPitGroup" => pit_group: String,
        /// 0=green, 6=blue
        "mFlag" => flag: u8,
        "mUnderYellow" => under_yellow: bool,
        /// 0=do not count, 1=count lap but not time, 2=count lap and time
        "mCountLapFlag" => count_lap_flag: u8,
        "mInGarageStall" => in_garage_stall: bool,

        "mUpgradePack" => upgrade_pack: Vec<u8>,

        "mPitLapDist" => pit_lap_dist: f64,
        "mBestLapSector1" => best_lap_sector1: f64,
        /// Cumulative, includes sector 1
        "mBestLapSector2" => best_lap_sector2: f64,

        "mExpansion" => expansion: Vec<u8>,
    }
}

/// Scoring buffer: session metadata plus timing for every vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Scoring {
    #[serde(rename = "mVersionUpdateBegin")]
    pub version_update_begin: u32,
    #[serde(rename = "mVersionUpdateEnd")]
    pub version_update_end: u32,
    #[serde(rename = "mBytesUpdatedHint")]
    pub bytes_updated_hint: i32,
    #[serde(rename = "mScoringInfo")]
    pub scoring_info: Option<ScoringInfo>,
    #[serde(rename = "mVehicles")]
    pub vehicles: Option<Vec<VehicleScoring>>,
}

impl FromSnapshot for Scoring {
    const TOPIC: Topic = Topic::Scoring;

    fn from_snapshot(value: &Value) -> Result<Self> {
        let fields = Fields::of("Scoring", value)?;
        Ok(Self {
            version_update_begin: fields.required(VERSION_BEGIN)?,
            version_update_end: fields.required(VERSION_END)?,
            bytes_updated_hint: fields.required(BYTES_UPDATED_HINT)?,
            scoring_info: fields.optional("mScoringInfo"),
            vehicles: fields.optional("mVehicles"),
        })
    }
}

impl VersionedBlock for Scoring {
    fn version_begin(&self) -> u32 {
        self.version_update_begin
    }

    fn version_end(&self) -> u32 {
        self.version_update_end
    }

    fn bytes_updated_hint(&self) -> i32 {
        self.bytes_updated_hint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TelemetryError;
    use proptest::prelude::*;
    use serde_json::json;

    fn scoring_value() -> Value {
        json!({
            "mVersionUpdateBegin": 8,
            "mVersionUpdateEnd": 8,
            "mBytesUpdatedHint": 512,
            "mScoringInfo": {
                "mTrackName": "Silverstone",
                "mSession": 11,
                "mCurrentET": 620.0,
                "mNumVehicles": 2,
                "mInRealtime": true,
                "mYellowFlagState": "ÿ",
                "mWind": { "x": 0.5, "y": 0.0, "z": 1.5 },
            },
            "mVehicles": [
                { "mDriverName": "A. Driver", "mPlace": 1, "mFinishStatus": 0 },
                { "mDriverName": "B. Driver", "mPlace": 2, "mFinishStatus": 2 },
            ],
        })
    }

    #[test]
    fn binds_info_and_vehicles() {
        let scoring = Scoring::from_snapshot(&scoring_value()).unwrap();
        let info = scoring.scoring_info.as_ref().unwrap();
        assert_eq!(info.track_name.as_deref(), Some("Silverstone"));
        assert_eq!(info.session, Some(11));
        assert_eq!(info.in_realtime, Some(true));
        assert_eq!(info.yellow_flag_state.as_deref(), Some("ÿ"));
        assert_eq!(info.wind.as_ref().and_then(|w| w.z), Some(1.5));

        let vehicles = scoring.vehicles.as_ref().unwrap();
        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[1].finish_status, Some(2));
        assert_eq!(vehicles[1].place, Some(2));
    }

    #[test]
    fn serializes_with_simulator_names_and_nulls() {
        let scoring = Scoring::from_snapshot(&scoring_value()).unwrap();
        let document = serde_json::to_value(&scoring).unwrap();
        assert_eq!(document["mVersionUpdateBegin"], 8);
        assert_eq!(document["mScoringInfo"]["mTrackName"], "Silverstone");
        assert_eq!(document["mScoringInfo"]["mRaining"], Value::Null);
        assert_eq!(document["mScoringInfo"]["mYellowFlagState"], "ÿ");
        assert_eq!(document["mVehicles"][0]["mDriverName"], "A. Driver");
    }

    #[test]
    fn wrong_counter_type_fails_whole_snapshot() {
        let mut value = scoring_value();
        value["mBytesUpdatedHint"] = json!("512");

        match Scoring::from_snapshot(&value) {
            Err(TelemetryError::Validation { field, expected, found, .. }) => {
                assert_eq!(field, "mBytesUpdatedHint");
                assert_eq!(expected, "integer");
                assert_eq!(found, "string");
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    const OPTIONAL_INFO_FIELDS: &[&str] = &[
        "mTrackName",
        "mSession",
        "mCurrentET",
        "mNumVehicles",
        "mInRealtime",
        "mWind",
    ];

    const COUNTERS: &[&str] = &[VERSION_BEGIN, VERSION_END, BYTES_UPDATED_HINT];

    proptest! {
        #[test]
        fn dropping_an_optional_field_only_clears_that_field(
            key in prop::sample::select(OPTIONAL_INFO_FIELDS)
        ) {
            let full = Scoring::from_snapshot(&scoring_value()).unwrap();

            let mut value = scoring_value();
            value["mScoringInfo"].as_object_mut().unwrap().remove(key);
            let partial = Scoring::from_snapshot(&value).unwrap();

            let full_doc = serde_json::to_value(&full.scoring_info).unwrap();
            let partial_doc = serde_json::to_value(&partial.scoring_info).unwrap();
            prop_assert_eq!(&partial_doc[key], &Value::Null);
            for (name, expected) in full_doc.as_object().unwrap() {
                if name != key {
                    prop_assert_eq!(&partial_doc[name.as_str()], expected);
                }
            }
            prop_assert_eq!(partial.vehicles, full.vehicles);
        }

        #[test]
        fn dropping_a_counter_fails_the_bind(key in prop::sample::select(COUNTERS)) {
            let mut value = scoring_value();
            value.as_object_mut().unwrap().remove(key);
            let is_missing_counter = matches!(
                Scoring::from_snapshot(&value),
                Err(TelemetryError::Validation { ref field, .. }) if field == key
            );
            prop_assert!(is_missing_counter);
        }
    }
}
