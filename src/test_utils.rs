//! Raw buffer fixtures shared by unit tests, integration tests and benches
//!
//! The builders produce the undecoded structures a shared-memory reader would
//! hand over: NUL-padded byte arrays for text, private padding fields, and the
//! version counters on the top-level record.

#![cfg(any(test, feature = "benchmark"))]

use crate::provider::MirrorUpdate;
use crate::snapshot::{BYTES_UPDATED_HINT, VERSION_BEGIN, VERSION_END};
use crate::types::{RawNode, RawRecord};

/// Size of the fixed text fields in the scoring buffer.
pub const NAME_LEN: usize = 32;

/// Track name carried by [`scoring_block`].
pub const TRACK_NAME: &str = "Circuit de Spa-Francorchamps";

/// One vehicle entry of a scoring fixture.
#[derive(Debug, Clone)]
pub struct VehicleFixture {
    pub driver: &'static str,
    pub place: i64,
    pub lap_start_et: f64,
    /// Forward speed in m/s
    pub speed: f64,
    pub finish_status: i64,
}

/// Two running cars followed by an unused slot.
pub fn default_vehicles() -> Vec<VehicleFixture> {
    vec![
        VehicleFixture { driver: "Ana Ruiz", place: 1, lap_start_et: 100.0, speed: 50.0, finish_status: 0 },
        VehicleFixture { driver: "Bo Lind", place: 2, lap_start_et: 102.5, speed: 45.0, finish_status: 0 },
        VehicleFixture { driver: "", place: 0, lap_start_et: 0.0, speed: 0.0, finish_status: 0 },
    ]
}

pub fn vec3(x: f64, y: f64, z: f64) -> RawNode {
    RawRecord::new()
        .with("x", RawNode::float(x))
        .with("y", RawNode::float(y))
        .with("z", RawNode::float(z))
        .into()
}

fn vehicle_scoring(id: i64, vehicle: &VehicleFixture) -> RawNode {
    RawRecord::new()
        .with("mID", RawNode::int(id))
        .with("mDriverName", RawNode::text(vehicle.driver, NAME_LEN))
        .with("mVehicleName", RawNode::text("Oreca 07", 64))
        .with("mVehicleClass", RawNode::text("LMP2", NAME_LEN))
        .with("mTotalLaps", RawNode::int(7))
        .with("mPlace", RawNode::int(vehicle.place))
        .with("mInPits", RawNode::bool(false))
        .with("mNumPitstops", RawNode::int(1))
        .with("mFinishStatus", RawNode::int(vehicle.finish_status))
        .with("mBestLapSector1", RawNode::float(30.0))
        .with("mBestLapSector2", RawNode::float(62.0))
        .with("mBestLapTime", RawNode::float(95.0))
        .with("mLastSector1", RawNode::float(31.0))
        .with("mLastSector2", RawNode::float(64.0))
        .with("mLastLapTime", RawNode::float(97.0))
        .with("mCurSector1", RawNode::float(30.5))
        .with("mCurSector2", RawNode::float(-1.0))
        .with("mLapStartET", RawNode::float(vehicle.lap_start_et))
        .with("mLocalVel", vec3(0.0, 0.0, -vehicle.speed))
        .with("mExpansion", RawNode::Bytes(vec![0; 24]))
        .with("_padding", RawNode::Bytes(vec![0; 4]))
        .into()
}

/// A consistent scoring buffer at `version` with the given vehicles.
pub fn scoring_with(version: u32, vehicles: &[VehicleFixture]) -> RawNode {
    let count = vehicles.iter().filter(|vehicle| !vehicle.driver.is_empty()).count();

    let info = RawRecord::new()
        .with("mTrackName", RawNode::text(TRACK_NAME, 64))
        .with("mSession", RawNode::int(10))
        .with("mCurrentET", RawNode::float(130.0))
        .with("mMaxLaps", RawNode::int(40))
        .with("mLapDist", RawNode::float(7004.0))
        .with("pointer1", RawNode::Pointer(None))
        .with("mNumVehicles", RawNode::int(count as i64))
        .with("mYellowFlagState", RawNode::Bytes(vec![0xFF]))
        .with("mRaining", RawNode::float(0.0))
        .with("mAmbientTemp", RawNode::float(18.5))
        .with("mTrackTemp", RawNode::float(27.0))
        .with("mMinPathWetness", RawNode::float(0.0))
        .with("mMaxPathWetness", RawNode::float(0.05));

    let vehicles = vehicles
        .iter()
        .enumerate()
        .map(|(id, vehicle)| vehicle_scoring(id as i64, vehicle))
        .collect();

    RawRecord::new()
        .with(VERSION_BEGIN, RawNode::int(version.into()))
        .with(VERSION_END, RawNode::int(version.into()))
        .with(BYTES_UPDATED_HINT, RawNode::int(4096))
        .with("mScoringInfo", info.into())
        .with("mVehicles", RawNode::Array(vehicles))
        .into()
}

/// A consistent scoring buffer with [`default_vehicles`].
pub fn scoring_block(version: u32) -> RawNode {
    scoring_with(version, &default_vehicles())
}

/// A consistent telemetry buffer with one vehicle.
pub fn telemetry_block(version: u32) -> RawNode {
    let wheel = |temperature: f64| -> RawNode {
        RawRecord::new()
            .with(
                "mTemperature",
                RawNode::Array(vec![
                    RawNode::float(temperature),
                    RawNode::float(temperature + 2.0),
                    RawNode::float(temperature + 1.0),
                ]),
            )
            .with("mFlat", RawNode::bool(false))
            .with("mTerrainName", RawNode::text("ROAD", 16))
            .into()
    };

    let vehicle = RawRecord::new()
        .with("mID", RawNode::int(0))
        .with("mGear", RawNode::int(5))
        .with("mEngineRPM", RawNode::float(8450.0))
        .with("mFuel", RawNode::float(42.5))
        .with("mVehicleName", RawNode::text("Oreca 07", 64))
        .with("mLocalVel", vec3(0.0, 0.0, -50.0))
        .with("mWheels", RawNode::Array(vec![wheel(350.0), wheel(351.0), wheel(360.0), wheel(361.0)]));

    RawRecord::new()
        .with(VERSION_BEGIN, RawNode::int(version.into()))
        .with(VERSION_END, RawNode::int(version.into()))
        .with(BYTES_UPDATED_HINT, RawNode::int(8192))
        .with("mNumVehicles", RawNode::int(1))
        .with("mVehicles", RawNode::Array(vec![vehicle.into()]))
        .into()
}

/// Rewrite the top-level counters of a fixture, e.g. to simulate a torn write.
pub fn with_counters(node: RawNode, begin: i64, end: i64) -> RawNode {
    match node {
        RawNode::Record(mut record) => {
            for (name, value) in &mut record.fields {
                if name == VERSION_BEGIN {
                    *value = RawNode::int(begin);
                } else if name == VERSION_END {
                    *value = RawNode::int(end);
                }
            }
            RawNode::Record(record)
        }
        other => other,
    }
}

pub fn scoring_update(version: u32, paused: bool) -> MirrorUpdate {
    MirrorUpdate { scoring: Some(scoring_block(version)), telemetry: None, paused }
}

pub fn full_update(version: u32, paused: bool) -> MirrorUpdate {
    MirrorUpdate {
        scoring: Some(scoring_block(version)),
        telemetry: Some(telemetry_block(version)),
        paused,
    }
}

/// Serialize updates as a JSON-lines recording.
pub fn recording(updates: &[MirrorUpdate]) -> String {
    updates
        .iter()
        .filter_map(|update| serde_json::to_string(update).ok())
        .map(|line| line + "\n")
        .collect()
}
