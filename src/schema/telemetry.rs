//! Telemetry buffer layout (`$rFactor2SMMP_Telemetry$`)

use serde::Serialize;
use serde_json::Value;

use super::Vec3;
use crate::adapters::{Fields, FromSnapshot, VersionedBlock};
use crate::snapshot::{BYTES_UPDATED_HINT, VERSION_BEGIN, VERSION_END};
use crate::types::Topic;
use crate::Result;

crate::record! {
    /// Per-wheel telemetry, ordered front left, front right, rear left, rear right.
    pub struct Wheel {
        /// meters
        "mSuspensionDeflection" => suspension_deflection: f64,
        /// meters
        "mRideHeight" => ride_height: f64,
        /// pushrod load in Newtons
        "mSuspForce" => susp_force: f64,
        /// Celsius
        "mBrakeTemp" => brake_temp: f64,
        /// 0.0-1.0 depending on driver input and brake balance
        "mBrakePressure" => brake_pressure: f64,
        /// radians/sec
        "mRotation" => rotation: f64,
        "mLateralPatchVel" => lateral_patch_vel: f64,
        "mLongitudinalPatchVel" => longitudinal_patch_vel: f64,
        "mLateralGroundVel" => lateral_ground_vel: f64,
        "mLongitudinalGroundVel" => longitudinal_ground_vel: f64,
        /// radians, positive is outward
        "mCamber" => camber: f64,
        "mLateralForce" => lateral_force: f64,
        "mLongitudinalForce" => longitudinal_force: f64,
        "mTireLoad" => tire_load: f64,
        /// fraction of the contact patch that is sliding
        "mGripFract" => grip_fract: f64,
        /// kPa
        "mPressure" => pressure: f64,
        /// Kelvin, left/center/right
        "mTemperature" => temperature: Vec<f64>,
        /// 0.0-1.0 fraction of maximum
        "mWear" => wear: f64,
        "mTerrainName" => terrain_name: String,
        /// 0=dry, 1=wet, 2=grass, 3=dirt, 4=gravel, 5=rumblestrip, 6=special
        "mSurfaceType" => surface_type: u8,
        "mFlat" => flat: bool,
        "mDetached" => detached: bool,
        /// centimeters
        "mStaticUndeflectedRadius" => static_undeflected_radius: u8,
        "mVerticalTireDeflection" => vertical_tire_deflection: f64,
        "mWheelYLocation" => wheel_y_location: f64,
        "mToe" => toe: f64,
        /// Kelvin
        "mTireCarcassTemperature" => tire_carcass_temperature: f64,
        /// Kelvin, left/center/right
        "mTireInnerLayerTemperature" => tire_inner_layer_temperature: Vec<f64>,
        "mExpansion" => expansion: Vec<u8>,
    }
}

crate::record! {
    /// Physics state of one vehicle.
    pub struct VehicleTelemetry {
        /// Slot ID, may be reused in multiplayer
        "mID" => id: i32,
        "mDeltaTime" => delta_time: f64,
        "mElapsedTime" => elapsed_time: f64,
        "mLapNumber" => lap_number: i32,
        "mLapStartET" => lap_start_et: f64,
        "mVehicleName" => vehicle_name: String,
        "mTrackName" => track_name: String,

        "mPos" => pos: Vec3,
        /// meters/sec in local vehicle coordinates
        "mLocalVel" => local_vel: Vec3,
        "mLocalAccel" => local_accel: Vec3,

        /// Rows of the orientation matrix
        "mOri" => ori: Vec<Vec3>,
        "mLocalRot" => local_rot: Vec3,
        "mLocalRotAccel" => local_rot_accel: Vec3,

        /// -1=reverse, 0=neutral, 1+=forward gears
        "mGear" => gear: i32,
        "mEngineRPM" => engine_rpm: f64,
        "mEngineWaterTemp" => engine_water_temp: f64,
        "mEngineOilTemp" => engine_oil_temp: f64,
        "mClutchRPM" => clutch_rpm: f64,

        "mUnfilteredThrottle" => unfiltered_throttle: f64,
        "mUnfilteredBrake" => unfiltered_brake: f64,
        "mUnfilteredSteering" => unfiltered_steering: f64,
        "mUnfilteredClutch" => unfiltered_clutch: f64,

        "mFilteredThrottle" => filtered_throttle: f64,
        "mFilteredBrake" => filtered_brake: f64,
        "mFilteredSteering" => filtered_steering: f64,
        "mFilteredClutch" => filtered_clutch: f64,

        "mSteeringShaftTorque" => steering_shaft_torque: f64,
        "mFront3rdDeflection" => front_3rd_deflection: f64,
        "mRear3rdDeflection" => rear_3rd_deflection: f64,

        "mFrontWingHeight" => front_wing_height: f64,
        "mFrontRideHeight" => front_ride_height: f64,
        "mRearRideHeight" => rear_ride_height: f64,
        "mDrag" => drag: f64,
        "mFrontDownforce" => front_downforce: f64,
        "mRearDownforce" => rear_downforce: f64,

        /// liters
        "mFuel" => fuel: f64,
        "mEngineMaxRPM" => engine_max_rpm: f64,
        "mScheduledStops" => scheduled_stops: u8,
        "mOverheating" => overheating: bool,
        "mDetached" => detached: bool,
        "mHeadlights" => headlights: bool,
        /// 0=none, 1=some, 2=more at 8 locations around the car
        "mDentSeverity" => dent_severity: Vec<u8>,
        "mLastImpactET" => last_impact_et: f64,
        "mLastImpactMagnitude" => last_impact_magnitude: f64,
        "mLastImpactPos" => last_impact_pos: Vec3,

        "mEngineTorque" => engine_torque: f64,
        /// Pitlane is stored in the sign bit
        "mCurrentSector" => current_sector: i32,
        "mSpeedLimiter" => speed_limiter: u8,
        "mMaxGears" => max_gears: u8,
        "mFrontTireCompoundIndex" => front_tire_compound_index: u8,
        "mRearTireCompoundIndex" => rear_tire_compound_index: u8,
        "mFuelCapacity" => fuel_capacity: f64,
        "mFrontFlapActivated" => front_flap_activated: u8,
        "mRearFlapActivated" => rear_flap_activated: u8,
        /// 0=disallowed, 1=detected but not allowed yet, 2=allowed
        "mRearFlapLegalStatus" => rear_flap_legal_status: u8,
        /// 0=off, 1=ignition, 2=ignition+starter
        "mIgnitionStarter" => ignition_starter: u8,
        "mFrontTireCompoundName" => front_tire_compound_name: String,
        "mRearTireCompoundName" => rear_tire_compound_name: String,
        "mSpeedLimiterAvailable" => speed_limiter_available: u8,
        "mAntiStallActivated" => anti_stall_activated: u8,
        "mUnused" => unused: Vec<u8>,
        "mVisualSteeringWheelRange" => visual_steering_wheel_range: f64,
        "mRearBrakeBias" => rear_brake_bias: f64,
        "mTurboBoostPressure" => turbo_boost_pressure: f64,
        "mPhysicsToGraphicsOffset" => physics_to_graphics_offset: Vec<f64>,
        "mPhysicalSteeringWheelRange" => physical_steering_wheel_range: f64,
        "mBatteryChargeFraction" => battery_charge_fraction: f64,
        "mElectricBoostMotorTorque" => electric_boost_motor_torque: f64,
        "mElectricBoostMotorRPM" => electric_boost_motor_rpm: f64,
        "mElectricBoostMotorTemperature" => electric_boost_motor_temperature: f64,
        "mElectricBoostWaterTemperature" => electric_boost_water_temperature: f64,
        /// 0=unavailable, 1=inactive, 2=propulsion, 3=regeneration
        "mElectricBoostMotorState" => electric_boost_motor_state: u8,
        "mExpansion" => expansion: Vec<u8>,
        "mWheels" => wheels: Vec<Wheel>,
    }
}

/// Telemetry buffer: physics state for every vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Telemetry {
    #[serde(rename = "mVersionUpdateBegin")]
    pub version_update_begin: u32,
    #[serde(rename = "mVersionUpdateEnd")]
    pub version_update_end: u32,
    #[serde(rename = "mBytesUpdatedHint")]
    pub bytes_updated_hint: i32,
    #[serde(rename = "mNumVehicles")]
    pub num_vehicles: i32,
    #[serde(rename = "mVehicles")]
    pub vehicles: Option<Vec<VehicleTelemetry>>,
}

impl FromSnapshot for Telemetry {
    const TOPIC: Topic = Topic::Telemetry;

    fn from_snapshot(value: &Value) -> Result<Self> {
        let fields = Fields::of("Telemetry", value)?;
        Ok(Self {
            version_update_begin: fields.required(VERSION_BEGIN)?,
            version_update_end: fields.required(VERSION_END)?,
            bytes_updated_hint: fields.required(BYTES_UPDATED_HINT)?,
            num_vehicles: fields.required("mNumVehicles")?,
            vehicles: fields.optional("mVehicles"),
        })
    }
}

impl VersionedBlock for Telemetry {
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
    use serde_json::json;

    fn header() -> Value {
        json!({
            "mVersionUpdateBegin": 5,
            "mVersionUpdateEnd": 5,
            "mBytesUpdatedHint": 2048,
            "mNumVehicles": 1,
        })
    }

    #[test]
    fn binds_vehicles_and_wheels() {
        let mut value = header();
        value["mVehicles"] = json!([{
            "mID": 3,
            "mGear": 4,
            "mEngineRPM": 8200.5,
            "mLocalVel": { "x": 1.0, "y": 0.0, "z": -50.0 },
            "mOri": [{ "x": 1, "y": 0, "z": 0 }, { "x": 0, "y": 1, "z": 0 }, { "x": 0, "y": 0, "z": 1 }],
            "mWheels": [
                { "mTemperature": [350.0, 355.0, 352.0], "mFlat": false, "mTerrainName": "ROAD" },
                { "mFlat": 1 },
            ],
        }]);

        let telemetry = Telemetry::from_snapshot(&value).unwrap();
        assert!(telemetry.is_consistent());
        assert_eq!(telemetry.num_vehicles, 1);

        let vehicle = &telemetry.vehicles.unwrap()[0];
        assert_eq!(vehicle.id, Some(3));
        assert_eq!(vehicle.gear, Some(4));
        assert_eq!(vehicle.engine_rpm, Some(8200.5));
        assert_eq!(vehicle.local_vel.as_ref().and_then(|v| v.z), Some(-50.0));
        assert_eq!(vehicle.ori.as_ref().map(Vec::len), Some(3));
        assert_eq!(vehicle.fuel, None);

        let wheels = vehicle.wheels.as_ref().unwrap();
        assert_eq!(wheels[0].temperature, Some(vec![350.0, 355.0, 352.0]));
        assert_eq!(wheels[0].terrain_name.as_deref(), Some("ROAD"));
        assert_eq!(wheels[0].flat, Some(false));
        assert_eq!(wheels[1].flat, None);
    }

    #[test]
    fn vehicle_count_is_required() {
        let mut value = header();
        value.as_object_mut().unwrap().remove("mNumVehicles");

        match Telemetry::from_snapshot(&value) {
            Err(TelemetryError::Validation { field, .. }) => assert_eq!(field, "mNumVehicles"),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn absent_vehicle_list_is_not_an_error() {
        let telemetry = Telemetry::from_snapshot(&header()).unwrap();
        assert_eq!(telemetry.vehicles, None);
    }

    #[test]
    fn binding_is_idempotent() {
        let mut value = header();
        value["mVehicles"] = json!([{ "mFuel": 50.5 }, "garbage"]);
        let first = Telemetry::from_snapshot(&value).unwrap();
        let second = Telemetry::from_snapshot(&value).unwrap();
        assert_eq!(first, second);
    }
}
