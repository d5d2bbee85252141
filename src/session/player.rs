//! Per-vehicle view derived from scoring

use serde::Serialize;

use super::names::finish_status_name;
use crate::schema::VehicleScoring;

/// Meters per second to kilometers per hour.
const MPS_TO_KPH: f64 = 3.6;

/// Human-facing summary of one vehicle. Sector times are per-sector
/// durations, not the simulator's cumulative splits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(rename = "driveName")]
    pub driver_name: Option<String>,
    pub vehicle_name: Option<String>,
    pub vehicle_class: Option<String>,
    pub total_laps: Option<i32>,
    pub place: Option<u8>,
    pub in_pits: Option<bool>,
    pub num_pitstops: Option<i32>,
    pub finish_status: Option<&'static str>,
    pub best_sector1: Option<f64>,
    pub best_sector2: Option<f64>,
    pub best_sector3: Option<f64>,
    pub best_lap_time: Option<f64>,
    pub last_sector1: Option<f64>,
    pub last_sector2: Option<f64>,
    pub last_sector3: Option<f64>,
    pub last_lap_time: Option<f64>,
    pub current_sector1: Option<f64>,
    pub current_sector2: Option<f64>,
    pub current_lap_time: Option<f64>,
    /// km/h
    pub speed: Option<f64>,
}

/// Split cumulative sector times into per-sector durations.
///
/// `sector1` is already a duration; the other two are differences between
/// consecutive cumulative splits. An absent operand makes the result absent.
fn split_sectors(
    sector1: Option<f64>,
    cumulative2: Option<f64>,
    lap: Option<f64>,
) -> [Option<f64>; 3] {
    [sector1, difference(cumulative2, sector1), difference(lap, cumulative2)]
}

fn difference(minuend: Option<f64>, subtrahend: Option<f64>) -> Option<f64> {
    Some(minuend? - subtrahend?)
}

impl Player {
    /// Derive the view of `vehicle` at session time `current_et`.
    pub fn from_vehicle(vehicle: &VehicleScoring, current_et: Option<f64>) -> Self {
        let [best_sector1, best_sector2, best_sector3] =
            split_sectors(vehicle.best_lap_sector1, vehicle.best_lap_sector2, vehicle.best_lap_time);
        let [last_sector1, last_sector2, last_sector3] =
            split_sectors(vehicle.last_sector1, vehicle.last_sector2, vehicle.last_lap_time);

        Self {
            driver_name: vehicle.driver_name.clone(),
            vehicle_name: vehicle.vehicle_name.clone(),
            vehicle_class: vehicle.vehicle_class.clone(),
            total_laps: vehicle.total_laps,
            place: vehicle.place,
            in_pits: vehicle.in_pits,
            num_pitstops: vehicle.num_pitstops,
            finish_status: vehicle.finish_status.map(|code| finish_status_name(code.into())),
            best_sector1,
            best_sector2,
            best_sector3,
            best_lap_time: vehicle.best_lap_time,
            last_sector1,
            last_sector2,
            last_sector3,
            last_lap_time: vehicle.last_lap_time,
            // The third current sector is never tracked, so these stay cumulative
            current_sector1: vehicle.cur_sector1,
            current_sector2: vehicle.cur_sector2,
            current_lap_time: difference(current_et, vehicle.lap_start_et),
            speed: vehicle
                .local_vel
                .as_ref()
                .and_then(|velocity| velocity.magnitude())
                .map(|mps| mps * MPS_TO_KPH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Vec3;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should be present");
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn best_lap_is_split_into_sectors() {
        let vehicle = VehicleScoring {
            best_lap_sector1: Some(30.0),
            best_lap_sector2: Some(62.0),
            best_lap_time: Some(95.0),
            ..Default::default()
        };

        let player = Player::from_vehicle(&vehicle, None);
        assert_close(player.best_sector1, 30.0);
        assert_close(player.best_sector2, 32.0);
        assert_close(player.best_sector3, 33.0);
        assert_close(player.best_lap_time, 95.0);
    }

    #[test]
    fn last_lap_is_split_and_current_passes_through() {
        let vehicle = VehicleScoring {
            last_sector1: Some(31.5),
            last_sector2: Some(64.0),
            last_lap_time: Some(97.25),
            cur_sector1: Some(29.0),
            cur_sector2: Some(61.0),
            ..Default::default()
        };

        let player = Player::from_vehicle(&vehicle, None);
        assert_close(player.last_sector1, 31.5);
        assert_close(player.last_sector2, 32.5);
        assert_close(player.last_sector3, 33.25);
        assert_close(player.current_sector1, 29.0);
        assert_close(player.current_sector2, 61.0);
    }

    #[test]
    fn speed_from_local_velocity() {
        let vehicle = VehicleScoring {
            local_vel: Some(Vec3 { x: Some(10.0), y: Some(0.0), z: Some(0.0) }),
            ..Default::default()
        };
        assert_close(Player::from_vehicle(&vehicle, None).speed, 36.0);
    }

    #[test]
    fn current_lap_time_from_session_clock() {
        let vehicle = VehicleScoring { lap_start_et: Some(500.0), ..Default::default() };
        assert_close(Player::from_vehicle(&vehicle, Some(542.5)).current_lap_time, 42.5);
        assert_eq!(Player::from_vehicle(&vehicle, None).current_lap_time, None);
    }

    #[test]
    fn finish_status_is_named() {
        let vehicle = VehicleScoring { finish_status: Some(2), ..Default::default() };
        assert_eq!(Player::from_vehicle(&vehicle, None).finish_status, Some("DNF"));
    }

    #[test]
    fn missing_inputs_propagate_as_absent() {
        let vehicle = VehicleScoring {
            best_lap_sector1: Some(30.0),
            best_lap_time: Some(95.0),
            local_vel: Some(Vec3 { x: Some(1.0), y: None, z: Some(0.0) }),
            ..Default::default()
        };

        let player = Player::from_vehicle(&vehicle, Some(100.0));
        assert_close(player.best_sector1, 30.0);
        assert_eq!(player.best_sector2, None);
        assert_eq!(player.best_sector3, None);
        assert_eq!(player.speed, None);
        assert_eq!(player.current_lap_time, None);
        assert_eq!(player.finish_status, None);
        assert_eq!(player.driver_name, None);
    }

    #[test]
    fn serialized_keys() {
        let document = serde_json::to_value(Player::from_vehicle(&VehicleScoring::default(), None))
            .unwrap();
        let object = document.as_object().unwrap();
        for key in ["driveName", "vehicleClass", "bestSector3", "currentLapTime", "speed"] {
            assert!(object.contains_key(key), "missing {key}");
        }
    }
}
