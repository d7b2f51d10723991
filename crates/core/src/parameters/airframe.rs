//! Airframe Parameter Definitions
//!
//! Vehicle-wide values the landing logic reads but does not own.
//!
//! # Parameters
//!
//! - `TRIM_ARSPD_CM` - Cruise airspeed (cm/s)
//! - `TECS_LAND_ARSPD` - Approach airspeed (m/s, negative = use cruise)
//! - `TECS_LAND_SINK` - Sink rate on the final glide slope (m/s)
//! - `WP_LOITER_RAD` - Loiter radius (m)
//! - `LEVEL_ROLL_LIMIT` - Roll limit near the ground (deg)
//! - `CRASH_DETECT` - Crash detection enable (0 = disabled)

use super::error::ParameterError;
use super::storage::{read_f32, read_i32, ParamValue, ParameterStore};

const DEFAULT_CRUISE_CM: i32 = 1200;
const MIN_CRUISE_CM: i32 = 0;
const MAX_CRUISE_CM: i32 = 10000;

const DEFAULT_LAND_ARSPD: f32 = -1.0;
const MAX_LAND_ARSPD: f32 = 100.0;

const DEFAULT_LAND_SINK: f32 = 0.25;
const MAX_LAND_SINK: f32 = 2.0;

const DEFAULT_LOITER_RAD: f32 = 60.0;
const MIN_LOITER_RAD: f32 = 1.0;
const MAX_LOITER_RAD: f32 = 32767.0;

const DEFAULT_LEVEL_ROLL: f32 = 5.0;
const MAX_LEVEL_ROLL: f32 = 45.0;

const DEFAULT_CRASH_DETECT: i32 = 0;

/// Airframe parameters loaded from parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct AirframeParams {
    pub airspeed_cruise_cm: i32,
    pub land_airspeed: f32,
    pub land_sink_rate: f32,
    pub loiter_radius: f32,
    pub level_roll_limit_deg: f32,
    pub crash_detect: bool,
}

impl Default for AirframeParams {
    fn default() -> Self {
        Self {
            airspeed_cruise_cm: DEFAULT_CRUISE_CM,
            land_airspeed: DEFAULT_LAND_ARSPD,
            land_sink_rate: DEFAULT_LAND_SINK,
            loiter_radius: DEFAULT_LOITER_RAD,
            level_roll_limit_deg: DEFAULT_LEVEL_ROLL,
            crash_detect: DEFAULT_CRASH_DETECT != 0,
        }
    }
}

impl AirframeParams {
    /// Register airframe parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register("TRIM_ARSPD_CM", ParamValue::Int(DEFAULT_CRUISE_CM))?;
        store.register("TECS_LAND_ARSPD", ParamValue::Float(DEFAULT_LAND_ARSPD))?;
        store.register("TECS_LAND_SINK", ParamValue::Float(DEFAULT_LAND_SINK))?;
        store.register("WP_LOITER_RAD", ParamValue::Float(DEFAULT_LOITER_RAD))?;
        store.register("LEVEL_ROLL_LIMIT", ParamValue::Float(DEFAULT_LEVEL_ROLL))?;
        store.register("CRASH_DETECT", ParamValue::Int(DEFAULT_CRASH_DETECT))?;
        Ok(())
    }

    /// Load airframe parameters from parameter store
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            airspeed_cruise_cm: read_i32(
                store,
                "TRIM_ARSPD_CM",
                DEFAULT_CRUISE_CM,
                MIN_CRUISE_CM,
                MAX_CRUISE_CM,
            ),
            land_airspeed: read_f32(
                store,
                "TECS_LAND_ARSPD",
                DEFAULT_LAND_ARSPD,
                DEFAULT_LAND_ARSPD,
                MAX_LAND_ARSPD,
            ),
            land_sink_rate: read_f32(store, "TECS_LAND_SINK", DEFAULT_LAND_SINK, 0.0, MAX_LAND_SINK),
            loiter_radius: read_f32(
                store,
                "WP_LOITER_RAD",
                DEFAULT_LOITER_RAD,
                MIN_LOITER_RAD,
                MAX_LOITER_RAD,
            ),
            level_roll_limit_deg: read_f32(
                store,
                "LEVEL_ROLL_LIMIT",
                DEFAULT_LEVEL_ROLL,
                0.0,
                MAX_LEVEL_ROLL,
            ),
            crash_detect: read_i32(store, "CRASH_DETECT", DEFAULT_CRASH_DETECT, 0, 1) != 0,
        }
    }

    /// Approach airspeed in m/s, falling back to cruise when unset
    pub fn land_airspeed_or_cruise(&self) -> f32 {
        if self.land_airspeed >= 0.0 {
            self.land_airspeed
        } else {
            self.airspeed_cruise_cm as f32 * 0.01
        }
    }
}
