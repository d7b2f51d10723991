//! Deepstall Parameter Definitions
//!
//! Tunables for the deepstall landing, the `LAND_DS_` group.
//!
//! # Parameters
//!
//! - `LAND_DS_V_FWD` - Forward airspeed during the stall (m/s)
//! - `LAND_DS_V_DWN` - Descent rate during the stall (m/s)
//! - `LAND_DS_SLOPE_A` / `LAND_DS_SLOPE_B` - Stall-phase ground distance model
//!   (`slope_a * |wind| + slope_b` meters)
//! - `LAND_DS_APP_EXT` - Straight approach leg before the stall point (m)
//! - `LAND_DS_SLEW_SPD` - Time to slew the elevator to the stall deflection (s)
//! - `LAND_DS_ELEV_PWM` - Elevator PWM held during the stall (μs)
//! - `LAND_DS_ARSP_MAX` / `LAND_DS_ARSP_MIN` - Airspeed window over which the
//!   yaw-rate controller takes full rudder authority (m/s)
//! - `LAND_DS_L1` - Cross-track period (m)
//! - `LAND_DS_L1_I` - Cross-track integrator gain
//! - `LAND_DS_YAW_LIM` - Commanded yaw rate limit (deg/s)
//! - `LAND_DS_L1_TCON` - Track error to yaw rate time constant (s)
//! - `LAND_DS_P` / `LAND_DS_I` / `LAND_DS_D` / `LAND_DS_IMAX` - Yaw-rate PID

use super::error::ParameterError;
use super::storage::{read_f32, read_i32, ParamValue, ParameterStore};
use crate::control::PidGains;

const DEFAULT_V_FWD: f32 = 10.0;
const DEFAULT_V_DWN: f32 = 6.0;
const MAX_SPEED: f32 = 20.0;

const DEFAULT_SLOPE_A: f32 = -1.486_634;
const DEFAULT_SLOPE_B: f32 = 16.285_493;
const MIN_SLOPE: f32 = -100.0;
const MAX_SLOPE: f32 = 200.0;

const DEFAULT_APP_EXT: f32 = 50.0;
const MIN_APP_EXT: f32 = 10.0;
const MAX_APP_EXT: f32 = 200.0;

const DEFAULT_SLEW_SPD: f32 = 0.5;
const MAX_SLEW_SPD: f32 = 2.0;

const DEFAULT_ELEV_PWM: i32 = 1500;
const MIN_ELEV_PWM: i32 = 900;
const MAX_ELEV_PWM: i32 = 2100;

const DEFAULT_ARSP_MAX: f32 = 15.0;
const DEFAULT_ARSP_MIN: f32 = 10.0;
const MIN_ARSP: f32 = 5.0;
const MAX_ARSP: f32 = 20.0;

const DEFAULT_L1: f32 = 30.0;
const MIN_L1: f32 = 5.0;
const MAX_L1: f32 = 50.0;

const DEFAULT_L1_I: f32 = 0.0;
const MAX_L1_I: f32 = 1.0;

const DEFAULT_YAW_LIM: f32 = 10.0;
const MAX_YAW_LIM: f32 = 90.0;

const DEFAULT_L1_TCON: f32 = 0.4;
const MAX_L1_TCON: f32 = 1.0;

const DEFAULT_P: f32 = 4.0;
const DEFAULT_I: f32 = 0.5;
const DEFAULT_D: f32 = 0.01;
const DEFAULT_IMAX: f32 = 0.2;
const MAX_GAIN: f32 = 100.0;

/// Deepstall parameters loaded from parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct DeepstallParams {
    pub forward_speed: f32,
    pub descent_speed: f32,
    pub slope_a: f32,
    pub slope_b: f32,
    pub approach_extension: f32,
    /// Seconds
    pub slew_speed: f32,
    pub elevator_pwm: u16,
    pub handoff_airspeed: f32,
    pub handoff_lower_limit_airspeed: f32,
    pub l1_period: f32,
    pub l1_i: f32,
    /// Degrees per second
    pub yaw_rate_limit: f32,
    /// Seconds
    pub time_constant: f32,
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    pub ilim: f32,
}

impl Default for DeepstallParams {
    fn default() -> Self {
        Self {
            forward_speed: DEFAULT_V_FWD,
            descent_speed: DEFAULT_V_DWN,
            slope_a: DEFAULT_SLOPE_A,
            slope_b: DEFAULT_SLOPE_B,
            approach_extension: DEFAULT_APP_EXT,
            slew_speed: DEFAULT_SLEW_SPD,
            elevator_pwm: DEFAULT_ELEV_PWM as u16,
            handoff_airspeed: DEFAULT_ARSP_MAX,
            handoff_lower_limit_airspeed: DEFAULT_ARSP_MIN,
            l1_period: DEFAULT_L1,
            l1_i: DEFAULT_L1_I,
            yaw_rate_limit: DEFAULT_YAW_LIM,
            time_constant: DEFAULT_L1_TCON,
            kp: DEFAULT_P,
            ki: DEFAULT_I,
            kd: DEFAULT_D,
            ilim: DEFAULT_IMAX,
        }
    }
}

impl DeepstallParams {
    /// Register deepstall parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register("LAND_DS_V_FWD", ParamValue::Float(DEFAULT_V_FWD))?;
        store.register("LAND_DS_SLOPE_A", ParamValue::Float(DEFAULT_SLOPE_A))?;
        store.register("LAND_DS_SLOPE_B", ParamValue::Float(DEFAULT_SLOPE_B))?;
        store.register("LAND_DS_APP_EXT", ParamValue::Float(DEFAULT_APP_EXT))?;
        store.register("LAND_DS_V_DWN", ParamValue::Float(DEFAULT_V_DWN))?;
        store.register("LAND_DS_SLEW_SPD", ParamValue::Float(DEFAULT_SLEW_SPD))?;
        store.register("LAND_DS_ELEV_PWM", ParamValue::Int(DEFAULT_ELEV_PWM))?;
        store.register("LAND_DS_ARSP_MAX", ParamValue::Float(DEFAULT_ARSP_MAX))?;
        store.register("LAND_DS_ARSP_MIN", ParamValue::Float(DEFAULT_ARSP_MIN))?;
        store.register("LAND_DS_L1", ParamValue::Float(DEFAULT_L1))?;
        store.register("LAND_DS_L1_I", ParamValue::Float(DEFAULT_L1_I))?;
        store.register("LAND_DS_YAW_LIM", ParamValue::Float(DEFAULT_YAW_LIM))?;
        store.register("LAND_DS_L1_TCON", ParamValue::Float(DEFAULT_L1_TCON))?;
        store.register("LAND_DS_P", ParamValue::Float(DEFAULT_P))?;
        store.register("LAND_DS_I", ParamValue::Float(DEFAULT_I))?;
        store.register("LAND_DS_D", ParamValue::Float(DEFAULT_D))?;
        store.register("LAND_DS_IMAX", ParamValue::Float(DEFAULT_IMAX))?;
        Ok(())
    }

    /// Load deepstall parameters from parameter store
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            forward_speed: read_f32(store, "LAND_DS_V_FWD", DEFAULT_V_FWD, 0.0, MAX_SPEED),
            descent_speed: read_f32(store, "LAND_DS_V_DWN", DEFAULT_V_DWN, 0.0, MAX_SPEED),
            slope_a: read_f32(store, "LAND_DS_SLOPE_A", DEFAULT_SLOPE_A, MIN_SLOPE, MAX_SLOPE),
            slope_b: read_f32(store, "LAND_DS_SLOPE_B", DEFAULT_SLOPE_B, MIN_SLOPE, MAX_SLOPE),
            approach_extension: read_f32(
                store,
                "LAND_DS_APP_EXT",
                DEFAULT_APP_EXT,
                MIN_APP_EXT,
                MAX_APP_EXT,
            ),
            slew_speed: read_f32(store, "LAND_DS_SLEW_SPD", DEFAULT_SLEW_SPD, 0.0, MAX_SLEW_SPD),
            elevator_pwm: read_i32(
                store,
                "LAND_DS_ELEV_PWM",
                DEFAULT_ELEV_PWM,
                MIN_ELEV_PWM,
                MAX_ELEV_PWM,
            ) as u16,
            handoff_airspeed: read_f32(store, "LAND_DS_ARSP_MAX", DEFAULT_ARSP_MAX, MIN_ARSP, MAX_ARSP),
            handoff_lower_limit_airspeed: read_f32(
                store,
                "LAND_DS_ARSP_MIN",
                DEFAULT_ARSP_MIN,
                MIN_ARSP,
                MAX_ARSP,
            ),
            l1_period: read_f32(store, "LAND_DS_L1", DEFAULT_L1, MIN_L1, MAX_L1),
            l1_i: read_f32(store, "LAND_DS_L1_I", DEFAULT_L1_I, 0.0, MAX_L1_I),
            yaw_rate_limit: read_f32(store, "LAND_DS_YAW_LIM", DEFAULT_YAW_LIM, 0.0, MAX_YAW_LIM),
            time_constant: read_f32(store, "LAND_DS_L1_TCON", DEFAULT_L1_TCON, 0.0, MAX_L1_TCON),
            kp: read_f32(store, "LAND_DS_P", DEFAULT_P, 0.0, MAX_GAIN),
            ki: read_f32(store, "LAND_DS_I", DEFAULT_I, 0.0, MAX_GAIN),
            kd: read_f32(store, "LAND_DS_D", DEFAULT_D, 0.0, MAX_GAIN),
            ilim: read_f32(store, "LAND_DS_IMAX", DEFAULT_IMAX, 0.0, MAX_GAIN),
        }
    }

    /// Yaw-rate PID gains
    pub fn pid_gains(&self) -> PidGains {
        PidGains::new(self.kp, self.ki, self.kd, self.ilim)
    }

    /// Validate deepstall parameters
    ///
    /// The handoff window must be ordered; everything else is clamped on load.
    pub fn is_valid(&self) -> bool {
        self.handoff_airspeed >= self.handoff_lower_limit_airspeed
            && self.descent_speed > 0.0
            && self.forward_speed > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deepstall_params_defaults() {
        let params = DeepstallParams::default();
        assert!((params.forward_speed - 10.0).abs() < 0.001);
        assert!((params.descent_speed - 6.0).abs() < 0.001);
        assert!((params.slope_a + 1.486634).abs() < 1e-5);
        assert!((params.slope_b - 16.285493).abs() < 1e-4);
        assert_eq!(params.elevator_pwm, 1500);
        assert!(params.is_valid());
    }

    #[test]
    fn test_deepstall_params_from_store() {
        let mut store = ParameterStore::new();
        DeepstallParams::register_defaults(&mut store).unwrap();
        assert_eq!(DeepstallParams::from_store(&store), DeepstallParams::default());
    }

    #[test]
    fn test_l1_period_and_gain_are_distinct() {
        let mut store = ParameterStore::new();
        DeepstallParams::register_defaults(&mut store).unwrap();
        store.set("LAND_DS_L1", ParamValue::Float(20.0)).unwrap();
        store.set("LAND_DS_L1_I", ParamValue::Float(0.05)).unwrap();

        let params = DeepstallParams::from_store(&store);
        assert!((params.l1_period - 20.0).abs() < 0.001);
        assert!((params.l1_i - 0.05).abs() < 0.001);
    }

    #[test]
    fn test_deepstall_params_clamp() {
        let mut store = ParameterStore::new();
        DeepstallParams::register_defaults(&mut store).unwrap();
        store.set("LAND_DS_ELEV_PWM", ParamValue::Int(3000)).unwrap();
        store.set("LAND_DS_L1", ParamValue::Float(1.0)).unwrap();

        let params = DeepstallParams::from_store(&store);
        assert_eq!(params.elevator_pwm, 2100);
        assert!((params.l1_period - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_inverted_handoff_window_invalid() {
        let params = DeepstallParams {
            handoff_airspeed: 8.0,
            handoff_lower_limit_airspeed: 12.0,
            ..Default::default()
        };
        assert!(!params.is_valid());
    }

    #[test]
    fn test_pid_gains() {
        let gains = DeepstallParams::default().pid_gains();
        assert_eq!(gains, PidGains::new(4.0, 0.5, 0.01, 0.2));
    }
}
