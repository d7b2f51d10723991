//! Landing Parameter Definitions
//!
//! Parameters shared by every landing type, following ArduPlane's `LAND_`
//! group.
//!
//! # Parameters
//!
//! - `LAND_TYPE` - Landing strategy (0=glide slope, 1=deepstall)
//! - `LAND_SLOPE_RCALC` - Rangefinder correction (m) that triggers a slope recalculation
//! - `LAND_ABORT_DEG` - Slope steepening (deg) after recalculation that aborts the landing
//! - `LAND_PITCH_CD` - Minimum pitch during the final flare (centidegrees)
//! - `LAND_FLARE_ALT` / `LAND_FLARE_SEC` - Flare trigger by height or time to touchdown
//! - `LAND_PF_ALT` / `LAND_PF_SEC` / `LAND_PF_ARSPD` - Pre-flare trigger and airspeed
//! - `LAND_THR_SLEW` - Throttle slew rate during landing (percent/s, 0 = default)
//! - `LAND_DISARMDELAY` - Seconds after touchdown before auto-disarm
//! - `LAND_THEN_NEUTRL` - Servo behavior after landing (0 off, 1 trim, 2 neutral)
//! - `LAND_ABORT_THR` - Allow a throttle-stick abort
//! - `LAND_FLAP_PERCNT` - Flap deployment during landing (percent)

use super::error::ParameterError;
use super::storage::{read_f32, read_i32, ParamValue, ParameterStore};

const DEFAULT_TYPE: i32 = 0;

const DEFAULT_SLOPE_RCALC: f32 = 2.0;
const MIN_SLOPE_RCALC: f32 = 0.0;
const MAX_SLOPE_RCALC: f32 = 5.0;

const DEFAULT_ABORT_DEG: f32 = 0.0;
const MIN_ABORT_DEG: f32 = 0.0;
const MAX_ABORT_DEG: f32 = 90.0;

const DEFAULT_PITCH_CD: i32 = 0;
const MIN_PITCH_CD: i32 = -9000;
const MAX_PITCH_CD: i32 = 9000;

const DEFAULT_FLARE_ALT: f32 = 3.0;
const DEFAULT_FLARE_SEC: f32 = 2.0;
const MIN_FLARE: f32 = 0.0;
const MAX_FLARE_ALT: f32 = 30.0;
const MAX_FLARE_SEC: f32 = 10.0;

const DEFAULT_PF_ALT: f32 = 10.0;
const DEFAULT_PF_SEC: f32 = 6.0;
const DEFAULT_PF_ARSPD: f32 = 0.0;
const MAX_PF_ALT: f32 = 30.0;
const MAX_PF_SEC: f32 = 10.0;
const MAX_PF_ARSPD: f32 = 30.0;

const DEFAULT_THR_SLEW: i32 = 0;
const DEFAULT_DISARM_DELAY: i32 = 20;
const MAX_SLEW_OR_DELAY: i32 = 127;

const DEFAULT_THEN_NEUTRAL: i32 = 0;
const DEFAULT_ABORT_THR: i32 = 0;
const DEFAULT_FLAP_PERCENT: i32 = 0;

/// Landing parameters loaded from parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct LandingParams {
    /// Raw `LAND_TYPE`; validated by the landing dispatcher
    pub landing_type: i32,
    pub slope_recalc_shallow_threshold: f32,
    pub slope_recalc_steep_threshold_to_abort: f32,
    pub pitch_cd: i32,
    pub flare_alt: f32,
    pub flare_sec: f32,
    pub pre_flare_alt: f32,
    pub pre_flare_sec: f32,
    pub pre_flare_airspeed: f32,
    pub throttle_slewrate: u8,
    pub disarm_delay: u8,
    pub then_servos_neutral: u8,
    pub abort_throttle_enable: bool,
    pub flap_percent: u8,
}

impl Default for LandingParams {
    fn default() -> Self {
        Self {
            landing_type: DEFAULT_TYPE,
            slope_recalc_shallow_threshold: DEFAULT_SLOPE_RCALC,
            slope_recalc_steep_threshold_to_abort: DEFAULT_ABORT_DEG,
            pitch_cd: DEFAULT_PITCH_CD,
            flare_alt: DEFAULT_FLARE_ALT,
            flare_sec: DEFAULT_FLARE_SEC,
            pre_flare_alt: DEFAULT_PF_ALT,
            pre_flare_sec: DEFAULT_PF_SEC,
            pre_flare_airspeed: DEFAULT_PF_ARSPD,
            throttle_slewrate: DEFAULT_THR_SLEW as u8,
            disarm_delay: DEFAULT_DISARM_DELAY as u8,
            then_servos_neutral: DEFAULT_THEN_NEUTRAL as u8,
            abort_throttle_enable: DEFAULT_ABORT_THR != 0,
            flap_percent: DEFAULT_FLAP_PERCENT as u8,
        }
    }
}

impl LandingParams {
    /// Register landing parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register("LAND_TYPE", ParamValue::Int(DEFAULT_TYPE))?;
        store.register("LAND_SLOPE_RCALC", ParamValue::Float(DEFAULT_SLOPE_RCALC))?;
        store.register("LAND_ABORT_DEG", ParamValue::Float(DEFAULT_ABORT_DEG))?;
        store.register("LAND_PITCH_CD", ParamValue::Int(DEFAULT_PITCH_CD))?;
        store.register("LAND_FLARE_ALT", ParamValue::Float(DEFAULT_FLARE_ALT))?;
        store.register("LAND_FLARE_SEC", ParamValue::Float(DEFAULT_FLARE_SEC))?;
        store.register("LAND_PF_ALT", ParamValue::Float(DEFAULT_PF_ALT))?;
        store.register("LAND_PF_SEC", ParamValue::Float(DEFAULT_PF_SEC))?;
        store.register("LAND_PF_ARSPD", ParamValue::Float(DEFAULT_PF_ARSPD))?;
        store.register("LAND_THR_SLEW", ParamValue::Int(DEFAULT_THR_SLEW))?;
        store.register("LAND_DISARMDELAY", ParamValue::Int(DEFAULT_DISARM_DELAY))?;
        store.register("LAND_THEN_NEUTRL", ParamValue::Int(DEFAULT_THEN_NEUTRAL))?;
        store.register("LAND_ABORT_THR", ParamValue::Int(DEFAULT_ABORT_THR))?;
        store.register("LAND_FLAP_PERCNT", ParamValue::Int(DEFAULT_FLAP_PERCENT))?;
        Ok(())
    }

    /// Load landing parameters from parameter store
    ///
    /// Out-of-range values are clamped. `LAND_TYPE` is passed through
    /// unchanged so an invalid selection reaches the dispatcher.
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            landing_type: store
                .get("LAND_TYPE")
                .map(ParamValue::as_i32)
                .unwrap_or(DEFAULT_TYPE),
            slope_recalc_shallow_threshold: read_f32(
                store,
                "LAND_SLOPE_RCALC",
                DEFAULT_SLOPE_RCALC,
                MIN_SLOPE_RCALC,
                MAX_SLOPE_RCALC,
            ),
            slope_recalc_steep_threshold_to_abort: read_f32(
                store,
                "LAND_ABORT_DEG",
                DEFAULT_ABORT_DEG,
                MIN_ABORT_DEG,
                MAX_ABORT_DEG,
            ),
            pitch_cd: read_i32(store, "LAND_PITCH_CD", DEFAULT_PITCH_CD, MIN_PITCH_CD, MAX_PITCH_CD),
            flare_alt: read_f32(store, "LAND_FLARE_ALT", DEFAULT_FLARE_ALT, MIN_FLARE, MAX_FLARE_ALT),
            flare_sec: read_f32(store, "LAND_FLARE_SEC", DEFAULT_FLARE_SEC, MIN_FLARE, MAX_FLARE_SEC),
            pre_flare_alt: read_f32(store, "LAND_PF_ALT", DEFAULT_PF_ALT, 0.0, MAX_PF_ALT),
            pre_flare_sec: read_f32(store, "LAND_PF_SEC", DEFAULT_PF_SEC, 0.0, MAX_PF_SEC),
            pre_flare_airspeed: read_f32(store, "LAND_PF_ARSPD", DEFAULT_PF_ARSPD, 0.0, MAX_PF_ARSPD),
            throttle_slewrate: read_i32(store, "LAND_THR_SLEW", DEFAULT_THR_SLEW, 0, MAX_SLEW_OR_DELAY)
                as u8,
            disarm_delay: read_i32(
                store,
                "LAND_DISARMDELAY",
                DEFAULT_DISARM_DELAY,
                0,
                MAX_SLEW_OR_DELAY,
            ) as u8,
            then_servos_neutral: read_i32(store, "LAND_THEN_NEUTRL", DEFAULT_THEN_NEUTRAL, 0, 2)
                as u8,
            abort_throttle_enable: read_i32(store, "LAND_ABORT_THR", DEFAULT_ABORT_THR, 0, 1) != 0,
            flap_percent: read_i32(store, "LAND_FLAP_PERCNT", DEFAULT_FLAP_PERCENT, 0, 100) as u8,
        }
    }

    /// Validate landing parameters
    pub fn is_valid(&self) -> bool {
        (0..=1).contains(&self.landing_type)
            && self.flare_alt >= MIN_FLARE
            && self.flare_sec >= MIN_FLARE
            && self.pre_flare_airspeed >= 0.0
            && self.flap_percent <= 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_params_defaults() {
        let params = LandingParams::default();
        assert_eq!(params.landing_type, 0);
        assert!((params.flare_alt - 3.0).abs() < 0.001);
        assert!((params.flare_sec - 2.0).abs() < 0.001);
        assert!((params.pre_flare_alt - 10.0).abs() < 0.001);
        assert_eq!(params.disarm_delay, 20);
        assert!(params.is_valid());
    }

    #[test]
    fn test_landing_params_from_store() {
        let mut store = ParameterStore::new();
        LandingParams::register_defaults(&mut store).unwrap();
        assert_eq!(LandingParams::from_store(&store), LandingParams::default());
    }

    #[test]
    fn test_landing_params_clamp() {
        let mut store = ParameterStore::new();
        LandingParams::register_defaults(&mut store).unwrap();
        store.set("LAND_SLOPE_RCALC", ParamValue::Float(12.0)).unwrap();
        store.set("LAND_FLAP_PERCNT", ParamValue::Int(250)).unwrap();

        let params = LandingParams::from_store(&store);
        assert!((params.slope_recalc_shallow_threshold - 5.0).abs() < 0.001);
        assert_eq!(params.flap_percent, 100);
    }

    #[test]
    fn test_invalid_type_passes_through() {
        let mut store = ParameterStore::new();
        LandingParams::register_defaults(&mut store).unwrap();
        store.set("LAND_TYPE", ParamValue::Int(7)).unwrap();

        let params = LandingParams::from_store(&store);
        assert_eq!(params.landing_type, 7);
        assert!(!params.is_valid());
    }
}
