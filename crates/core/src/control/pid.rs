//! PID controller used by the deepstall yaw-rate loop
//!
//! The integrator accumulates `error * ki * dt` and is clamped to
//! `±ilim`, so the limit is expressed in output units. The first update
//! after construction or [`PidController::reset_integrator`] has no
//! derivative contribution.

use libm::{fabsf, fmodf};

/// Step substituted for a zero, negative, non-finite or stale `dt` (seconds)
pub const NOMINAL_DT: f32 = 0.01;

/// Intervals longer than this are treated as a missed tick (seconds)
const MAX_DT: f32 = 1.0;

/// Controller gains
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// Integrator limit, output units
    pub ilim: f32,
}

impl PidGains {
    pub const fn new(kp: f32, ki: f32, kd: f32, ilim: f32) -> Self {
        Self { kp, ki, kd, ilim }
    }
}

/// Per-term breakdown of the last update, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidInfo {
    pub error: f32,
    pub p: f32,
    pub i: f32,
    pub d: f32,
    pub output: f32,
}

#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    integrator: f32,
    last_error: Option<f32>,
    info: PidInfo,
}

impl PidController {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integrator: 0.0,
            last_error: None,
            info: PidInfo::default(),
        }
    }

    /// Replace gains, keeping the accumulated state
    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
        let limit = fabsf(gains.ilim);
        self.integrator = self.integrator.clamp(-limit, limit);
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Advance the controller by `dt` seconds with the given error
    pub fn run(&mut self, dt: f32, error: f32) -> f32 {
        let dt = if dt.is_finite() && dt > 0.0 && dt <= MAX_DT {
            dt
        } else {
            NOMINAL_DT
        };

        let limit = fabsf(self.gains.ilim);
        self.integrator = (self.integrator + error * self.gains.ki * dt).clamp(-limit, limit);

        let p = self.gains.kp * error;
        let d = match self.last_error {
            Some(last) => self.gains.kd * (error - last) / dt,
            None => 0.0,
        };
        self.last_error = Some(error);

        let output = p + self.integrator + d;
        self.info = PidInfo {
            error,
            p,
            i: self.integrator,
            d,
            output,
        };
        output
    }

    /// Clear the integrator and derivative history
    pub fn reset_integrator(&mut self) {
        self.integrator = 0.0;
        self.last_error = None;
    }

    pub fn integrator(&self) -> f32 {
        self.integrator
    }

    pub fn info(&self) -> PidInfo {
        self.info
    }
}

/// Clamp `value` to `[lo, hi]`
///
/// Unlike `f32::clamp` this never panics on inverted bounds.
pub fn saturate(value: f32, lo: f32, hi: f32) -> f32 {
    value.max(lo).min(hi)
}

/// Normalize `angle` into `[lo, hi)` by whole multiples of the range width
pub fn wrap(angle: f32, lo: f32, hi: f32) -> f32 {
    let width = hi - lo;
    if width.is_nan() || width <= 0.0 || !angle.is_finite() {
        return angle;
    }
    let mut a = fmodf(angle - lo, width);
    if a < 0.0 {
        a += width;
    }
    a + lo
}
