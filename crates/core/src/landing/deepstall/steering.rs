//! Deepstall rudder steering
//!
//! Once the wing is stalled, ailerons lose authority and the aircraft is
//! steered with rudder alone. An L1-style cross-track term turns the
//! offset from the approach line into a course correction, a first-order
//! time constant turns the course error into a desired yaw rate, and the
//! PID tracks that rate.

use core::f32::consts::PI;

use libm::{asinf, atan2f, cosf, sinf};
use nalgebra::Vector2;

use crate::control::{saturate, wrap, PidController, PidInfo};
use crate::navigation::geo::{diff_ne, wrap_pi};
use crate::navigation::Location;
use crate::parameters::DeepstallParams;

use super::approach::ApproachPath;

/// Step substituted on the first tick, on repeated timestamps and after
/// long gaps, milliseconds
pub const NOMINAL_DT_MS: u32 = 10;

const MAX_DT_MS: u32 = 1000;
const XTRACK_I_LIMIT: f32 = 0.5;
const NU1_MIN: f32 = -0.7071;
const NU1_MAX: f32 = 0.7107;

/// Aircraft state the steering law needs
#[derive(Debug, Clone, Copy)]
pub struct SteeringInputs {
    pub now_ms: u32,
    pub location: Location,
    /// Ground track in radians
    pub ground_course_rad: f32,
    /// Yaw rate in radians per second
    pub yaw_rate_rads: f32,
}

/// Rudder controller for the final stalled descent
#[derive(Debug, Clone)]
pub struct SteeringController {
    pid: PidController,
    l1_period: f32,
    l1_i: f32,
    yaw_rate_limit_rad: f32,
    time_constant: f32,
    last_ms: Option<u32>,
    xtrack_i: f32,
    crosstrack_error: f32,
    rudder: f32,
}

impl SteeringController {
    pub fn new(params: &DeepstallParams) -> Self {
        Self {
            pid: PidController::new(params.pid_gains()),
            l1_period: params.l1_period,
            l1_i: params.l1_i,
            yaw_rate_limit_rad: params.yaw_rate_limit.to_radians(),
            time_constant: params.time_constant,
            last_ms: None,
            xtrack_i: 0.0,
            crosstrack_error: 0.0,
            rudder: 0.0,
        }
    }

    /// Compute a rudder command in -1..1 for tracking `path`
    pub fn update(&mut self, inputs: &SteeringInputs, path: &ApproachPath) -> f32 {
        let dt_ms = match self.last_ms {
            Some(last) => match inputs.now_ms.wrapping_sub(last) {
                dt if dt == 0 || dt > MAX_DT_MS => NOMINAL_DT_MS,
                dt => dt,
            },
            None => NOMINAL_DT_MS,
        };
        self.last_ms = Some(inputs.now_ms);

        let track = diff_ne(&path.loiter_exit, &path.extended_approach);
        let ab = if track.norm() > f32::EPSILON {
            track.normalize()
        } else {
            Vector2::new(cosf(path.heading_deg.to_radians()), sinf(path.heading_deg.to_radians()))
        };
        let to_aircraft = diff_ne(&path.loiter_exit, &inputs.location);
        self.crosstrack_error = to_aircraft.perp(&ab);

        let mut nu1 = asinf(
            (self.crosstrack_error / self.l1_period.max(0.1)).clamp(NU1_MIN, NU1_MAX),
        );
        if self.l1_i > 0.0 {
            self.xtrack_i = (self.xtrack_i + nu1 * self.l1_i / dt_ms as f32)
                .clamp(-XTRACK_I_LIMIT, XTRACK_I_LIMIT);
            nu1 += self.xtrack_i;
        }

        let course = path.heading_deg.to_radians();
        let target_track = wrap_pi(course + nu1);
        let delta = target_track - inputs.ground_course_rad;
        let track_error = atan2f(sinf(delta), cosf(delta));

        let desired_rate = (track_error / self.time_constant.max(0.01))
            .clamp(-self.yaw_rate_limit_rad, self.yaw_rate_limit_rad);
        let rate_error = wrap(desired_rate - inputs.yaw_rate_rads, -PI, PI);

        let dt = dt_ms as f32 * 0.001;
        let output = saturate(self.pid.run(dt, rate_error), -1.0, 1.0);
        self.rudder = if output.is_finite() { output } else { 0.0 };
        self.rudder
    }

    /// Clear timing, integrators and the last command
    pub fn reset(&mut self) {
        self.pid.reset_integrator();
        self.last_ms = None;
        self.xtrack_i = 0.0;
        self.crosstrack_error = 0.0;
        self.rudder = 0.0;
    }

    pub fn rudder(&self) -> f32 {
        self.rudder
    }

    pub fn crosstrack_error(&self) -> f32 {
        self.crosstrack_error
    }

    pub fn xtrack_integrator(&self) -> f32 {
        self.xtrack_i
    }

    pub fn pid_info(&self) -> PidInfo {
        self.pid.info()
    }
}
