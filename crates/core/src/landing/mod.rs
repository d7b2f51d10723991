//! Fixed-wing autonomous landing
//!
//! A [`LandingDispatcher`] owns one landing strategy, selected by the
//! `LAND_TYPE` parameter, and forwards the vehicle's landing hooks to it.
//! Two strategies exist:
//!
//! - [`slope::StandardGlideSlope`]: conventional glide slope with pre-flare and flare
//! - [`deepstall::Deepstall`]: loiter down, line up, then stall the wing
//!   and drop onto the landing point under rudder steering
//!
//! # Data flow
//!
//! ```text
//! mission NAV_LAND -> do_land() -> verify_land() each nav tick
//!                                      |
//!                   NavController <----+----> StatusTextSink
//!                                      |
//!                    control_servos() each servo tick -> ControlSurfaces
//! ```
//!
//! Strategies never call back into the vehicle. Every collaborator is
//! passed in per call through [`LandingIo`] or an explicit argument.

pub mod deepstall;
pub mod dispatcher;
pub mod restart;
pub mod slope;
pub mod wind;

pub use deepstall::{Deepstall, DeepstallStage};
pub use dispatcher::{AbortContext, AbortStatus, LandingDispatcher};
pub use restart::{restart_landing_sequence, RestartPoint};
pub use slope::{SlopeStage, StandardGlideSlope};

use core::fmt;

use crate::control::PidInfo;
use crate::gcs::StatusTextSink;
use crate::mission::{MissionCommand, MissionStore};
use crate::navigation::controller::NavController;
use crate::navigation::{Location, VehicleState};
use crate::servo::ControlSurfaces;

/// Landing strategy selected by `LAND_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingType {
    StandardGlideSlope = 0,
    Deepstall = 1,
}

impl TryFrom<i32> for LandingType {
    type Error = LandingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LandingType::StandardGlideSlope),
            1 => Ok(LandingType::Deepstall),
            other => Err(LandingError::InvalidType(other)),
        }
    }
}

/// Landing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingError {
    /// `LAND_TYPE` names no known strategy
    InvalidType(i32),
    /// The current mission item is not a landing
    NotLanding,
    /// No restart point found in the mission
    RestartFailed,
    /// Strategy change requested during a landing
    InProgress,
}

impl fmt::Display for LandingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LandingError::InvalidType(t) => write!(f, "invalid LAND_TYPE {}", t),
            LandingError::NotLanding => write!(f, "current mission item is not a landing"),
            LandingError::RestartFailed => write!(f, "unable to restart landing sequence"),
            LandingError::InProgress => write!(f, "landing in progress"),
        }
    }
}

/// Per-tick inputs to `verify_land`
#[derive(Debug, Clone, Copy)]
pub struct LandingContext<'a> {
    /// Previous waypoint (start of the final leg)
    pub prev_wp: Location,
    /// Landing waypoint
    pub next_wp: Location,
    pub state: &'a VehicleState,
    /// Height above the landing point in meters
    pub height: f32,
    /// Sink rate in m/s, positive down
    pub sink_rate: f32,
    /// Along-track proportion of the final leg
    pub wp_proportion: f32,
    /// Last time the vehicle was judged to be flying
    pub last_flying_ms: u32,
    pub is_armed: bool,
    pub is_flying: bool,
    /// Rangefinder currently has a valid reading of the ground
    pub rangefinder_in_range: bool,
}

/// Rangefinder altitude correction tracked across ticks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangefinderState {
    pub in_range: bool,
    /// Rangefinder height minus baro height, meters
    pub correction: f32,
    /// Correction at the last glide slope calculation
    pub last_stable_correction: f32,
}

/// Result of a glide slope calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlideSlopeTarget {
    /// Point on the slope projected past the landing point
    pub location: Location,
    /// Altitude offset of `location` from the previous waypoint, cm
    pub altitude_offset_cm: i32,
    /// Remaining proportion of the slope, 1.0 at the previous waypoint
    pub proportion: f32,
    /// Target altitude for this position on the slope, cm
    pub target_alt_cm: i32,
    /// Slope in meters of descent per meter travelled
    pub slope: f32,
}

/// Outcome of a rangefinder slope correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeAdjustment {
    pub target: GlideSlopeTarget,
    /// The corrected slope is too steep and the landing should go around
    pub abort_requested: bool,
}

/// Collaborators passed into strategy hooks
pub struct LandingIo<'a> {
    pub nav: &'a mut dyn NavController,
    pub mission: &'a mut dyn MissionStore,
    pub gcs: &'a mut dyn StatusTextSink,
}

/// One landing technique
///
/// Default implementations describe a strategy that takes no part in the
/// corresponding phase.
pub trait LandingStrategy {
    fn landing_type(&self) -> LandingType;

    /// A landing mission item has started
    fn do_land(
        &mut self,
        cmd: &MissionCommand,
        relative_altitude: f32,
        state: &VehicleState,
        io: &mut LandingIo<'_>,
    );

    /// Per-tick landing update. True once the mission item is complete.
    fn verify_land(&mut self, ctx: &LandingContext<'_>, io: &mut LandingIo<'_>) -> bool;

    /// Per-tick update while climbing out of an aborted landing.
    /// Returns whether throttle stays suppressed.
    fn verify_abort_landing(
        &mut self,
        prev_wp: &Location,
        next_wp: &Location,
        io: &mut LandingIo<'_>,
    ) -> bool;

    fn setup_landing_glide_slope(
        &mut self,
        _prev_wp: &Location,
        _next_wp: &Location,
        _state: &VehicleState,
        _gcs: &mut dyn StatusTextSink,
    ) -> Option<GlideSlopeTarget> {
        None
    }

    fn adjust_landing_slope_for_rangefinder_bump(
        &mut self,
        _rangefinder: &mut RangefinderState,
        _prev_wp: &mut Location,
        _next_wp: &Location,
        _state: &VehicleState,
        _wp_distance: f32,
        _gcs: &mut dyn StatusTextSink,
    ) -> Option<SlopeAdjustment> {
        None
    }

    fn is_flaring(&self) -> bool {
        false
    }

    fn is_on_approach(&self) -> bool {
        false
    }

    fn is_ground_steering_allowed(&self) -> bool {
        true
    }

    fn is_expecting_impact(&self) -> bool {
        false
    }

    /// Override servo outputs. True if the strategy took control.
    fn control_servos(&mut self, _state: &VehicleState, _surfaces: &mut dyn ControlSurfaces) -> bool {
        false
    }

    /// True if a go-around is accepted in the current stage
    fn request_go_around(&mut self) -> bool {
        false
    }

    fn is_complete(&self) -> bool {
        false
    }

    fn is_throttle_suppressed(&self) -> bool {
        false
    }

    fn target_airspeed_cm(&self, state: &VehicleState) -> i32;

    fn target_altitude_location(&self) -> Option<Location> {
        None
    }

    fn constrain_roll(&self, desired_roll_cd: i32, _level_roll_limit_cd: i32) -> i32 {
        desired_roll_cd
    }

    /// Last navigation target, if the strategy steers itself
    fn navigation_target(&self) -> Option<Location> {
        None
    }

    /// Normalized rudder demand from the strategy's own steering
    fn rudder_command(&self) -> f32 {
        0.0
    }

    fn pid_info(&self) -> Option<PidInfo> {
        None
    }

    /// Drop back to a safe stage and clear controller state
    fn abort(&mut self) {}
}
