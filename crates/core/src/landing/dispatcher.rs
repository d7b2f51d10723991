//! Landing type dispatch
//!
//! The vehicle talks to one [`LandingDispatcher`] regardless of
//! `LAND_TYPE`. It owns the selected strategy, tracks whether a landing
//! is in progress, and answers queries outside a landing with the values
//! normal flight expects.

use crate::control::PidInfo;
use crate::gcs::Severity;
use crate::mission::MissionCommand;
use crate::navigation::{Location, VehicleState};
use crate::parameters::{AirframeParams, DeepstallParams, LandingParams, ParameterStore};
use crate::servo::ControlSurfaces;

use super::deepstall::Deepstall;
use super::restart::{restart_landing_sequence, RestartPoint};
use super::slope::StandardGlideSlope;
use super::{
    GlideSlopeTarget, LandingContext, LandingError, LandingIo, LandingStrategy, LandingType,
    RangefinderState, SlopeAdjustment,
};

/// Strategy selected by the last configuration
#[derive(Debug, Clone)]
pub enum ActiveLanding {
    GlideSlope(StandardGlideSlope),
    Deepstall(Deepstall),
    /// `LAND_TYPE` value with no strategy behind it
    Unsupported(i32),
}

/// Inputs to `verify_abort_landing`
#[derive(Debug, Clone, Copy)]
pub struct AbortContext {
    pub prev_wp: Location,
    pub next_wp: Location,
    pub current: Location,
    /// Altitude above home, cm
    pub relative_alt_cm: i32,
    /// Altitude above home the climb-out must reach, cm
    pub takeoff_alt_rel_cm: i32,
}

/// Result of one abort-climb tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbortStatus {
    pub throttle_suppressed: bool,
    /// Replacement for the landing waypoint once the climb is complete
    pub next_wp: Option<Location>,
    /// Restart attempt made this tick
    pub restart: Option<Result<RestartPoint, LandingError>>,
}

/// Owner of the active landing strategy
#[derive(Debug, Clone)]
pub struct LandingDispatcher {
    active: ActiveLanding,
    airframe: AirframeParams,
    in_progress: bool,
    commanded_go_around: bool,
}

impl LandingDispatcher {
    pub fn new(landing: &LandingParams, deepstall: &DeepstallParams, airframe: &AirframeParams) -> Self {
        Self {
            active: Self::select(landing, deepstall, airframe),
            airframe: airframe.clone(),
            in_progress: false,
            commanded_go_around: false,
        }
    }

    /// Build from the current parameter values
    pub fn from_store(store: &ParameterStore) -> Self {
        Self::new(
            &LandingParams::from_store(store),
            &DeepstallParams::from_store(store),
            &AirframeParams::from_store(store),
        )
    }

    /// Apply new parameters. Refused while a landing is in progress.
    pub fn reconfigure(
        &mut self,
        landing: &LandingParams,
        deepstall: &DeepstallParams,
        airframe: &AirframeParams,
    ) -> Result<(), LandingError> {
        if self.in_progress {
            return Err(LandingError::InProgress);
        }
        self.active = Self::select(landing, deepstall, airframe);
        self.airframe = airframe.clone();
        Ok(())
    }

    fn select(
        landing: &LandingParams,
        deepstall: &DeepstallParams,
        airframe: &AirframeParams,
    ) -> ActiveLanding {
        match LandingType::try_from(landing.landing_type) {
            Ok(LandingType::StandardGlideSlope) => {
                ActiveLanding::GlideSlope(StandardGlideSlope::new(landing, airframe))
            }
            Ok(LandingType::Deepstall) => ActiveLanding::Deepstall(Deepstall::new(deepstall, airframe)),
            Err(_) => ActiveLanding::Unsupported(landing.landing_type),
        }
    }

    pub fn landing_type(&self) -> Result<LandingType, LandingError> {
        match &self.active {
            ActiveLanding::GlideSlope(_) => Ok(LandingType::StandardGlideSlope),
            ActiveLanding::Deepstall(_) => Ok(LandingType::Deepstall),
            ActiveLanding::Unsupported(raw) => Err(LandingError::InvalidType(*raw)),
        }
    }

    pub fn active(&self) -> &ActiveLanding {
        &self.active
    }

    pub fn deepstall(&self) -> Option<&Deepstall> {
        match &self.active {
            ActiveLanding::Deepstall(ds) => Some(ds),
            _ => None,
        }
    }

    pub fn glide_slope(&self) -> Option<&StandardGlideSlope> {
        match &self.active {
            ActiveLanding::GlideSlope(slope) => Some(slope),
            _ => None,
        }
    }

    fn strategy(&self) -> Option<&dyn LandingStrategy> {
        match &self.active {
            ActiveLanding::GlideSlope(slope) => Some(slope),
            ActiveLanding::Deepstall(ds) => Some(ds),
            ActiveLanding::Unsupported(_) => None,
        }
    }

    fn strategy_mut(&mut self) -> Option<&mut dyn LandingStrategy> {
        match &mut self.active {
            ActiveLanding::GlideSlope(slope) => Some(slope),
            ActiveLanding::Deepstall(ds) => Some(ds),
            ActiveLanding::Unsupported(_) => None,
        }
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn commanded_go_around(&self) -> bool {
        self.commanded_go_around
    }

    /// The vehicle entered or left its landing flight stage
    pub fn handle_flight_stage_change(&mut self, in_landing_stage: bool) {
        self.in_progress = in_landing_stage;
        self.commanded_go_around = false;
    }

    pub fn do_land(
        &mut self,
        cmd: &MissionCommand,
        relative_altitude: f32,
        state: &VehicleState,
        io: &mut LandingIo<'_>,
    ) {
        self.commanded_go_around = false;
        // An unsupported type is reported from verify_land
        if let Some(strategy) = self.strategy_mut() {
            strategy.do_land(cmd, relative_altitude, state, io);
        }
    }

    /// True when the landing mission item is finished
    pub fn verify_land(&mut self, ctx: &LandingContext<'_>, io: &mut LandingIo<'_>) -> bool {
        match self.strategy_mut() {
            Some(strategy) => strategy.verify_land(ctx, io),
            None => {
                // Completing the item moves the mission on instead of
                // looping on a landing that can never run
                io.gcs.send_text(
                    Severity::Critical,
                    format_args!("Landing configuration error, invalid LAND_TYPE"),
                );
                true
            }
        }
    }

    /// Climb-out after an aborted landing. Once above the takeoff
    /// altitude the mission is rewound to fly the landing again.
    pub fn verify_abort_landing(&mut self, ctx: &AbortContext, io: &mut LandingIo<'_>) -> AbortStatus {
        let throttle_suppressed = match self.strategy_mut() {
            Some(strategy) => strategy.verify_abort_landing(&ctx.prev_wp, &ctx.next_wp, io),
            None => false,
        };

        let mut status = AbortStatus {
            throttle_suppressed,
            next_wp: None,
            restart: None,
        };

        if ctx.relative_alt_cm > ctx.takeoff_alt_rel_cm {
            status.next_wp = Some(ctx.current);
            io.mission.stop();
            let result = self.restart_landing_sequence(&ctx.current, io);
            if result.is_ok() {
                io.mission.resume();
            }
            status.restart = Some(result);
        }
        status
    }

    pub fn restart_landing_sequence(
        &mut self,
        current: &Location,
        io: &mut LandingIo<'_>,
    ) -> Result<RestartPoint, LandingError> {
        restart_landing_sequence(io.mission, current, io.gcs)
    }

    pub fn setup_landing_glide_slope(
        &mut self,
        prev_wp: &Location,
        next_wp: &Location,
        state: &VehicleState,
        io: &mut LandingIo<'_>,
    ) -> Option<GlideSlopeTarget> {
        self.strategy_mut()?
            .setup_landing_glide_slope(prev_wp, next_wp, state, io.gcs)
    }

    pub fn adjust_landing_slope_for_rangefinder_bump(
        &mut self,
        rangefinder: &mut RangefinderState,
        prev_wp: &mut Location,
        next_wp: &Location,
        state: &VehicleState,
        wp_distance: f32,
        io: &mut LandingIo<'_>,
    ) -> Option<SlopeAdjustment> {
        let adjustment = self.strategy_mut()?.adjust_landing_slope_for_rangefinder_bump(
            rangefinder,
            prev_wp,
            next_wp,
            state,
            wp_distance,
            io.gcs,
        )?;
        if adjustment.abort_requested {
            self.commanded_go_around = true;
        }
        Some(adjustment)
    }

    pub fn is_flaring(&self) -> bool {
        self.in_progress && self.strategy().map_or(false, |s| s.is_flaring())
    }

    pub fn is_on_approach(&self) -> bool {
        self.in_progress && self.strategy().map_or(false, |s| s.is_on_approach())
    }

    pub fn is_ground_steering_allowed(&self) -> bool {
        !self.in_progress || self.strategy().map_or(true, |s| s.is_ground_steering_allowed())
    }

    pub fn is_expecting_impact(&self) -> bool {
        self.in_progress && self.strategy().map_or(false, |s| s.is_expecting_impact())
    }

    /// True if the landing drove the surfaces this tick
    pub fn control_servos(&mut self, state: &VehicleState, surfaces: &mut dyn ControlSurfaces) -> bool {
        if !self.in_progress {
            return false;
        }
        self.strategy_mut()
            .map_or(false, |s| s.control_servos(state, surfaces))
    }

    /// Ask for a go-around. False when the current stage cannot climb out.
    pub fn request_go_around(&mut self) -> bool {
        let accepted = self.strategy_mut().map_or(false, |s| s.request_go_around());
        if accepted {
            self.commanded_go_around = true;
        }
        accepted
    }

    pub fn is_complete(&self) -> bool {
        self.strategy().map_or(true, |s| s.is_complete())
    }

    pub fn is_throttle_suppressed(&self) -> bool {
        self.in_progress && self.strategy().map_or(false, |s| s.is_throttle_suppressed())
    }

    pub fn target_airspeed_cm(&self, state: &VehicleState) -> i32 {
        if !self.in_progress {
            return self.airframe.airspeed_cruise_cm;
        }
        match self.strategy() {
            Some(strategy) => strategy.target_airspeed_cm(state),
            None => (self.airframe.land_airspeed_or_cruise() * 100.0) as i32,
        }
    }

    pub fn target_altitude_location(&self) -> Option<Location> {
        if !self.in_progress {
            return None;
        }
        self.strategy()?.target_altitude_location()
    }

    pub fn constrain_roll(&self, desired_roll_cd: i32, level_roll_limit_cd: i32) -> i32 {
        match self.strategy() {
            Some(strategy) => strategy.constrain_roll(desired_roll_cd, level_roll_limit_cd),
            None => desired_roll_cd,
        }
    }

    pub fn navigation_target(&self) -> Option<Location> {
        self.strategy()?.navigation_target()
    }

    pub fn rudder_command(&self) -> f32 {
        self.strategy().map_or(0.0, |s| s.rudder_command())
    }

    pub fn pid_info(&self) -> Option<PidInfo> {
        self.strategy()?.pid_info()
    }

    /// Drop the active strategy back to its safe stage
    pub fn abort(&mut self) {
        if let Some(strategy) = self.strategy_mut() {
            strategy.abort();
        }
    }
}
