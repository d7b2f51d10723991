//! Deepstall landing
//!
//! The aircraft loiters down to the approach height near the landing
//! point, leaves the circle on the approach heading, and pulls the
//! elevator fully up at a computed entry point so that the stalled glide
//! ends on the landing point. During the stalled descent it is steered by
//! rudder only.
//!
//! # Stages
//!
//! ```text
//! ApproachTarget -> FlyToLoiter -> Loiter -> Approach -> Land
//!                        ^                      |
//!                        +------ missed --------+
//! ```
//!
//! [`Deepstall::abort`] drops back to `FlyToLoiter` from any stage.

pub mod approach;
pub mod steering;

use nalgebra::Vector3;

pub use approach::{ApproachPath, ApproachPathPlanner, EXTENDED_APPROACH_DISTANCE};
pub use steering::{SteeringController, SteeringInputs, NOMINAL_DT_MS};

use crate::control::{saturate, PidInfo};
use crate::gcs::{Severity, StatusTextSink};
use crate::mission::MissionCommand;
use crate::navigation::controller::NavController;
use crate::navigation::geo::{
    calculate_bearing_cd, calculate_distance, passed_point, project_position, wrap_180_cd,
    wrap_360,
};
use crate::navigation::{Location, VehicleState};
use crate::parameters::{AirframeParams, DeepstallParams};
use crate::servo::{interpolate_pwm, ControlSurfaces};

use super::wind::into_wind_heading_deg;
use super::{LandingContext, LandingIo, LandingStrategy, LandingType};

/// Beyond this distance from the landing point the aircraft is still
/// en route, meters
const APPROACH_DISTANCE: f32 = 500.0;

/// Turn needed on the loiter circle before breakout, centidegrees
const LOITER_TURN_CD: i32 = 36000;

/// Allowed difference between ground track and approach bearing at
/// breakout, centidegrees
const BREAKOUT_TRACK_TOLERANCE_CD: i32 = 1000;

/// Allowed altitude error at breakout, cm
const BREAKOUT_ALT_TOLERANCE_CM: i32 = 500;

const STAGE_COUNT: usize = 5;

/// Deepstall stage, in flight order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeepstallStage {
    ApproachTarget,
    FlyToLoiter,
    Loiter,
    Approach,
    Land,
}

impl DeepstallStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApproachTarget => "ApproachTarget",
            Self::FlyToLoiter => "FlyToLoiter",
            Self::Loiter => "Loiter",
            Self::Approach => "Approach",
            Self::Land => "Land",
        }
    }
}

/// Approach geometry and whether it may be used for the final approach
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathState {
    /// Follows wind and heading changes, only used to find the loiter
    Provisional(ApproachPath),
    /// Fixed at loiter breakout for the rest of the attempt
    Locked(ApproachPath),
}

impl PathState {
    pub fn path(&self) -> &ApproachPath {
        match self {
            PathState::Provisional(path) | PathState::Locked(path) => path,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, PathState::Locked(_))
    }

    fn unlocked(self) -> Self {
        PathState::Provisional(*self.path())
    }
}

/// Moment the elevator started slewing to the stall position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StallEntry {
    pub time_ms: u32,
    pub initial_elevator_pwm: u16,
}

/// Per-tick inputs to target selection
pub struct NavigationInputs<'a> {
    pub location: Location,
    pub wind: Vector3<f32>,
    /// Height above the landing point, meters
    pub height: f32,
    pub ground_course_cd: i32,
    pub nav: &'a dyn NavController,
}

enum Step {
    Stay(Location),
    Next(DeepstallStage),
}

/// Deepstall landing strategy
#[derive(Debug, Clone)]
pub struct Deepstall {
    params: DeepstallParams,
    planner: ApproachPathPlanner,
    steering: SteeringController,
    loiter_radius: f32,
    airspeed_cruise_cm: i32,
    stage: DeepstallStage,
    landing_point: Location,
    approach_height: f32,
    /// 0 = into the wind
    commanded_heading_deg: f32,
    target_heading_deg: f32,
    path: Option<PathState>,
    loiter_sum_cd: i32,
    last_target_bearing_cd: Option<i32>,
    target: Location,
    stall_entry: Option<StallEntry>,
}

impl Deepstall {
    pub fn new(params: &DeepstallParams, airframe: &AirframeParams) -> Self {
        Self {
            params: params.clone(),
            planner: ApproachPathPlanner::new(params),
            steering: SteeringController::new(params),
            loiter_radius: airframe.loiter_radius,
            airspeed_cruise_cm: airframe.airspeed_cruise_cm,
            stage: DeepstallStage::ApproachTarget,
            landing_point: Location::default(),
            approach_height: 0.0,
            commanded_heading_deg: 0.0,
            target_heading_deg: 0.0,
            path: None,
            loiter_sum_cd: 0,
            last_target_bearing_cd: None,
            target: Location::default(),
            stall_entry: None,
        }
    }

    pub fn stage(&self) -> DeepstallStage {
        self.stage
    }

    pub fn path_state(&self) -> Option<&PathState> {
        self.path.as_ref()
    }

    pub fn loiter_sum_cd(&self) -> i32 {
        self.loiter_sum_cd
    }

    pub fn target_heading_deg(&self) -> f32 {
        self.target_heading_deg
    }

    pub fn approach_height(&self) -> f32 {
        self.approach_height
    }

    pub fn stall_entry(&self) -> Option<StallEntry> {
        self.stall_entry
    }

    pub fn steering(&self) -> &SteeringController {
        &self.steering
    }

    pub fn planner(&self) -> &ApproachPathPlanner {
        &self.planner
    }

    /// Choose this tick's navigation target, advancing the stage as needed
    pub fn update_target(&mut self, inputs: &NavigationInputs<'_>) -> (Location, DeepstallStage) {
        if self.path.is_none() {
            return (inputs.location, self.stage);
        }

        for _ in 0..STAGE_COUNT {
            let step = match self.stage {
                DeepstallStage::ApproachTarget => self.approach_target_step(inputs),
                DeepstallStage::FlyToLoiter => self.fly_to_loiter_step(inputs),
                DeepstallStage::Loiter => self.loiter_step(inputs),
                DeepstallStage::Approach => self.approach_step(inputs),
                DeepstallStage::Land => self.land_step(),
            };
            match step {
                Step::Stay(target) => {
                    self.target = target;
                    return (target, self.stage);
                }
                Step::Next(stage) => self.enter_stage(stage),
            }
        }
        (self.target, self.stage)
    }

    fn current_path(&self) -> ApproachPath {
        match self.path {
            Some(state) => *state.path(),
            None => self.planner.compute_approach_path(
                &Vector3::zeros(),
                self.loiter_radius,
                self.approach_height,
                &self.landing_point,
                self.target_heading_deg,
            ),
        }
    }

    fn provisional_heading(&self, wind: &Vector3<f32>) -> f32 {
        if self.commanded_heading_deg == 0.0 {
            into_wind_heading_deg(wind)
        } else {
            wrap_360(self.commanded_heading_deg)
        }
    }

    /// Follow the current wind while the path is not yet locked
    fn refresh_provisional(&mut self, wind: &Vector3<f32>) {
        if self.path.map_or(false, |p| p.is_locked()) {
            return;
        }
        let heading = self.provisional_heading(wind);
        self.target_heading_deg = heading;
        self.path = Some(PathState::Provisional(self.planner.compute_approach_path(
            wind,
            self.loiter_radius,
            self.approach_height,
            &self.landing_point,
            heading,
        )));
    }

    fn approach_target_step(&mut self, inputs: &NavigationInputs<'_>) -> Step {
        self.refresh_provisional(&inputs.wind);
        let path = self.current_path();
        if calculate_distance(&inputs.location, &self.landing_point) > APPROACH_DISTANCE {
            Step::Stay(path.loiter)
        } else {
            Step::Next(DeepstallStage::FlyToLoiter)
        }
    }

    fn fly_to_loiter_step(&mut self, inputs: &NavigationInputs<'_>) -> Step {
        self.refresh_provisional(&inputs.wind);
        let path = self.current_path();
        if calculate_distance(&inputs.location, &self.landing_point) > APPROACH_DISTANCE
            || calculate_distance(&inputs.location, &path.loiter) > 2.0 * self.loiter_radius
        {
            Step::Stay(path.loiter)
        } else {
            Step::Next(DeepstallStage::Loiter)
        }
    }

    fn loiter_step(&mut self, inputs: &NavigationInputs<'_>) -> Step {
        let path = self.current_path();
        let bearing = inputs.nav.target_bearing_cd();

        if !inputs.nav.reached_loiter_target() {
            self.last_target_bearing_cd = Some(bearing);
            self.loiter_sum_cd = 0;
            return Step::Stay(path.loiter);
        }

        if let Some(last) = self.last_target_bearing_cd {
            self.loiter_sum_cd = self
                .loiter_sum_cd
                .saturating_add(wrap_180_cd(bearing.wrapping_sub(last)));
        }
        self.last_target_bearing_cd = Some(bearing);

        if !self.breakout_ready(inputs, &path) {
            return Step::Stay(path.loiter);
        }

        let heading = self.provisional_heading(&inputs.wind);
        self.target_heading_deg = heading;
        self.path = Some(PathState::Locked(self.planner.compute_approach_path(
            &inputs.wind,
            self.loiter_radius,
            self.approach_height,
            &self.landing_point,
            heading,
        )));
        Step::Next(DeepstallStage::Approach)
    }

    fn breakout_ready(&self, inputs: &NavigationInputs<'_>, path: &ApproachPath) -> bool {
        if self.loiter_sum_cd.saturating_abs() <= LOITER_TURN_CD {
            return false;
        }
        let approach_bearing = calculate_bearing_cd(&inputs.location, &path.extended_approach);
        let track_error = wrap_180_cd(approach_bearing - inputs.ground_course_cd);
        if track_error.abs() > BREAKOUT_TRACK_TOLERANCE_CD {
            return false;
        }
        (path.loiter.alt - inputs.location.alt).saturating_abs() < BREAKOUT_ALT_TOLERANCE_CM
    }

    fn approach_step(&mut self, inputs: &NavigationInputs<'_>) -> Step {
        let path = self.current_path();
        let travel = self
            .planner
            .predict_travel_distance(&inputs.wind, inputs.height, path.heading_deg);
        let entry = project_position(&path.landing_point, path.heading_deg + 180.0, travel);

        if passed_point(&inputs.location, &path.loiter_exit, &entry) {
            Step::Next(DeepstallStage::Land)
        } else if passed_point(&inputs.location, &path.loiter, &path.extended_approach) {
            Step::Next(DeepstallStage::FlyToLoiter)
        } else {
            Step::Stay(path.extended_approach)
        }
    }

    fn land_step(&self) -> Step {
        Step::Stay(self.current_path().extended_approach)
    }

    fn enter_stage(&mut self, stage: DeepstallStage) {
        match stage {
            DeepstallStage::FlyToLoiter | DeepstallStage::Loiter => {
                self.loiter_sum_cd = 0;
                self.last_target_bearing_cd = None;
                self.path = self.path.map(PathState::unlocked);
            }
            DeepstallStage::Land => {
                self.steering.reset();
                self.stall_entry = None;
            }
            DeepstallStage::ApproachTarget | DeepstallStage::Approach => {}
        }
        self.stage = stage;
    }

    fn announce(&self, from: DeepstallStage, gcs: &mut dyn StatusTextSink) {
        match (from, self.stage) {
            (_, DeepstallStage::Loiter) => {
                gcs.send_text(Severity::Info, format_args!("Deepstall: loitering down"));
            }
            (_, DeepstallStage::Approach) => gcs.send_text(
                Severity::Info,
                format_args!(
                    "Deepstall: breakout, heading {}",
                    self.target_heading_deg as i32
                ),
            ),
            (_, DeepstallStage::Land) => {
                gcs.send_text(Severity::Info, format_args!("Deepstall: entry point, stalling"));
            }
            (DeepstallStage::Approach, DeepstallStage::FlyToLoiter) => gcs.send_text(
                Severity::Warning,
                format_args!("Deepstall: missed entry point, returning to loiter"),
            ),
            _ => {}
        }
    }

    /// Rudder authority from 0.5 at the handoff airspeed to 1.0 at the
    /// lower limit
    fn travel_limit(&self, airspeed: Option<f32>) -> f32 {
        let airspeed = match airspeed {
            Some(a) if a.is_finite() => a,
            _ => return 1.0,
        };
        let upper = self.params.handoff_airspeed;
        let lower = self.params.handoff_lower_limit_airspeed;
        let span = upper - lower;
        if span <= 0.0 {
            return if airspeed <= lower { 1.0 } else { 0.5 };
        }
        saturate((upper - airspeed) / span * 0.5 + 0.5, 0.5, 1.0)
    }
}

impl LandingStrategy for Deepstall {
    fn landing_type(&self) -> LandingType {
        LandingType::Deepstall
    }

    fn do_land(
        &mut self,
        cmd: &MissionCommand,
        relative_altitude: f32,
        state: &VehicleState,
        io: &mut LandingIo<'_>,
    ) {
        self.steering.reset();
        self.stall_entry = None;
        self.loiter_sum_cd = 0;
        self.last_target_bearing_cd = None;
        self.path = None;

        self.landing_point = cmd.location;
        self.approach_height = if cmd.param1 > 0.0 {
            cmd.param1
        } else {
            relative_altitude
        };
        self.commanded_heading_deg = if cmd.param4.is_finite() { cmd.param4 } else { 0.0 };
        self.stage = DeepstallStage::ApproachTarget;
        self.refresh_provisional(&state.wind);
        self.target = self.current_path().loiter;

        io.gcs.send_text(
            Severity::Info,
            format_args!(
                "Deepstall: landing, approach height {}m heading {}",
                self.approach_height as i32,
                self.target_heading_deg as i32
            ),
        );
    }

    fn verify_land(&mut self, ctx: &LandingContext<'_>, io: &mut LandingIo<'_>) -> bool {
        let before = self.stage;
        let inputs = NavigationInputs {
            location: ctx.state.location,
            wind: ctx.state.wind,
            height: ctx.height,
            ground_course_cd: ctx.state.ground_course_cd(),
            nav: &*io.nav,
        };
        let (target, stage) = self.update_target(&inputs);
        if stage != before {
            self.announce(before, io.gcs);
        }

        match stage {
            DeepstallStage::ApproachTarget | DeepstallStage::FlyToLoiter => {
                io.nav.update_waypoint(&ctx.state.location, &target);
            }
            DeepstallStage::Loiter => io.nav.update_loiter(&target, self.loiter_radius, 1),
            DeepstallStage::Approach | DeepstallStage::Land => {
                let path = self.current_path();
                io.nav.update_waypoint(&path.loiter_exit, &path.extended_approach);
            }
        }
        false
    }

    fn verify_abort_landing(
        &mut self,
        prev_wp: &Location,
        next_wp: &Location,
        io: &mut LandingIo<'_>,
    ) -> bool {
        self.abort();
        io.nav.update_heading_hold(calculate_bearing_cd(prev_wp, next_wp));
        false
    }

    fn is_ground_steering_allowed(&self) -> bool {
        false
    }

    fn control_servos(&mut self, state: &VehicleState, surfaces: &mut dyn ControlSurfaces) -> bool {
        if self.stage != DeepstallStage::Land {
            return false;
        }
        let path = self.current_path();

        let entry = *self.stall_entry.get_or_insert(StallEntry {
            time_ms: state.now_ms,
            initial_elevator_pwm: surfaces.elevator_pwm(),
        });
        let progress = if self.params.slew_speed > 0.0 {
            let elapsed = state.now_ms.wrapping_sub(entry.time_ms) as f32;
            saturate(elapsed / (1000.0 * self.params.slew_speed), 0.0, 1.0)
        } else {
            1.0
        };
        surfaces.set_elevator_pwm(interpolate_pwm(
            entry.initial_elevator_pwm,
            self.params.elevator_pwm,
            progress,
        ));

        let rudder = self.steering.update(
            &SteeringInputs {
                now_ms: state.now_ms,
                location: state.location,
                ground_course_rad: state.ground_course_rad,
                yaw_rate_rads: state.yaw_rate_rads,
            },
            &path,
        );

        let below_handoff = state
            .airspeed
            .map_or(false, |airspeed| airspeed <= self.params.handoff_airspeed);
        if progress >= 1.0 || below_handoff {
            let limit = self.travel_limit(state.airspeed);
            surfaces.set_rudder(saturate(rudder, -limit, limit));
            surfaces.set_aileron(0.0);
        } else {
            let aileron = surfaces.aileron();
            surfaces.set_rudder(aileron);
        }
        true
    }

    fn request_go_around(&mut self) -> bool {
        self.stage != DeepstallStage::Land
    }

    fn is_throttle_suppressed(&self) -> bool {
        self.stage == DeepstallStage::Land
    }

    fn target_airspeed_cm(&self, _state: &VehicleState) -> i32 {
        self.airspeed_cruise_cm
    }

    fn target_altitude_location(&self) -> Option<Location> {
        let path = self.path?;
        match self.stage {
            DeepstallStage::Land => Some(path.path().landing_point),
            _ => Some(path.path().loiter),
        }
    }

    fn navigation_target(&self) -> Option<Location> {
        self.path.map(|_| self.target)
    }

    fn rudder_command(&self) -> f32 {
        self.steering.rudder()
    }

    fn pid_info(&self) -> Option<PidInfo> {
        Some(self.steering.pid_info())
    }

    fn abort(&mut self) {
        self.stage = DeepstallStage::FlyToLoiter;
        self.steering.reset();
        self.loiter_sum_cd = 0;
        self.last_target_bearing_cd = None;
        self.stall_entry = None;
        self.path = self.path.map(PathState::unlocked);
    }
}
