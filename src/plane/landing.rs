//! Landing controller
//!
//! Vehicle-side owner of the landing dispatcher. It loads the landing
//! parameters, stamps every state snapshot with the controller clock,
//! tracks the last time the aircraft was judged flying, and routes
//! operator text to its status sink. Stage changes are logged.
//!
//! # Tick order
//!
//! ```text
//! begin()            entering the LAND mission item
//! update()           every navigation tick until it returns true
//! control_servos()   every servo tick, after the normal mixers
//! abort_climb()      every tick while climbing out of a go-around
//! finish()           leaving the landing flight stage
//! ```

use plane_landing_core::gcs::StatusTextSink;
use plane_landing_core::landing::{
    AbortContext, AbortStatus, DeepstallStage, GlideSlopeTarget, LandingContext, LandingDispatcher,
    LandingError, LandingIo, LandingType, RangefinderState, RestartPoint, SlopeAdjustment,
    SlopeStage,
};
use plane_landing_core::mission::{MissionCommand, MissionStore};
use plane_landing_core::navigation::{Location, NavController, VehicleState};
use plane_landing_core::parameters::{
    AirframeParams, DeepstallParams, LandingParams, ParameterStore,
};
use plane_landing_core::servo::ControlSurfaces;
use plane_landing_core::traits::Clock;

/// Vehicle inputs for one landing tick
#[derive(Debug, Clone, Copy)]
pub struct LandingTick {
    /// Start of the final leg
    pub prev_wp: Location,
    /// Landing waypoint
    pub next_wp: Location,
    pub state: VehicleState,
    /// Height above the landing point in meters
    pub height: f32,
    /// Sink rate in m/s, positive down
    pub sink_rate: f32,
    /// Along-track proportion of the final leg
    pub wp_proportion: f32,
    pub is_armed: bool,
    pub is_flying: bool,
    pub rangefinder_in_range: bool,
}

/// Stage of the active strategy, for change logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveStage {
    GlideSlope(SlopeStage),
    Deepstall(DeepstallStage),
    Unsupported,
}

/// Landing controller
pub struct LandingController<C: Clock, S: StatusTextSink> {
    clock: C,
    gcs: S,
    dispatcher: LandingDispatcher,
    last_flying_ms: u32,
    last_stage: ActiveStage,
}

impl<C: Clock, S: StatusTextSink> LandingController<C, S> {
    /// Create a controller configured from the current parameter values
    pub fn new(clock: C, gcs: S, store: &ParameterStore) -> Self {
        let dispatcher = LandingDispatcher::from_store(store);
        log_landing_type(&dispatcher);
        let last_flying_ms = clock.now_ms();
        Self {
            last_stage: active_stage(&dispatcher),
            clock,
            gcs,
            dispatcher,
            last_flying_ms,
        }
    }

    /// Apply changed parameters
    ///
    /// Refused while a landing is in progress; the running landing keeps
    /// its configuration.
    pub fn reload_parameters(&mut self, store: &ParameterStore) -> Result<(), LandingError> {
        let result = self.dispatcher.reconfigure(
            &LandingParams::from_store(store),
            &DeepstallParams::from_store(store),
            &AirframeParams::from_store(store),
        );
        match result {
            Ok(()) => {
                self.last_stage = active_stage(&self.dispatcher);
                log_landing_type(&self.dispatcher);
            }
            Err(_) => crate::log_warn!("Landing parameters not applied while landing"),
        }
        result
    }

    pub fn dispatcher(&self) -> &LandingDispatcher {
        &self.dispatcher
    }

    pub fn gcs(&self) -> &S {
        &self.gcs
    }

    pub fn gcs_mut(&mut self) -> &mut S {
        &mut self.gcs
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn stamp(&self, state: &VehicleState) -> VehicleState {
        VehicleState {
            now_ms: self.clock.now_ms(),
            ..*state
        }
    }

    /// Enter the landing flight stage and start the LAND item
    pub fn begin(
        &mut self,
        cmd: &MissionCommand,
        relative_altitude: f32,
        state: &VehicleState,
        nav: &mut dyn NavController,
        mission: &mut dyn MissionStore,
    ) {
        let state = self.stamp(state);
        self.last_flying_ms = state.now_ms;
        self.dispatcher.handle_flight_stage_change(true);

        let mut io = LandingIo {
            nav,
            mission,
            gcs: &mut self.gcs,
        };
        self.dispatcher.do_land(cmd, relative_altitude, &state, &mut io);
        crate::log_info!("Landing started at {}m", relative_altitude);
        self.note_stage();
    }

    /// Run one landing tick. Returns true once the LAND item is complete.
    pub fn update(
        &mut self,
        tick: &LandingTick,
        nav: &mut dyn NavController,
        mission: &mut dyn MissionStore,
    ) -> bool {
        let state = self.stamp(&tick.state);
        if tick.is_flying {
            self.last_flying_ms = state.now_ms;
        }
        let ctx = LandingContext {
            prev_wp: tick.prev_wp,
            next_wp: tick.next_wp,
            state: &state,
            height: tick.height,
            sink_rate: tick.sink_rate,
            wp_proportion: tick.wp_proportion,
            last_flying_ms: self.last_flying_ms,
            is_armed: tick.is_armed,
            is_flying: tick.is_flying,
            rangefinder_in_range: tick.rangefinder_in_range,
        };

        let mut io = LandingIo {
            nav,
            mission,
            gcs: &mut self.gcs,
        };
        let complete = self.dispatcher.verify_land(&ctx, &mut io);
        self.note_stage();
        if complete {
            crate::log_info!("Landing item complete");
        }
        complete
    }

    /// Let the landing drive the control surfaces
    pub fn control_servos(&mut self, state: &VehicleState, surfaces: &mut dyn ControlSurfaces) -> bool {
        let state = self.stamp(state);
        self.dispatcher.control_servos(&state, surfaces)
    }

    /// Compute the glide slope for the final leg
    pub fn setup_glide_slope(
        &mut self,
        prev_wp: &Location,
        next_wp: &Location,
        state: &VehicleState,
        nav: &mut dyn NavController,
        mission: &mut dyn MissionStore,
    ) -> Option<GlideSlopeTarget> {
        let state = self.stamp(state);
        let mut io = LandingIo {
            nav,
            mission,
            gcs: &mut self.gcs,
        };
        self.dispatcher
            .setup_landing_glide_slope(prev_wp, next_wp, &state, &mut io)
    }

    /// Rework the glide slope after a rangefinder correction change
    #[allow(clippy::too_many_arguments)]
    pub fn adjust_for_rangefinder(
        &mut self,
        rangefinder: &mut RangefinderState,
        prev_wp: &mut Location,
        next_wp: &Location,
        state: &VehicleState,
        wp_distance: f32,
        nav: &mut dyn NavController,
        mission: &mut dyn MissionStore,
    ) -> Option<SlopeAdjustment> {
        let state = self.stamp(state);
        let mut io = LandingIo {
            nav,
            mission,
            gcs: &mut self.gcs,
        };
        let adjustment = self.dispatcher.adjust_landing_slope_for_rangefinder_bump(
            rangefinder,
            prev_wp,
            next_wp,
            &state,
            wp_distance,
            &mut io,
        );
        if adjustment.as_ref().map_or(false, |a| a.abort_requested) {
            crate::log_warn!("Landing slope too steep, go-around commanded");
        }
        adjustment
    }

    /// Ask the active strategy for a go-around
    pub fn request_go_around(&mut self) -> bool {
        let accepted = self.dispatcher.request_go_around();
        if accepted {
            crate::log_info!("Landing go-around accepted");
        } else {
            crate::log_warn!("Landing go-around refused");
        }
        accepted
    }

    /// One tick of the climb-out after an aborted landing
    pub fn abort_climb(
        &mut self,
        ctx: &AbortContext,
        nav: &mut dyn NavController,
        mission: &mut dyn MissionStore,
    ) -> AbortStatus {
        let mut io = LandingIo {
            nav,
            mission,
            gcs: &mut self.gcs,
        };
        let status = self.dispatcher.verify_abort_landing(ctx, &mut io);
        self.note_stage();
        match status.restart {
            Some(Ok(point)) => {
                crate::log_info!("Landing restarted at mission index {}", point.index())
            }
            Some(Err(_)) => crate::log_error!("Landing restart failed"),
            None => {}
        }
        status
    }

    /// Rewind the mission to fly the landing again
    pub fn restart(
        &mut self,
        current: &Location,
        nav: &mut dyn NavController,
        mission: &mut dyn MissionStore,
    ) -> Result<RestartPoint, LandingError> {
        let mut io = LandingIo {
            nav,
            mission,
            gcs: &mut self.gcs,
        };
        self.dispatcher.restart_landing_sequence(current, &mut io)
    }

    /// Leave the landing flight stage
    pub fn finish(&mut self) {
        self.dispatcher.handle_flight_stage_change(false);
        crate::log_info!("Landing stage exited");
    }

    pub fn is_throttle_suppressed(&self) -> bool {
        self.dispatcher.is_throttle_suppressed()
    }

    pub fn is_complete(&self) -> bool {
        self.dispatcher.is_complete()
    }

    pub fn target_airspeed_cm(&self, state: &VehicleState) -> i32 {
        self.dispatcher.target_airspeed_cm(state)
    }

    pub fn navigation_target(&self) -> Option<Location> {
        self.dispatcher.navigation_target()
    }

    /// Rudder command in -1..1 for the actuator layer
    pub fn rudder_command(&self) -> f32 {
        self.dispatcher.rudder_command()
    }

    fn note_stage(&mut self) {
        let stage = active_stage(&self.dispatcher);
        if stage == self.last_stage {
            return;
        }
        match stage {
            ActiveStage::GlideSlope(s) => crate::log_info!("Glide slope stage {}", s.as_str()),
            ActiveStage::Deepstall(s) => crate::log_info!("Deepstall stage {}", s.as_str()),
            ActiveStage::Unsupported => {}
        }
        self.last_stage = stage;
    }
}

fn active_stage(dispatcher: &LandingDispatcher) -> ActiveStage {
    if let Some(slope) = dispatcher.glide_slope() {
        ActiveStage::GlideSlope(slope.stage())
    } else if let Some(ds) = dispatcher.deepstall() {
        ActiveStage::Deepstall(ds.stage())
    } else {
        ActiveStage::Unsupported
    }
}

fn log_landing_type(dispatcher: &LandingDispatcher) {
    match dispatcher.landing_type() {
        Ok(LandingType::StandardGlideSlope) => crate::log_info!("Landing type: glide slope"),
        Ok(LandingType::Deepstall) => crate::log_info!("Landing type: deepstall"),
        Err(LandingError::InvalidType(raw)) => {
            crate::log_error!("Landing type {} not supported", raw)
        }
        Err(_) => {}
    }
}
