//! Standard glide slope landing
//!
//! Fly a straight descending line from the previous waypoint to an aim
//! point just above and before the landing point, then flare.
//!
//! # Stages
//!
//! - `Normal`: still lining up with the final leg
//! - `Approach`: established on the final leg, descending on the slope
//! - `PreFlare`: low enough to slow to the pre-flare airspeed, still on
//!   approach
//! - `Final`: flaring, throttle cut, roll held near level

use libm::{atanf, fabsf};

use crate::gcs::{Severity, StatusTextSink};
use crate::mission::{MissionCommand, MAV_CMD_NAV_LOITER_TO_ALT};
use crate::navigation::geo::{
    calculate_bearing_cd, calculate_distance, path_proportion, project_position,
};
use crate::navigation::{Location, VehicleState};
use crate::parameters::{AirframeParams, LandingParams};

use super::wind::head_wind;
use super::{
    GlideSlopeTarget, LandingContext, LandingIo, LandingStrategy, LandingType, RangefinderState,
    SlopeAdjustment,
};

/// Distance the slope is projected past the landing point, meters
const LAND_PROJECTION: f32 = 500.0;

/// Nav waypoint lead past the landing point, meters
const NAV_LEAD: f32 = 200.0;

/// Lined-up thresholds for entering the approach stage
const LINED_UP_BEARING_CD: i32 = 1000;
const LINED_UP_CROSSTRACK_M: f32 = 5.0;

/// Time flying after which a flare at height is reported as a crash
const FLARE_CRASH_MS: u32 = 3000;

/// Glide slope stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SlopeStage {
    Normal,
    Approach,
    PreFlare,
    Final,
}

impl SlopeStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Approach => "Approach",
            Self::PreFlare => "PreFlare",
            Self::Final => "Final",
        }
    }
}

/// Glide slope landing strategy
#[derive(Debug, Clone)]
pub struct StandardGlideSlope {
    params: LandingParams,
    airframe: AirframeParams,
    stage: SlopeStage,
    slope: f32,
    initial_slope: f32,
    aborted_on_slope_recalc: bool,
    post_stats: bool,
}

impl StandardGlideSlope {
    pub fn new(params: &LandingParams, airframe: &AirframeParams) -> Self {
        Self {
            params: params.clone(),
            airframe: airframe.clone(),
            stage: SlopeStage::Normal,
            slope: 0.0,
            initial_slope: 0.0,
            aborted_on_slope_recalc: false,
            post_stats: false,
        }
    }

    pub fn stage(&self) -> SlopeStage {
        self.stage
    }

    /// Current slope, meters of descent per meter travelled
    pub fn slope(&self) -> f32 {
        self.slope
    }

    pub fn initial_slope(&self) -> f32 {
        self.initial_slope
    }

    fn update_stage(&mut self, ctx: &LandingContext<'_>, io: &mut LandingIo<'_>) {
        let location = &ctx.state.location;

        if self.stage == SlopeStage::Normal {
            let stale = io.nav.data_is_stale();
            let heading_lined_up = io.nav.bearing_error_cd().abs() < LINED_UP_BEARING_CD && !stale;
            let on_flight_line = fabsf(io.nav.crosstrack_error()) < LINED_UP_CROSSTRACK_M && !stale;
            let below_prev_wp = location.alt < ctx.prev_wp.alt;
            let after_loiter_to_alt = io
                .mission
                .prev_nav_cmd_with_wp_index()
                .and_then(|index| io.mission.read_cmd(index))
                .map_or(false, |cmd| cmd.id == MAV_CMD_NAV_LOITER_TO_ALT);

            if after_loiter_to_alt
                || (ctx.wp_proportion >= 0.0 && heading_lined_up && on_flight_line)
                || (ctx.wp_proportion > 0.15 && heading_lined_up && below_prev_wp)
                || ctx.wp_proportion > 0.5
            {
                self.stage = SlopeStage::Approach;
            }
        }

        let on_approach = self.is_on_approach();
        let below_flare_alt = ctx.height <= self.params.flare_alt;
        let below_flare_sec =
            self.params.flare_sec > 0.0 && ctx.height <= ctx.sink_rate * self.params.flare_sec;
        let probably_crashed =
            self.airframe.crash_detect && fabsf(ctx.sink_rate) < 0.2 && !ctx.is_flying;

        if (on_approach && below_flare_alt)
            || (on_approach && below_flare_sec && ctx.wp_proportion > 0.5)
            || (!ctx.rangefinder_in_range && ctx.wp_proportion >= 1.0)
            || probably_crashed
        {
            if self.stage != SlopeStage::Final {
                self.post_stats = true;
                let flying_ms = ctx.state.now_ms.wrapping_sub(ctx.last_flying_ms);
                if ctx.is_flying && flying_ms > FLARE_CRASH_MS {
                    io.gcs.send_text(
                        Severity::Critical,
                        format_args!("Flare crash detected: speed={}", ctx.state.groundspeed),
                    );
                } else {
                    io.gcs.send_text(
                        Severity::Info,
                        format_args!(
                            "Flare {}m sink={} speed={} dist={}",
                            ctx.height,
                            ctx.sink_rate,
                            ctx.state.groundspeed,
                            calculate_distance(location, &ctx.next_wp)
                        ),
                    );
                }
                self.stage = SlopeStage::Final;
            }
        } else if self.stage == SlopeStage::Approach && self.params.pre_flare_airspeed > 0.0 {
            let reached_alt =
                self.params.pre_flare_alt > 0.0 && ctx.height <= self.params.pre_flare_alt;
            let reached_sec = self.params.pre_flare_sec > 0.0
                && ctx.height <= ctx.sink_rate * self.params.pre_flare_sec;
            if reached_alt || reached_sec {
                self.stage = SlopeStage::PreFlare;
            }
        }
    }

    fn compute_slope(
        &mut self,
        prev_wp: &Location,
        next_wp: &Location,
        state: &VehicleState,
        gcs: &mut dyn StatusTextSink,
    ) -> GlideSlopeTarget {
        // All-zero LAND items give a zero-length leg
        let total_distance = calculate_distance(prev_wp, next_wp).max(1.0);
        let sink_height = (prev_wp.alt - next_wp.alt) as f32 * 0.01;

        let groundspeed = state.groundspeed.max(0.5);
        let sink_time = (total_distance / groundspeed).max(0.5);
        let sink_rate = sink_height / sink_time;

        let flare_alt = self.params.flare_alt;
        let mut aim_height = self.params.flare_sec * sink_rate;
        if aim_height <= 0.0 {
            aim_height = flare_alt;
        }
        if flare_alt > 0.0 && aim_height > flare_alt * 2.0 {
            aim_height = flare_alt * 2.0;
        }

        let land_sink = self.airframe.land_sink_rate.max(0.01);
        let flare_time = aim_height / land_sink;
        let flare_distance = (groundspeed * flare_time).min(total_distance / 2.0);

        let bearing_deg = calculate_bearing_cd(prev_wp, next_wp) as f32 * 0.01;
        let aim = project_position(next_wp, bearing_deg, -flare_distance);
        let aim = aim.with_alt(aim.alt + (aim_height * 100.0) as i32);

        let first_calculation = self.slope == 0.0;
        self.slope = (sink_height - aim_height) / (total_distance - flare_distance);
        if first_calculation {
            self.initial_slope = self.slope;
            gcs.send_text(
                Severity::Info,
                format_args!(
                    "Landing glide slope {} degrees",
                    atanf(self.slope).to_degrees()
                ),
            );
        }

        let projected = project_position(&aim, bearing_deg, LAND_PROJECTION);
        let projected =
            projected.with_alt(projected.alt - (self.slope * LAND_PROJECTION * 100.0) as i32);

        let altitude_offset_cm = projected.alt - prev_wp.alt;
        let land_proportion = path_proportion(&state.location, prev_wp, &projected);
        let proportion = (1.0 - land_proportion).clamp(0.0, 1.0);

        let target = projected.alt - (altitude_offset_cm as f32 * proportion) as i32;
        let (lo, hi) = if projected.alt < prev_wp.alt {
            (projected.alt, prev_wp.alt)
        } else {
            (prev_wp.alt, projected.alt)
        };

        GlideSlopeTarget {
            location: projected,
            altitude_offset_cm,
            proportion,
            target_alt_cm: target.clamp(lo, hi),
            slope: self.slope,
        }
    }
}

impl LandingStrategy for StandardGlideSlope {
    fn landing_type(&self) -> LandingType {
        LandingType::StandardGlideSlope
    }

    fn do_land(
        &mut self,
        _cmd: &MissionCommand,
        relative_altitude: f32,
        _state: &VehicleState,
        io: &mut LandingIo<'_>,
    ) {
        self.initial_slope = 0.0;
        self.slope = 0.0;
        self.post_stats = false;
        self.stage = SlopeStage::Normal;
        io.gcs.send_text(
            Severity::Info,
            format_args!("Landing approach start at {}m", relative_altitude as i32),
        );
    }

    fn verify_land(&mut self, ctx: &LandingContext<'_>, io: &mut LandingIo<'_>) -> bool {
        self.update_stage(ctx, io);

        // Keep the nav waypoint well past the landing point so an overshoot
        // does not turn the aircraft around
        let bearing_deg = calculate_bearing_cd(&ctx.prev_wp, &ctx.next_wp) as f32 * 0.01;
        let lead = calculate_distance(&ctx.prev_wp, &ctx.state.location) + NAV_LEAD;
        let land_wp = project_position(&ctx.next_wp, bearing_deg, lead);
        io.nav.update_waypoint(&ctx.prev_wp, &land_wp);

        if self.post_stats && !ctx.is_armed {
            self.post_stats = false;
            io.gcs.send_text(
                Severity::Info,
                format_args!(
                    "Distance from LAND point={}m",
                    calculate_distance(&ctx.state.location, &ctx.next_wp)
                ),
            );
        }
        false
    }

    fn verify_abort_landing(
        &mut self,
        prev_wp: &Location,
        next_wp: &Location,
        io: &mut LandingIo<'_>,
    ) -> bool {
        io.nav.update_heading_hold(calculate_bearing_cd(prev_wp, next_wp));
        false
    }

    fn setup_landing_glide_slope(
        &mut self,
        prev_wp: &Location,
        next_wp: &Location,
        state: &VehicleState,
        gcs: &mut dyn StatusTextSink,
    ) -> Option<GlideSlopeTarget> {
        Some(self.compute_slope(prev_wp, next_wp, state, gcs))
    }

    fn adjust_landing_slope_for_rangefinder_bump(
        &mut self,
        rangefinder: &mut RangefinderState,
        prev_wp: &mut Location,
        next_wp: &Location,
        state: &VehicleState,
        wp_distance: f32,
        gcs: &mut dyn StatusTextSink,
    ) -> Option<SlopeAdjustment> {
        let correction_delta = fabsf(rangefinder.last_stable_correction) - fabsf(rangefinder.correction);
        let threshold = self.params.slope_recalc_shallow_threshold;
        if threshold <= 0.0 || fabsf(correction_delta) < threshold {
            return None;
        }
        rangefinder.last_stable_correction = rangefinder.correction;

        // Follow the slope from here to the landing point back up to the
        // start of the leg and move the previous waypoint there
        let corrected_alt_m =
            (state.location.alt - next_wp.alt) as f32 * 0.01 - rangefinder.correction;
        let total_distance = calculate_distance(prev_wp, next_wp);
        let top_of_slope_m = total_distance * corrected_alt_m / wp_distance.max(1.0);
        prev_wp.alt = (top_of_slope_m * 100.0) as i32 + next_wp.alt;

        let target = self.compute_slope(prev_wp, next_wp, state, gcs);

        let abort_deg = self.params.slope_recalc_steep_threshold_to_abort;
        let mut abort_requested = false;
        if rangefinder.correction < 0.0 && abort_deg > 0.0 && !self.aborted_on_slope_recalc {
            let steepening =
                atanf(self.slope).to_degrees() - atanf(self.initial_slope).to_degrees();
            if steepening > abort_deg {
                gcs.send_text(
                    Severity::Info,
                    format_args!(
                        "Landing slope too steep, aborting ({}m {}deg)",
                        rangefinder.correction, steepening
                    ),
                );
                self.aborted_on_slope_recalc = true;
                abort_requested = true;
            }
        }

        Some(SlopeAdjustment {
            target,
            abort_requested,
        })
    }

    fn is_flaring(&self) -> bool {
        self.stage == SlopeStage::Final
    }

    fn is_on_approach(&self) -> bool {
        matches!(self.stage, SlopeStage::Approach | SlopeStage::PreFlare)
    }

    fn is_ground_steering_allowed(&self) -> bool {
        self.is_on_approach()
    }

    fn is_expecting_impact(&self) -> bool {
        matches!(self.stage, SlopeStage::PreFlare | SlopeStage::Final)
    }

    fn request_go_around(&mut self) -> bool {
        true
    }

    fn is_complete(&self) -> bool {
        self.stage == SlopeStage::Final
    }

    fn is_throttle_suppressed(&self) -> bool {
        self.stage == SlopeStage::Final
    }

    fn target_airspeed_cm(&self, state: &VehicleState) -> i32 {
        let cruise_cm = self.airframe.airspeed_cruise_cm;
        let land_airspeed = self.airframe.land_airspeed;
        let pre_flare_airspeed = self.params.pre_flare_airspeed;

        let target_cm = match self.stage {
            SlopeStage::Approach if land_airspeed >= 0.0 => (land_airspeed * 100.0) as i32,
            SlopeStage::PreFlare | SlopeStage::Final if pre_flare_airspeed > 0.0 => {
                (pre_flare_airspeed * 100.0) as i32
            }
            SlopeStage::PreFlare | SlopeStage::Final if land_airspeed >= 0.0 => {
                (land_airspeed * 100.0) as i32
            }
            _ => cruise_cm,
        };

        let head_wind_cm = (head_wind(state.heading_deg, &state.wind) * 0.5 * 100.0) as i32;
        // Never below the stage target, never above cruise
        (target_cm + head_wind_cm).max(target_cm).min(cruise_cm)
    }

    fn constrain_roll(&self, desired_roll_cd: i32, level_roll_limit_cd: i32) -> i32 {
        if self.stage == SlopeStage::Final {
            let limit = level_roll_limit_cd.abs();
            desired_roll_cd.clamp(-limit, limit)
        } else {
            desired_roll_cd
        }
    }
}
