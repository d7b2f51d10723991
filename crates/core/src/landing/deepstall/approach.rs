//! Deepstall approach path planning
//!
//! Given the landing point, the approach heading and the wind, work out
//! how far the aircraft travels over the ground once stalled, then lay out
//! the loiter circle and the straight approach leg that put the stall
//! entry point exactly that far upwind of the landing point.
//!
//! ```text
//!                 loiter (center)
//!                    o
//!                    | radius
//!   loiter_exit  ----+------ entry --------- landing ------------> extended
//!                    |<-- predict + ext -->|            1000 m
//! ```

use libm::{acosf, asinf, cosf, sinf, sqrtf};
use nalgebra::{Vector2, Vector3};

use crate::navigation::geo::{project_position, wrap_360};
use crate::navigation::Location;
use crate::parameters::DeepstallParams;

/// Distance past the landing point used as the approach track end, meters
pub const EXTENDED_APPROACH_DISTANCE: f32 = 1000.0;

const MIN_SPEED: f32 = 0.1;
const MIN_WIND_NORM: f32 = 0.05;

/// Geometry for one deepstall attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproachPath {
    pub landing_point: Location,
    /// Far end of the approach track, beyond the landing point
    pub extended_approach: Location,
    /// Loiter circle center
    pub loiter: Location,
    /// Tangent point where the aircraft leaves the loiter circle
    pub loiter_exit: Location,
    /// Approach heading in degrees (0..360)
    pub heading_deg: f32,
    /// Predicted stall travel distance used for the layout, meters
    pub predicted_distance: f32,
}

/// Stall-phase travel model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproachPathPlanner {
    forward_speed: f32,
    descent_speed: f32,
    slope_a: f32,
    slope_b: f32,
    approach_extension: f32,
}

impl ApproachPathPlanner {
    pub fn new(params: &DeepstallParams) -> Self {
        Self {
            forward_speed: params.forward_speed,
            descent_speed: params.descent_speed,
            slope_a: params.slope_a,
            slope_b: params.slope_b,
            approach_extension: params.approach_extension,
        }
    }

    /// Ground distance covered while descending `altitude` meters stalled
    ///
    /// `course_deg` is the ground course flown during the stall. The result
    /// is never negative.
    pub fn predict_travel_distance(&self, wind: &Vector3<f32>, altitude: f32, course_deg: f32) -> f32 {
        let forward_speed = self.forward_speed.max(MIN_SPEED);
        let descent_speed = self.descent_speed.max(MIN_SPEED);

        let course_rad = course_deg.to_radians();
        let course = Vector2::new(cosf(course_rad), sinf(course_rad));
        let wind = Vector2::new(wind.x, wind.y);
        let wind_length = sqrtf(wind.x * wind.x + wind.y * wind.y);

        let cos_theta = wind.dot(&course) / (wind_length.max(MIN_WIND_NORM) * course.norm());
        let mut theta = acosf(cos_theta.clamp(-1.0, 1.0));
        if course.perp(&wind) > 0.0 {
            theta = -theta;
        }

        let cross_component = sinf(theta) * wind_length;
        let crab = asinf((cross_component / forward_speed).clamp(-1.0, 1.0));
        let ground_speed = cosf(crab) * forward_speed + cosf(theta) * wind_length;

        let stall_distance = self.slope_a * wind_length + self.slope_b;
        let distance = ground_speed * altitude / descent_speed + stall_distance;
        distance.max(0.0)
    }

    /// Lay out the approach for a landing at `landing_point` on `heading_deg`
    ///
    /// `height_to_lose` is the approach height above the landing point in
    /// meters. The loiter and its exit are placed at that height.
    pub fn compute_approach_path(
        &self,
        wind: &Vector3<f32>,
        loiter_radius: f32,
        height_to_lose: f32,
        landing_point: &Location,
        heading_deg: f32,
    ) -> ApproachPath {
        let heading_deg = wrap_360(heading_deg);
        let predicted_distance = self.predict_travel_distance(wind, height_to_lose, heading_deg);
        let approach_alt = landing_point.alt + (height_to_lose * 100.0) as i32;

        let extended_approach =
            project_position(landing_point, heading_deg, EXTENDED_APPROACH_DISTANCE);
        let loiter_exit = project_position(
            landing_point,
            heading_deg + 180.0,
            predicted_distance + self.approach_extension,
        )
        .with_alt(approach_alt);
        let loiter =
            project_position(&loiter_exit, heading_deg + 90.0, loiter_radius).with_alt(approach_alt);

        ApproachPath {
            landing_point: *landing_point,
            extended_approach,
            loiter,
            loiter_exit,
            heading_deg,
            predicted_distance,
        }
    }
}
