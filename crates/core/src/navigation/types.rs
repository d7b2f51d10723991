//! Navigation type definitions
//!
//! - `Location`: fixed-point geographic position
//! - `VehicleState`: per-tick snapshot of the estimator outputs the landing
//!   logic consumes

use nalgebra::Vector3;

/// Geographic position in autopilot fixed-point units
///
/// Matches MAVLink MISSION_ITEM_INT scaling: latitude and longitude in
/// degrees * 1e7, altitude in centimeters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Location {
    /// Latitude in degrees * 1e7
    pub lat: i32,
    /// Longitude in degrees * 1e7
    pub lng: i32,
    /// Altitude in centimeters
    pub alt: i32,
}

impl Location {
    /// Create a new location from fixed-point coordinates
    pub const fn new(lat: i32, lng: i32, alt_cm: i32) -> Self {
        Self {
            lat,
            lng,
            alt: alt_cm,
        }
    }

    /// Create a location from degrees and meters
    pub fn from_degrees(lat_deg: f64, lng_deg: f64, alt_m: f32) -> Self {
        Self {
            lat: (lat_deg * 1e7) as i32,
            lng: (lng_deg * 1e7) as i32,
            alt: (alt_m * 100.0) as i32,
        }
    }

    /// Altitude in meters
    pub fn alt_m(&self) -> f32 {
        self.alt as f32 * 0.01
    }

    /// Same horizontal position at a different altitude
    pub fn with_alt(self, alt_cm: i32) -> Self {
        Self { alt: alt_cm, ..self }
    }

    /// True when latitude and longitude are both unset
    pub fn is_zero(&self) -> bool {
        self.lat == 0 && self.lng == 0
    }
}

/// Snapshot of vehicle state for one control tick
///
/// Supplied by the attitude/position estimator. Angles follow the NED
/// convention: 0 = north, positive clockwise.
#[derive(Clone, Copy, Debug)]
pub struct VehicleState {
    /// Current position (altitude absolute, cm)
    pub location: Location,
    /// Altitude above home in meters
    pub relative_alt_m: f32,
    /// Ground track angle in radians (-π..π)
    pub ground_course_rad: f32,
    /// Yaw (heading) in degrees (0..360)
    pub heading_deg: f32,
    /// Yaw rate in radians per second
    pub yaw_rate_rads: f32,
    /// Wind estimate, NED m/s (direction the air mass moves toward)
    pub wind: Vector3<f32>,
    /// Airspeed estimate in m/s, if a sensor or synthetic estimate exists
    pub airspeed: Option<f32>,
    /// Ground speed in m/s
    pub groundspeed: f32,
    /// Monotonic timestamp of this snapshot in milliseconds
    pub now_ms: u32,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            location: Location::default(),
            relative_alt_m: 0.0,
            ground_course_rad: 0.0,
            heading_deg: 0.0,
            yaw_rate_rads: 0.0,
            wind: Vector3::zeros(),
            airspeed: None,
            groundspeed: 0.0,
            now_ms: 0,
        }
    }
}

impl VehicleState {
    /// Ground track in centidegrees (0..36000)
    pub fn ground_course_cd(&self) -> i32 {
        let deg = super::geo::wrap_360(self.ground_course_rad.to_degrees());
        (deg * 100.0) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_degrees() {
        let loc = Location::from_degrees(-35.3632621, 149.1652374, 584.0);
        assert_eq!(loc.lat, -353632621);
        assert!((loc.lng - 1491652374).abs() <= 1);
        assert_eq!(loc.alt, 58400);
        assert!((loc.alt_m() - 584.0).abs() < 0.01);
    }

    #[test]
    fn test_location_with_alt() {
        let loc = Location::new(10, 20, 300).with_alt(500);
        assert_eq!(loc, Location::new(10, 20, 500));
    }

    #[test]
    fn test_ground_course_cd_wraps_negative() {
        let state = VehicleState {
            ground_course_rad: -core::f32::consts::FRAC_PI_2,
            ..Default::default()
        };
        assert!((state.ground_course_cd() - 27000).abs() <= 1);
    }
}
