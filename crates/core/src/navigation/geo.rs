//! Geographic calculations on fixed-point locations
//!
//! Flat-earth approximations valid over the few kilometers a landing
//! pattern spans. Coordinate differences are taken in integer space before
//! conversion to `f32` so that precision is not lost at large latitudes
//! and longitudes.

use super::types::Location;
use libm::{atan2f, cosf, fabsf, fmodf, roundf, sinf};
use nalgebra::Vector2;

/// Meters per 1e-7 degree of latitude
pub const LOCATION_SCALING_FACTOR: f32 = 0.011_131_884;

/// 1e-7 degrees of latitude per meter
pub const LOCATION_SCALING_FACTOR_INV: f32 = 89.832_05;

/// Cosine of latitude, clamped away from zero near the poles
pub fn longitude_scale(lat: i32) -> f32 {
    let lat_rad = (lat as f32 * 1.0e-7).to_radians();
    cosf(lat_rad).clamp(0.01, 1.0)
}

/// Longitude difference `lng2 - lng1`, wrapped across the antimeridian
fn diff_longitude(lng1: i32, lng2: i32) -> i64 {
    let mut d = lng2 as i64 - lng1 as i64;
    if d > 1_800_000_000 {
        d -= 3_600_000_000;
    } else if d < -1_800_000_000 {
        d += 3_600_000_000;
    }
    d
}

/// North/east offset in meters from `from` to `to`
///
/// Returns `Vector2::new(north, east)`.
pub fn diff_ne(from: &Location, to: &Location) -> Vector2<f32> {
    let dlat = (to.lat as i64 - from.lat as i64) as f32;
    let dlng = diff_longitude(from.lng, to.lng) as f32;
    Vector2::new(
        dlat * LOCATION_SCALING_FACTOR,
        dlng * LOCATION_SCALING_FACTOR * longitude_scale(from.lat),
    )
}

/// Horizontal distance in meters
pub fn calculate_distance(from: &Location, to: &Location) -> f32 {
    diff_ne(from, to).norm()
}

/// Bearing from `from` to `to` in centidegrees (0..36000)
pub fn calculate_bearing_cd(from: &Location, to: &Location) -> i32 {
    let d = diff_ne(from, to);
    let bearing = atan2f(d.y, d.x).to_degrees() * 100.0;
    let bearing = roundf(bearing) as i32;
    if bearing < 0 {
        bearing + 36000
    } else {
        bearing % 36000
    }
}

/// Move a location by a north/east offset in meters
///
/// Altitude is preserved.
pub fn offset_position(loc: &Location, north_m: f32, east_m: f32) -> Location {
    let dlat = roundf(north_m * LOCATION_SCALING_FACTOR_INV) as i32;
    let dlng = roundf(east_m * LOCATION_SCALING_FACTOR_INV / longitude_scale(loc.lat)) as i32;
    Location {
        lat: loc.lat.saturating_add(dlat),
        lng: loc.lng.wrapping_add(dlng),
        alt: loc.alt,
    }
}

/// Move a location `distance_m` meters along `bearing_deg`
pub fn project_position(loc: &Location, bearing_deg: f32, distance_m: f32) -> Location {
    let rad = bearing_deg.to_radians();
    offset_position(loc, cosf(rad) * distance_m, sinf(rad) * distance_m)
}

/// Along-track proportion of `loc` on the segment `start -> end`
///
/// 0.0 at `start`, 1.0 at `end`, greater than 1.0 past `end`. A degenerate
/// segment counts as already passed.
pub fn path_proportion(loc: &Location, start: &Location, end: &Location) -> f32 {
    let to_loc = diff_ne(start, loc);
    let segment = diff_ne(start, end);
    let dsq = segment.norm_squared();
    if dsq < 0.001 {
        return 1.0;
    }
    to_loc.dot(&segment) / dsq
}

/// True once `loc` has crossed the plane through `end` perpendicular to
/// the `start -> end` ray
pub fn passed_point(loc: &Location, start: &Location, end: &Location) -> bool {
    path_proportion(loc, start, end) >= 1.0
}

/// Wrap an angle in centidegrees to -18000..18000
pub fn wrap_180_cd(angle_cd: i32) -> i32 {
    let mut a = angle_cd % 36000;
    if a > 18000 {
        a -= 36000;
    } else if a < -18000 {
        a += 36000;
    }
    a
}

/// Wrap an angle in degrees to -180..180
pub fn wrap_180(angle: f32) -> f32 {
    let mut a = fmodf(angle, 360.0);
    if a > 180.0 {
        a -= 360.0;
    } else if a < -180.0 {
        a += 360.0;
    }
    a
}

/// Wrap an angle in degrees to 0..360
pub fn wrap_360(angle: f32) -> f32 {
    let a = fmodf(angle, 360.0);
    if a < 0.0 {
        a + 360.0
    } else {
        a
    }
}

/// Wrap an angle in radians to -π..π
pub fn wrap_pi(angle: f32) -> f32 {
    use core::f32::consts::PI;
    let mut a = fmodf(angle, 2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Smallest signed difference `to - from` between two angles in radians
pub fn angle_diff_rad(to: f32, from: f32) -> f32 {
    let delta = to - from;
    atan2f(sinf(delta), cosf(delta))
}

/// True when two bearings in degrees are within `tolerance_deg`
pub fn bearings_within(a_deg: f32, b_deg: f32, tolerance_deg: f32) -> bool {
    fabsf(wrap_180(a_deg - b_deg)) <= tolerance_deg
}
