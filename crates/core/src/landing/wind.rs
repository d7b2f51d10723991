//! Wind helpers shared by the landing strategies
//!
//! Wind vectors are NED and point where the air mass moves toward, so the
//! direction the wind blows *from* is the negated vector.

use libm::{atan2f, cosf, sqrtf};
use nalgebra::Vector3;

use crate::navigation::geo::wrap_360;

/// Horizontal wind speed in m/s
pub fn wind_speed(wind: &Vector3<f32>) -> f32 {
    sqrtf(wind.x * wind.x + wind.y * wind.y)
}

/// Heading in degrees (0..360) that points into the wind
pub fn into_wind_heading_deg(wind: &Vector3<f32>) -> f32 {
    wrap_360(atan2f(-wind.y, -wind.x).to_degrees())
}

/// Alignment of `heading_deg` with the direction the wind blows from
///
/// 1.0 flying straight into a headwind, -1.0 with a direct tailwind.
pub fn wind_alignment(heading_deg: f32, wind: &Vector3<f32>) -> f32 {
    let from = atan2f(-wind.y, -wind.x);
    cosf(from - heading_deg.to_radians())
}

/// Headwind component in m/s; zero with any tailwind
pub fn head_wind(heading_deg: f32, wind: &Vector3<f32>) -> f32 {
    let alignment = wind_alignment(heading_deg, wind);
    if alignment > 0.0 {
        alignment * wind_speed(wind)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_from_north_is_headwind_flying_north() {
        // Air moving south
        let wind = Vector3::new(-5.0, 0.0, 0.0);
        assert!((wind_alignment(0.0, &wind) - 1.0).abs() < 1e-5);
        assert!((head_wind(0.0, &wind) - 5.0).abs() < 1e-4);
        assert!(into_wind_heading_deg(&wind).abs() < 1e-3);
    }

    #[test]
    fn test_tailwind_has_no_headwind_component() {
        let wind = Vector3::new(-5.0, 0.0, 0.0);
        assert!((wind_alignment(180.0, &wind) + 1.0).abs() < 1e-5);
        assert_eq!(head_wind(180.0, &wind), 0.0);
    }

    #[test]
    fn test_crosswind_alignment_is_zero() {
        let wind = Vector3::new(0.0, 4.0, 0.0);
        assert!(wind_alignment(0.0, &wind).abs() < 1e-5);
        assert!((into_wind_heading_deg(&wind) - 270.0).abs() < 1e-3);
        assert!((wind_speed(&wind) - 4.0).abs() < 1e-6);
    }
}
