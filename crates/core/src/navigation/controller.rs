//! Lateral navigation controller contract
//!
//! The landing strategies do not steer the aircraft themselves outside the
//! final deepstall phase. They hand a target to the vehicle's lateral
//! controller (L1 or similar) and read back its tracking status.

use crate::navigation::types::Location;

/// Lateral navigation controller used by the landing strategies
pub trait NavController {
    /// True once the aircraft is established on the loiter circle
    fn reached_loiter_target(&self) -> bool;

    /// Bearing from the aircraft to the current nav target in centidegrees
    fn target_bearing_cd(&self) -> i32;

    /// Difference between target bearing and aircraft heading in centidegrees
    fn bearing_error_cd(&self) -> i32;

    /// Cross-track error in meters from the active path
    fn crosstrack_error(&self) -> f32;

    /// True when the controller has not been updated recently
    fn data_is_stale(&self) -> bool;

    /// Track the straight segment `prev -> next`
    fn update_waypoint(&mut self, prev: &Location, next: &Location);

    /// Circle `center` at `radius` meters (direction: 1 clockwise, -1 counter)
    fn update_loiter(&mut self, center: &Location, radius: f32, direction: i8);

    /// Hold a fixed ground heading in centidegrees
    fn update_heading_hold(&mut self, heading_cd: i32);
}

/// Last command issued to a [`MockNavController`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NavCommand {
    /// No command issued yet
    None,
    /// Straight segment
    Waypoint { prev: Location, next: Location },
    /// Loiter circle
    Loiter { center: Location, radius: f32 },
    /// Fixed heading
    HeadingHold { heading_cd: i32 },
}

/// Scriptable navigation controller for host tests
#[derive(Clone, Debug)]
pub struct MockNavController {
    pub reached_loiter: bool,
    pub target_bearing_cd: i32,
    pub bearing_error_cd: i32,
    pub crosstrack_error: f32,
    pub stale: bool,
    pub last_command: NavCommand,
}

impl MockNavController {
    /// Controller that is tracking perfectly with fresh data
    pub fn new() -> Self {
        Self {
            reached_loiter: false,
            target_bearing_cd: 0,
            bearing_error_cd: 0,
            crosstrack_error: 0.0,
            stale: false,
            last_command: NavCommand::None,
        }
    }
}

impl Default for MockNavController {
    fn default() -> Self {
        Self::new()
    }
}

impl NavController for MockNavController {
    fn reached_loiter_target(&self) -> bool {
        self.reached_loiter
    }

    fn target_bearing_cd(&self) -> i32 {
        self.target_bearing_cd
    }

    fn bearing_error_cd(&self) -> i32 {
        self.bearing_error_cd
    }

    fn crosstrack_error(&self) -> f32 {
        self.crosstrack_error
    }

    fn data_is_stale(&self) -> bool {
        self.stale
    }

    fn update_waypoint(&mut self, prev: &Location, next: &Location) {
        self.last_command = NavCommand::Waypoint {
            prev: *prev,
            next: *next,
        };
    }

    fn update_loiter(&mut self, center: &Location, radius: f32, _direction: i8) {
        self.last_command = NavCommand::Loiter {
            center: *center,
            radius,
        };
    }

    fn update_heading_hold(&mut self, heading_cd: i32) {
        self.last_command = NavCommand::HeadingHold { heading_cd };
    }
}
