//! Landing sequence restart after a go-around
//!
//! Once an aborted landing has climbed back out, the mission is rewound so
//! the aircraft flies the approach again. Candidates are tried in order and
//! the first jump the mission accepts wins:
//!
//! 1. A pending `NAV_CONTINUE_AND_CHANGE_ALT` right after the landing
//! 2. The nearest `DO_LAND_START` marker
//! 3. The last NAV command with a real position before the landing

use crate::gcs::{Severity, StatusTextSink};
use crate::mission::{MissionStore, MAV_CMD_NAV_CONTINUE_AND_CHANGE_ALT, MAV_CMD_NAV_LAND};
use crate::navigation::Location;

use super::LandingError;

/// Where the mission resumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPoint {
    /// Climb item following the landing, altitude in meters
    Climb { index: u16, alt_m: i32 },
    /// `DO_LAND_START` marker
    LandStart { index: u16 },
    /// Previous positioned NAV command
    PreviousWaypoint { index: u16 },
}

impl RestartPoint {
    pub fn index(&self) -> u16 {
        match *self {
            RestartPoint::Climb { index, .. }
            | RestartPoint::LandStart { index }
            | RestartPoint::PreviousWaypoint { index } => index,
        }
    }
}

/// Rewind the mission to fly the landing again
///
/// Leaves the mission untouched on failure.
pub fn restart_landing_sequence(
    mission: &mut dyn MissionStore,
    current: &Location,
    gcs: &mut dyn StatusTextSink,
) -> Result<RestartPoint, LandingError> {
    let current_cmd = mission.current_nav_cmd();
    if current_cmd.map(|cmd| cmd.id) != Some(MAV_CMD_NAV_LAND) {
        gcs.send_text(Severity::Warning, format_args!("Unable to restart landing sequence"));
        return Err(LandingError::NotLanding);
    }

    let current_index = mission.current_nav_index();

    if let Some(point) = try_pending_climb(mission, current_index) {
        if let RestartPoint::Climb { alt_m, .. } = point {
            gcs.send_text(
                Severity::Notice,
                format_args!("Restarted landing sequence. Climbing to {}m", alt_m),
            );
        }
        return Ok(point);
    }

    if let Some(index) = mission.landing_sequence_start(current) {
        if index != 0 && mission.set_current_cmd(index) {
            gcs.send_text(
                Severity::Notice,
                format_args!("Restarted landing via DO_LAND_START: {}", index),
            );
            return Ok(RestartPoint::LandStart { index });
        }
    }

    if let Some(index) = mission.prev_nav_cmd_with_wp_index() {
        if mission.set_current_cmd(index) {
            gcs.send_text(
                Severity::Notice,
                format_args!("Restarted landing sequence at waypoint {}", index),
            );
            return Ok(RestartPoint::PreviousWaypoint { index });
        }
    }

    gcs.send_text(Severity::Warning, format_args!("Unable to restart landing sequence"));
    Err(LandingError::RestartFailed)
}

/// A climb item directly after the landing is a pre-planned go-around
fn try_pending_climb(mission: &mut dyn MissionStore, current_index: u16) -> Option<RestartPoint> {
    let index = current_index.checked_add(1)?;
    let cmd = mission.read_cmd(index)?;
    if cmd.id != MAV_CMD_NAV_CONTINUE_AND_CHANGE_ALT || cmd.p1() > 1 {
        return None;
    }
    if !mission.set_current_cmd(index) {
        return None;
    }
    Some(RestartPoint::Climb {
        index,
        alt_m: cmd.location.alt / 100,
    })
}
