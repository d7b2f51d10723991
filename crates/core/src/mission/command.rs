//! Mission Command Identifiers
//!
//! MAVLink command IDs the landing logic inspects, and the NAV/DO
//! classification ArduPilot uses: IDs at or below `MAV_CMD_NAV_LAST` (95)
//! drive navigation, everything above is an immediate or condition command.

/// MAV_CMD_NAV_LAST: command IDs at or below this value are NAV commands.
pub const MAV_CMD_NAV_LAST: u16 = 95;

pub const MAV_CMD_NAV_WAYPOINT: u16 = 16;
pub const MAV_CMD_NAV_LOITER_UNLIM: u16 = 17;
pub const MAV_CMD_NAV_RETURN_TO_LAUNCH: u16 = 20;
pub const MAV_CMD_NAV_LAND: u16 = 21;
pub const MAV_CMD_NAV_TAKEOFF: u16 = 22;
/// Continue on the current course and climb/descend to the given altitude
pub const MAV_CMD_NAV_CONTINUE_AND_CHANGE_ALT: u16 = 30;
pub const MAV_CMD_NAV_LOITER_TO_ALT: u16 = 31;
/// Marker for the start of a landing sequence
pub const MAV_CMD_DO_LAND_START: u16 = 189;

/// Classify a command as NAV (drives navigation) or DO (immediate action).
pub fn is_nav_command(command_id: u16) -> bool {
    command_id <= MAV_CMD_NAV_LAST
}

/// NAV commands whose location is a real waypoint the aircraft flies to
///
/// RTL carries no position and CONTINUE_AND_CHANGE_ALT only uses altitude.
pub fn cmd_has_waypoint(command_id: u16) -> bool {
    is_nav_command(command_id)
        && command_id != MAV_CMD_NAV_RETURN_TO_LAUNCH
        && command_id != MAV_CMD_NAV_CONTINUE_AND_CHANGE_ALT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_nav_command_at_boundary() {
        assert!(is_nav_command(MAV_CMD_NAV_LAST));
        assert!(!is_nav_command(MAV_CMD_NAV_LAST + 1));
    }

    #[test]
    fn test_do_land_start_is_not_nav() {
        assert!(!is_nav_command(MAV_CMD_DO_LAND_START));
        assert!(!cmd_has_waypoint(MAV_CMD_DO_LAND_START));
    }

    #[test]
    fn test_cmd_has_waypoint() {
        assert!(cmd_has_waypoint(MAV_CMD_NAV_WAYPOINT));
        assert!(cmd_has_waypoint(MAV_CMD_NAV_LOITER_TO_ALT));
        assert!(!cmd_has_waypoint(MAV_CMD_NAV_RETURN_TO_LAUNCH));
        assert!(!cmd_has_waypoint(MAV_CMD_NAV_CONTINUE_AND_CHANGE_ALT));
    }
}
