//! Mission Commands and Storage
//!
//! The landing logic only needs a narrow view of the mission: the active
//! NAV command, random access by index, and the ability to jump. That view
//! is the [`MissionStore`] trait. [`MissionStorage`] is a fixed-capacity
//! in-memory implementation.
//!
//! # Mission Storage
//!
//! - Fixed-size command array (max 50 commands)
//! - In-memory storage (no persistence)
//! - Index 0 is the home slot, as in ArduPilot

pub mod command;

use heapless::Vec;

use crate::navigation::geo::calculate_distance;
use crate::navigation::Location;

pub use command::{
    cmd_has_waypoint, is_nav_command, MAV_CMD_DO_LAND_START, MAV_CMD_NAV_CONTINUE_AND_CHANGE_ALT,
    MAV_CMD_NAV_LAND, MAV_CMD_NAV_LAST, MAV_CMD_NAV_LOITER_TO_ALT, MAV_CMD_NAV_LOITER_UNLIM,
    MAV_CMD_NAV_RETURN_TO_LAUNCH, MAV_CMD_NAV_TAKEOFF, MAV_CMD_NAV_WAYPOINT,
};

/// Maximum number of commands in a mission
pub const MAX_COMMANDS: usize = 50;

/// A single mission item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionCommand {
    /// MAV_CMD identifier
    pub id: u16,
    /// Target location (altitude absolute, cm)
    pub location: Location,
    /// PARAM1 (command-specific)
    pub param1: f32,
    /// PARAM2 (command-specific)
    pub param2: f32,
    /// PARAM3 (command-specific)
    pub param3: f32,
    /// PARAM4 (command-specific; yaw for NAV_LAND)
    pub param4: f32,
}

impl MissionCommand {
    /// Command with a location and all parameters zero
    pub fn new(id: u16, location: Location) -> Self {
        Self {
            id,
            location,
            param1: 0.0,
            param2: 0.0,
            param3: 0.0,
            param4: 0.0,
        }
    }

    pub fn with_param1(mut self, value: f32) -> Self {
        self.param1 = value;
        self
    }

    pub fn with_param4(mut self, value: f32) -> Self {
        self.param4 = value;
        self
    }

    /// PARAM1 as the small integer ArduPilot stores in `p1`
    pub fn p1(&self) -> u16 {
        if self.param1.is_finite() && self.param1 >= 0.0 {
            self.param1 as u16
        } else {
            0
        }
    }
}

/// Mission execution state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MissionState {
    /// Mission not executing
    #[default]
    Stopped,
    /// Mission executing
    Running,
    /// All commands done
    Complete,
}

/// Mission access needed by the landing logic
pub trait MissionStore {
    /// Index of the active NAV command
    fn current_nav_index(&self) -> u16;

    /// The active NAV command, if any
    fn current_nav_cmd(&self) -> Option<MissionCommand>;

    /// Read a command by index
    fn read_cmd(&self, index: u16) -> Option<MissionCommand>;

    /// Jump to `index`. Returns false if the jump is not possible.
    fn set_current_cmd(&mut self, index: u16) -> bool;

    /// Index of the DO_LAND_START closest to `current`, if any
    fn landing_sequence_start(&self, current: &Location) -> Option<u16>;

    /// Index of the most recent NAV command before the active one that
    /// carries a full waypoint
    fn prev_nav_cmd_with_wp_index(&self) -> Option<u16>;

    fn stop(&mut self);

    fn resume(&mut self);

    fn state(&self) -> MissionState;
}

/// Mission storage
///
/// Stores mission commands in a fixed-size array.
#[derive(Debug, Clone)]
pub struct MissionStorage {
    commands: Vec<MissionCommand, MAX_COMMANDS>,
    /// Index of the active NAV command
    current_index: u16,
    state: MissionState,
}

impl Default for MissionStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MissionStorage {
    /// Create a new empty mission storage
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
            current_index: 0,
            state: MissionState::Stopped,
        }
    }

    /// Get number of commands
    pub fn count(&self) -> u16 {
        self.commands.len() as u16
    }

    /// Check if mission is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Clear all commands
    pub fn clear(&mut self) {
        self.commands.clear();
        self.current_index = 0;
        self.state = MissionState::Stopped;
    }

    /// Append a command
    ///
    /// Returns Err if the mission is full.
    pub fn add_command(&mut self, cmd: MissionCommand) -> Result<(), &'static str> {
        self.commands
            .push(cmd)
            .map_err(|_| "Mission full (max 50 commands)")
    }

    /// Start executing at the first NAV command after home
    pub fn start(&mut self) -> bool {
        if self.set_current_cmd(1) {
            self.state = MissionState::Running;
            true
        } else {
            false
        }
    }

    /// Advance to the next NAV command; marks the mission complete at the end
    pub fn advance(&mut self) -> bool {
        match self.next_nav_at_or_after(self.current_index + 1) {
            Some(index) => {
                self.current_index = index;
                true
            }
            None => {
                self.state = MissionState::Complete;
                false
            }
        }
    }

    /// All commands as a slice
    pub fn commands(&self) -> &[MissionCommand] {
        &self.commands
    }

    fn next_nav_at_or_after(&self, index: u16) -> Option<u16> {
        self.commands
            .iter()
            .enumerate()
            .skip(index as usize)
            .find(|(_, cmd)| is_nav_command(cmd.id))
            .map(|(i, _)| i as u16)
    }
}

impl MissionStore for MissionStorage {
    fn current_nav_index(&self) -> u16 {
        self.current_index
    }

    fn current_nav_cmd(&self) -> Option<MissionCommand> {
        self.commands
            .get(self.current_index as usize)
            .copied()
            .filter(|cmd| is_nav_command(cmd.id))
    }

    fn read_cmd(&self, index: u16) -> Option<MissionCommand> {
        self.commands.get(index as usize).copied()
    }

    /// Jumping to a DO command activates the next NAV command after it.
    fn set_current_cmd(&mut self, index: u16) -> bool {
        if index == 0 {
            return false;
        }
        match self.next_nav_at_or_after(index) {
            Some(nav_index) => {
                self.current_index = nav_index;
                true
            }
            None => false,
        }
    }

    fn landing_sequence_start(&self, current: &Location) -> Option<u16> {
        let mut best: Option<(u16, f32)> = None;
        for (i, cmd) in self.commands.iter().enumerate() {
            if cmd.id != MAV_CMD_DO_LAND_START {
                continue;
            }
            let distance = calculate_distance(current, &cmd.location);
            match best {
                Some((_, d)) if d <= distance => {}
                _ => best = Some((i as u16, distance)),
            }
        }
        best.map(|(i, _)| i)
    }

    fn prev_nav_cmd_with_wp_index(&self) -> Option<u16> {
        (1..self.current_index).rev().find(|&i| {
            self.commands
                .get(i as usize)
                .map(|cmd| cmd_has_waypoint(cmd.id) && !cmd.location.is_zero())
                .unwrap_or(false)
        })
    }

    fn stop(&mut self) {
        if self.state == MissionState::Running {
            self.state = MissionState::Stopped;
        }
    }

    fn resume(&mut self) {
        if self.state != MissionState::Complete && !self.commands.is_empty() {
            self.state = MissionState::Running;
        }
    }

    fn state(&self) -> MissionState {
        self.state
    }
}
