#![cfg_attr(not(test), no_std)]

//! plane_landing - Autonomous landing for fixed-wing autopilots
//!
//! Vehicle-facing layer over `plane_landing_core`: logging, STATUSTEXT
//! delivery to the ground station and the landing controller the flight
//! mode logic drives every tick.

// Core infrastructure (logging macros)
pub mod core;

// Ground station output (MAVLink STATUSTEXT)
pub mod communication;

// Vehicle integration
pub mod plane;

pub use plane_landing_core as landing_core;
