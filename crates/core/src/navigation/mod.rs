//! Navigation types and utilities
//!
//! Fixed-point locations, flat-earth geometry, and the lateral controller
//! contract consumed by the landing strategies.

pub mod controller;
pub mod geo;
mod types;

pub use controller::{MockNavController, NavCommand, NavController};
pub use types::{Location, VehicleState};
