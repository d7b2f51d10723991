//! plane_landing_core - Pure no_std landing logic for fixed-wing autopilots
//!
//! This crate contains the platform-agnostic landing algorithms and
//! the types they exchange with the vehicle. Everything here is
//! testable on the host without feature flags.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Navigation, mission, servo and GCS services
//!   are injected via traits
//!
//! # Modules
//!
//! - [`traits`]: Platform service traits (Clock)
//! - [`control`]: PID controller and scalar helpers
//! - [`gcs`]: Status text severities and sinks
//! - [`landing`]: Landing dispatcher, glide slope and deepstall strategies
//! - [`mission`]: Mission command storage and the landing-facing mission API
//! - [`navigation`]: Locations, vehicle state, geodesy and the nav controller contract
//! - [`parameters`]: Parameter store and typed landing parameter blocks
//! - [`servo`]: Control surface outputs

#![no_std]

pub mod control;
pub mod gcs;
pub mod landing;
pub mod mission;
pub mod navigation;
pub mod parameters;
pub mod servo;
pub mod traits;
