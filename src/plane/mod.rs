//! Fixed-wing vehicle integration
//!
//! Vehicle-specific glue around the portable landing core, following
//! ArduPilot's vehicle-specific layout (ArduPlane/).
//!
//! ## Modules
//!
//! - `landing`: Landing controller owning the landing dispatcher

pub mod landing;

pub use landing::{LandingController, LandingTick};
