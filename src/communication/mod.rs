//! Communication Protocols
//!
//! Ground station facing output of the landing controller.
//!
//! # Protocols
//!
//! - **MAVLink 2.0**: STATUSTEXT messages carrying landing progress and
//!   faults, chunked for text over 50 bytes

pub mod mavlink;
