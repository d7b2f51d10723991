//! Core infrastructure
//!
//! Target-independent plumbing shared by the rest of the crate.

pub mod logging;
