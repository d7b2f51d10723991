//! Platform service traits for the landing core.
//!
//! Trait definitions are pure and carry no feature gates. Mock
//! implementations are always available for host testing.

pub mod time;

pub use time::{Clock, MockClock};
