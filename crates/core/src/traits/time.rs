//! Time abstraction for the landing control loop.
//!
//! Landing logic runs off a monotonic millisecond tick, the same
//! resolution an autopilot scheduler exposes. `Clock` abstracts the
//! source so the state machine can be driven from tests with a
//! controllable time base.

use core::cell::Cell;

/// Monotonic millisecond clock.
///
/// The counter is allowed to wrap; consumers compute intervals with
/// `wrapping_sub` (see [`Clock::elapsed_ms`]).
///
/// # Example
///
/// ```
/// use plane_landing_core::traits::{Clock, MockClock};
///
/// fn tick<C: Clock>(clock: &C, last_ms: &mut u32) -> u32 {
///     let dt = clock.elapsed_ms(*last_ms);
///     *last_ms = clock.now_ms();
///     dt
/// }
///
/// let clock = MockClock::with_initial(1_000);
/// let mut last = 990;
/// assert_eq!(tick(&clock, &mut last), 10);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since system start.
    fn now_ms(&self) -> u32;

    /// Milliseconds elapsed since `reference_ms`, tolerant of counter wrap.
    fn elapsed_ms(&self, reference_ms: u32) -> u32 {
        self.now_ms().wrapping_sub(reference_ms)
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock clock with manually controlled time.
#[derive(Clone, Default)]
pub struct MockClock {
    current_ms: Cell<u32>,
}

impl MockClock {
    /// Creates a new `MockClock` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_ms: Cell::new(0),
        }
    }

    /// Creates a new `MockClock` starting at the specified time.
    pub fn with_initial(ms: u32) -> Self {
        Self {
            current_ms: Cell::new(ms),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, ms: u32) {
        self.current_ms.set(ms);
    }

    /// Advances the current time by the specified amount.
    pub fn advance(&self, ms: u32) {
        self.current_ms.set(self.current_ms.get().wrapping_add(ms));
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        self.current_ms.get()
    }
}
