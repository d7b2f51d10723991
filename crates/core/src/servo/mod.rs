//! Control surface abstraction for the landing controller
//!
//! Deepstall takes direct control of the elevator (as a PWM value, since
//! the stall deflection is tuned per airframe in microseconds) and of the
//! rudder and aileron (as normalized commands, -1.0 to +1.0).
//!
//! # Design
//!
//! This module is pure `no_std` with no feature gates. Output drivers
//! belong in the firmware crate.

/// Output channels the deepstall handoff drives
pub trait ControlSurfaces {
    /// Current elevator output pulse width (μs)
    fn elevator_pwm(&self) -> u16;

    /// Override the elevator output pulse width (μs)
    fn set_elevator_pwm(&mut self, pwm: u16);

    /// Current normalized aileron command
    fn aileron(&self) -> f32;

    /// Set normalized aileron command (-1.0 left, +1.0 right)
    fn set_aileron(&mut self, normalized: f32);

    /// Set normalized rudder command (-1.0 left, +1.0 right)
    fn set_rudder(&mut self, normalized: f32);
}

/// Linear interpolation between two pulse widths
///
/// `progress` is clamped to 0.0..=1.0.
pub fn interpolate_pwm(from: u16, to: u16, progress: f32) -> u16 {
    let t = progress.clamp(0.0, 1.0);
    let value = from as f32 + (to as f32 - from as f32) * t;
    libm::roundf(value) as u16
}

/// Recorded surface outputs, for host tests
#[derive(Debug, Clone, Copy)]
pub struct MockSurfaces {
    pub elevator_pwm: u16,
    pub aileron: f32,
    pub rudder: f32,
}

impl Default for MockSurfaces {
    fn default() -> Self {
        Self {
            elevator_pwm: 1500,
            aileron: 0.0,
            rudder: 0.0,
        }
    }
}

impl ControlSurfaces for MockSurfaces {
    fn elevator_pwm(&self) -> u16 {
        self.elevator_pwm
    }

    fn set_elevator_pwm(&mut self, pwm: u16) {
        self.elevator_pwm = pwm;
    }

    fn aileron(&self) -> f32 {
        self.aileron
    }

    fn set_aileron(&mut self, normalized: f32) {
        self.aileron = normalized.clamp(-1.0, 1.0);
    }

    fn set_rudder(&mut self, normalized: f32) {
        self.rudder = normalized.clamp(-1.0, 1.0);
    }
}
