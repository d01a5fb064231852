//! GPIO backend trait and error types.
//!
//! This module defines:
//! - `GpioBackend` trait - Interface for pluggable pin I/O backends
//! - `GpioError` enum - Error types for pin operations
//! - `GpioFactory` type alias - Factory function type

use crate::gpio::types::{PinLevel, PinMode};
use std::time::Duration;
use thiserror::Error;

/// Error types for GPIO operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpioError {
    /// Low-level read/write on the line failed.
    #[error("GPIO I/O error on pin {pin}: {reason}")]
    Io {
        /// Pin the operation targeted.
        pin: u32,
        /// Backend-specific failure description.
        reason: String,
    },

    /// Operation on a pin that was never opened.
    #[error("Pin {0} has not been opened")]
    PinNotOpen(u32),

    /// Backend not found in the registry.
    #[error("GPIO backend not found: {0}")]
    BackendNotFound(String),

    /// A backend with this name is already registered.
    #[error("GPIO backend already registered: {0}")]
    DuplicateBackend(String),
}

/// Factory function type for creating backend instances.
pub type GpioFactory = fn() -> Box<dyn GpioBackend>;

/// Trait defining the pin I/O primitive used by the door actuator.
///
/// All operations are synchronous. `sleep` is the pacing primitive between
/// successive pulse actions and blocks the calling thread.
///
/// # Lifecycle
///
/// 1. `open()` - Claim the pin with an initial direction and level
/// 2. `write()` / `set_mode()` / `sleep()` - Pulse sequence
/// 3. `close()` - Release the pin
pub trait GpioBackend: Send {
    /// Returns the backend's unique identifier (e.g., "simulation", "sysfs").
    fn name(&self) -> &'static str;

    /// Claim `pin` and put it in `mode` with initial `level`.
    fn open(&mut self, pin: u32, mode: PinMode, level: PinLevel) -> Result<(), GpioError>;

    /// Change the direction of `pin`.
    fn set_mode(&mut self, pin: u32, mode: PinMode) -> Result<(), GpioError>;

    /// Drive `pin` to `level`.
    fn write(&mut self, pin: u32, level: PinLevel) -> Result<(), GpioError>;

    /// Block for `duration`.
    fn sleep(&mut self, duration: Duration);

    /// Release `pin`.
    /// Default: no-op
    fn close(&mut self, _pin: u32) -> Result<(), GpioError> {
        Ok(())
    }
}

impl GpioBackend for Box<dyn GpioBackend> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn open(&mut self, pin: u32, mode: PinMode, level: PinLevel) -> Result<(), GpioError> {
        (**self).open(pin, mode, level)
    }

    fn set_mode(&mut self, pin: u32, mode: PinMode) -> Result<(), GpioError> {
        (**self).set_mode(pin, mode)
    }

    fn write(&mut self, pin: u32, level: PinLevel) -> Result<(), GpioError> {
        (**self).write(pin, level)
    }

    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }

    fn close(&mut self, pin: u32) -> Result<(), GpioError> {
        (**self).close(pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingBackend {
        writes: u32,
    }

    impl GpioBackend for CountingBackend {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn open(&mut self, _pin: u32, _mode: PinMode, _level: PinLevel) -> Result<(), GpioError> {
            Ok(())
        }

        fn set_mode(&mut self, _pin: u32, _mode: PinMode) -> Result<(), GpioError> {
            Ok(())
        }

        fn write(&mut self, _pin: u32, _level: PinLevel) -> Result<(), GpioError> {
            self.writes += 1;
            Ok(())
        }

        fn sleep(&mut self, _duration: Duration) {}
    }

    #[test]
    fn test_gpio_error_display() {
        let err = GpioError::Io {
            pin: 12,
            reason: "device busy".to_string(),
        };
        assert!(err.to_string().contains("pin 12"));
        assert!(err.to_string().contains("device busy"));

        let err = GpioError::BackendNotFound("pigpio".to_string());
        assert!(err.to_string().contains("pigpio"));

        let err = GpioError::DuplicateBackend("sysfs".to_string());
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn test_boxed_backend_delegates() {
        let mut boxed: Box<dyn GpioBackend> = Box::new(CountingBackend { writes: 0 });
        assert_eq!(GpioBackend::name(&boxed), "counting");
        GpioBackend::write(&mut boxed, 1, PinLevel::High).unwrap();
        assert!(GpioBackend::close(&mut boxed, 1).is_ok());
    }
}
