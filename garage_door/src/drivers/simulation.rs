//! Simulated GPIO backend.
//!
//! Keeps a pin table in memory and logs recent operations, so pulses can be
//! inspected without hardware. The log is a ring of the last
//! [`OP_LOG_CAPACITY`] operations. Sleeping is real by default and can be
//! switched off for tests.

use garage_common::gpio::driver::{GpioBackend, GpioError};
use garage_common::gpio::types::{PinLevel, PinMode};
use heapless::HistoryBuf;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, trace};

/// Number of operations kept in the log.
pub const OP_LOG_CAPACITY: usize = 256;

/// One recorded backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioOp {
    /// Pin claimed.
    Open(u32, PinMode, PinLevel),
    /// Direction changed.
    SetMode(u32, PinMode),
    /// Level written.
    Write(u32, PinLevel),
    /// Pacing delay.
    Sleep(Duration),
    /// Pin released.
    Close(u32),
}

/// Simulated pin state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPin {
    /// Current direction.
    pub mode: PinMode,
    /// Last level written.
    pub level: PinLevel,
}

/// In-memory GPIO backend.
#[derive(Debug)]
pub struct SimulatedGpio {
    pins: HashMap<u32, SimPin>,
    ops: HistoryBuf<GpioOp, OP_LOG_CAPACITY>,
    real_sleep: bool,
    fail_after: Option<usize>,
}

impl SimulatedGpio {
    /// Create a backend with real sleeps.
    pub fn new() -> Self {
        Self {
            pins: HashMap::new(),
            ops: HistoryBuf::new(),
            real_sleep: true,
            fail_after: None,
        }
    }

    /// Enable or disable real sleeping. Sleeps are logged either way.
    pub fn with_sleep(mut self, enabled: bool) -> Self {
        self.real_sleep = enabled;
        self
    }

    /// Make every pin write/mode change fail once `count` more have succeeded.
    pub fn fail_after(&mut self, count: usize) {
        self.fail_after = Some(count);
    }

    /// Clear fault injection.
    pub fn clear_fault(&mut self) {
        self.fail_after = None;
    }

    /// Logged operations, oldest first.
    pub fn ops(&self) -> Vec<GpioOp> {
        self.ops.oldest_ordered().copied().collect()
    }

    /// Number of `Write` operations in the log.
    pub fn write_count(&self) -> usize {
        self.ops
            .oldest_ordered()
            .filter(|op| matches!(op, GpioOp::Write(..)))
            .count()
    }

    /// State of `pin`, if open.
    pub fn pin(&self, pin: u32) -> Option<SimPin> {
        self.pins.get(&pin).copied()
    }

    fn check_fault(&mut self, pin: u32) -> Result<(), GpioError> {
        match self.fail_after {
            Some(0) => Err(GpioError::Io {
                pin,
                reason: "injected fault".to_string(),
            }),
            Some(ref mut n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn pin_mut(&mut self, pin: u32) -> Result<&mut SimPin, GpioError> {
        self.pins.get_mut(&pin).ok_or(GpioError::PinNotOpen(pin))
    }
}

impl Default for SimulatedGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioBackend for SimulatedGpio {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn open(&mut self, pin: u32, mode: PinMode, level: PinLevel) -> Result<(), GpioError> {
        debug!("Simulated pin {pin} opened ({mode}, {level})");
        self.pins.insert(pin, SimPin { mode, level });
        self.ops.write(GpioOp::Open(pin, mode, level));
        Ok(())
    }

    fn set_mode(&mut self, pin: u32, mode: PinMode) -> Result<(), GpioError> {
        self.check_fault(pin)?;
        self.pin_mut(pin)?.mode = mode;
        trace!("Simulated pin {pin} mode {mode}");
        self.ops.write(GpioOp::SetMode(pin, mode));
        Ok(())
    }

    fn write(&mut self, pin: u32, level: PinLevel) -> Result<(), GpioError> {
        self.check_fault(pin)?;
        self.pin_mut(pin)?.level = level;
        trace!("Simulated pin {pin} <- {level}");
        self.ops.write(GpioOp::Write(pin, level));
        Ok(())
    }

    fn sleep(&mut self, duration: Duration) {
        self.ops.write(GpioOp::Sleep(duration));
        if self.real_sleep {
            std::thread::sleep(duration);
        }
    }

    fn close(&mut self, pin: u32) -> Result<(), GpioError> {
        self.pins.remove(&pin);
        self.ops.write(GpioOp::Close(pin));
        Ok(())
    }
}

/// Factory function to create a simulated backend.
pub fn create_driver() -> Box<dyn GpioBackend> {
    Box::new(SimulatedGpio::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_open_pin() {
        let mut gpio = SimulatedGpio::new().with_sleep(false);
        assert_eq!(gpio.write(5, PinLevel::Low), Err(GpioError::PinNotOpen(5)));

        gpio.open(5, PinMode::Output, PinLevel::High).unwrap();
        gpio.write(5, PinLevel::Low).unwrap();
        assert_eq!(
            gpio.pin(5),
            Some(SimPin {
                mode: PinMode::Output,
                level: PinLevel::Low
            })
        );
    }

    #[test]
    fn operations_are_logged() {
        let mut gpio = SimulatedGpio::new().with_sleep(false);
        gpio.open(12, PinMode::Output, PinLevel::High).unwrap();
        gpio.set_mode(12, PinMode::Input).unwrap();
        gpio.sleep(Duration::from_secs(3600));
        gpio.close(12).unwrap();

        assert_eq!(
            gpio.ops(),
            &[
                GpioOp::Open(12, PinMode::Output, PinLevel::High),
                GpioOp::SetMode(12, PinMode::Input),
                GpioOp::Sleep(Duration::from_secs(3600)),
                GpioOp::Close(12),
            ]
        );
        assert_eq!(gpio.pin(12), None);
    }

    #[test]
    fn op_log_keeps_only_recent_operations() {
        let mut gpio = SimulatedGpio::new().with_sleep(false);
        gpio.open(3, PinMode::Output, PinLevel::High).unwrap();
        for _ in 0..OP_LOG_CAPACITY {
            gpio.write(3, PinLevel::Low).unwrap();
        }
        gpio.write(3, PinLevel::High).unwrap();

        let ops = gpio.ops();
        assert_eq!(ops.len(), OP_LOG_CAPACITY);
        assert_eq!(ops.first(), Some(&GpioOp::Write(3, PinLevel::Low)));
        assert_eq!(ops.last(), Some(&GpioOp::Write(3, PinLevel::High)));
        assert_eq!(gpio.write_count(), OP_LOG_CAPACITY);
    }

    #[test]
    fn fault_injection_counts_down() {
        let mut gpio = SimulatedGpio::new().with_sleep(false);
        gpio.open(1, PinMode::Output, PinLevel::High).unwrap();
        gpio.fail_after(1);

        gpio.write(1, PinLevel::Low).unwrap();
        assert!(matches!(gpio.write(1, PinLevel::High), Err(GpioError::Io { pin: 1, .. })));
        assert!(gpio.set_mode(1, PinMode::Input).is_err());
        assert_eq!(gpio.write_count(), 1);

        gpio.clear_fault();
        gpio.write(1, PinLevel::High).unwrap();
        assert_eq!(gpio.write_count(), 2);
    }
}
