//! Door switch actuator.
//!
//! A pulse is the configured action sequence (write a level / set a mode)
//! replayed in order on the door switch pin, with the backend's blocking
//! sleep after each action. The actuator holds no door state; pulsing twice
//! simply re-issues the same electrical signal.

use garage_common::door::config::{DoorConfig, GpioActions};
use garage_common::gpio::driver::{GpioBackend, GpioError};
use garage_common::gpio::types::{GpioAction, PinLevel, PinMode};
use std::time::Duration;
use tracing::{debug, trace};

/// Anything that can emit the door switch pulse.
pub trait Actuator {
    /// Run the full pulse sequence. Blocks until it has completed.
    ///
    /// # Errors
    /// Any pin I/O failure aborts the remaining actions.
    fn pulse(&mut self) -> Result<(), GpioError>;
}

/// Actuator driving one GPIO pin through a [`GpioBackend`].
pub struct GpioActuator<B> {
    backend: B,
    pin: u32,
    initial_mode: PinMode,
    initial_level: PinLevel,
    actions: GpioActions,
    action_delay: Duration,
    pulses: u64,
}

impl<B: GpioBackend> GpioActuator<B> {
    /// Create an actuator for `pin`.
    pub fn new(
        backend: B,
        pin: u32,
        initial_mode: PinMode,
        initial_level: PinLevel,
        actions: GpioActions,
        action_delay: Duration,
    ) -> Self {
        Self {
            backend,
            pin,
            initial_mode,
            initial_level,
            actions,
            action_delay,
            pulses: 0,
        }
    }

    /// Create an actuator from the pin settings of a door configuration.
    pub fn from_config(backend: B, config: &DoorConfig) -> Self {
        Self::new(
            backend,
            config.door_switch_pin,
            config.initial_gpio_mode,
            config.initial_gpio_value,
            config.gpio_open_actions.clone(),
            config.action_delay(),
        )
    }

    /// Open the pin with its initial mode and level.
    pub fn init(&mut self) -> Result<(), GpioError> {
        debug!(
            "Opening pin {} on '{}' backend ({}, {})",
            self.pin,
            self.backend.name(),
            self.initial_mode,
            self.initial_level
        );
        self.backend
            .open(self.pin, self.initial_mode, self.initial_level)
    }

    /// Release the pin.
    pub fn shutdown(&mut self) -> Result<(), GpioError> {
        self.backend.close(self.pin)
    }

    /// Number of pulses completed so far.
    #[inline]
    pub fn pulse_count(&self) -> u64 {
        self.pulses
    }

    /// Pin driven by this actuator.
    #[inline]
    pub fn pin(&self) -> u32 {
        self.pin
    }

    /// Configured pulse sequence.
    pub fn actions(&self) -> &[GpioAction] {
        &self.actions
    }

    /// Underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Underlying backend, mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: GpioBackend> Actuator for GpioActuator<B> {
    fn pulse(&mut self) -> Result<(), GpioError> {
        for action in &self.actions {
            trace!(pin = self.pin, %action, "gpio action");
            match *action {
                GpioAction::Write(level) => self.backend.write(self.pin, level)?,
                GpioAction::Mode(mode) => self.backend.set_mode(self.pin, mode)?,
            }
            self.backend.sleep(self.action_delay);
        }
        self.pulses += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Open(u32, PinMode, PinLevel),
        Mode(u32, PinMode),
        Write(u32, PinLevel),
        Sleep(Duration),
    }

    #[derive(Default)]
    struct RecordingBackend {
        ops: Vec<Op>,
        fail_writes: bool,
    }

    impl GpioBackend for RecordingBackend {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn open(&mut self, pin: u32, mode: PinMode, level: PinLevel) -> Result<(), GpioError> {
            self.ops.push(Op::Open(pin, mode, level));
            Ok(())
        }

        fn set_mode(&mut self, pin: u32, mode: PinMode) -> Result<(), GpioError> {
            self.ops.push(Op::Mode(pin, mode));
            Ok(())
        }

        fn write(&mut self, pin: u32, level: PinLevel) -> Result<(), GpioError> {
            if self.fail_writes {
                return Err(GpioError::Io {
                    pin,
                    reason: "line stuck".to_string(),
                });
            }
            self.ops.push(Op::Write(pin, level));
            Ok(())
        }

        fn sleep(&mut self, duration: Duration) {
            self.ops.push(Op::Sleep(duration));
        }
    }

    fn actions(list: &[GpioAction]) -> GpioActions {
        list.iter().copied().collect()
    }

    #[test]
    fn init_opens_pin_with_initial_state() {
        let mut actuator = GpioActuator::from_config(RecordingBackend::default(), &DoorConfig::default());
        actuator.init().unwrap();
        assert_eq!(
            actuator.backend().ops,
            vec![Op::Open(12, PinMode::Output, PinLevel::High)]
        );
    }

    #[test]
    fn pulse_runs_actions_in_order_with_delay_after_each() {
        let delay = Duration::from_millis(500);
        let mut actuator = GpioActuator::new(
            RecordingBackend::default(),
            18,
            PinMode::Output,
            PinLevel::High,
            actions(&[
                GpioAction::Mode(PinMode::Output),
                GpioAction::Write(PinLevel::High),
                GpioAction::Write(PinLevel::Low),
            ]),
            delay,
        );

        actuator.pulse().unwrap();

        assert_eq!(
            actuator.backend().ops,
            vec![
                Op::Mode(18, PinMode::Output),
                Op::Sleep(delay),
                Op::Write(18, PinLevel::High),
                Op::Sleep(delay),
                Op::Write(18, PinLevel::Low),
                Op::Sleep(delay),
            ]
        );
        assert_eq!(actuator.pulse_count(), 1);
    }

    #[test]
    fn pulse_twice_reissues_same_sequence() {
        let mut actuator = GpioActuator::from_config(RecordingBackend::default(), &DoorConfig::default());
        actuator.pulse().unwrap();
        let first = actuator.backend().ops.clone();
        actuator.pulse().unwrap();

        let ops = &actuator.backend().ops;
        assert_eq!(ops.len(), first.len() * 2);
        assert_eq!(&ops[first.len()..], first.as_slice());
        assert_eq!(actuator.pulse_count(), 2);
    }

    #[test]
    fn pulse_failure_aborts_and_is_not_counted() {
        let mut backend = RecordingBackend::default();
        backend.fail_writes = true;
        let mut actuator = GpioActuator::from_config(backend, &DoorConfig::default());

        let err = actuator.pulse().unwrap_err();
        assert!(matches!(err, GpioError::Io { pin: 12, .. }));
        assert!(actuator.backend().ops.is_empty());
        assert_eq!(actuator.pulse_count(), 0);
    }
}
