//! GPIO backend implementations and the table that selects one by name.
//!
//! - [`simulation`] - In-memory pin table for development and testing
//! - [`sysfs`] - Linux `/sys/class/gpio` character files
//!
//! The binary picks a backend with `--driver <name>`; `--list-drivers`
//! prints [`GpioRegistry::backends`].
//!
//! # Adding New Backends
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `GpioBackend` from `garage_common::gpio::driver`
//! 3. Add a [`BackendInfo`] to [`BUILTIN_BACKENDS`]

pub mod simulation;
pub mod sysfs;

use garage_common::gpio::driver::{GpioBackend, GpioError, GpioFactory};
use std::collections::BTreeMap;
use tracing::debug;

/// A selectable GPIO backend.
#[derive(Debug, Clone, Copy)]
pub struct BackendInfo {
    /// Name used on the command line.
    pub name: &'static str,
    /// One-line description for `--list-drivers`.
    pub summary: &'static str,
    /// Constructor.
    pub factory: GpioFactory,
}

/// Backends compiled into the binary.
pub const BUILTIN_BACKENDS: &[BackendInfo] = &[
    BackendInfo {
        name: "simulation",
        summary: "in-memory pins, logs operations, no hardware",
        factory: simulation::create_driver,
    },
    BackendInfo {
        name: "sysfs",
        summary: "Linux /sys/class/gpio character files",
        factory: sysfs::create_driver,
    },
];

/// Backends available to this process, by name.
#[derive(Debug, Default)]
pub struct GpioRegistry {
    backends: BTreeMap<&'static str, BackendInfo>,
}

impl GpioRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding [`BUILTIN_BACKENDS`].
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for info in BUILTIN_BACKENDS {
            registry.backends.insert(info.name, *info);
        }
        registry
    }

    /// Add a backend.
    ///
    /// # Errors
    /// `GpioError::DuplicateBackend` if the name is taken; the existing
    /// entry is kept.
    pub fn register(&mut self, info: BackendInfo) -> Result<(), GpioError> {
        if self.backends.contains_key(info.name) {
            return Err(GpioError::DuplicateBackend(info.name.to_string()));
        }
        debug!("GPIO backend '{}' registered", info.name);
        self.backends.insert(info.name, info);
        Ok(())
    }

    /// Instantiate the backend called `name`.
    ///
    /// # Errors
    /// `GpioError::BackendNotFound` if nothing is registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn GpioBackend>, GpioError> {
        let info = self
            .backends
            .get(name)
            .ok_or_else(|| GpioError::BackendNotFound(name.to_string()))?;
        Ok((info.factory)())
    }

    /// Registered backends in name order.
    pub fn backends(&self) -> impl Iterator<Item = &BackendInfo> {
        self.backends.values()
    }

    /// Registered names in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.backends.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garage_common::gpio::types::{PinLevel, PinMode};
    use std::time::Duration;

    struct NullBackend;

    impl GpioBackend for NullBackend {
        fn name(&self) -> &'static str {
            "null"
        }

        fn open(&mut self, _pin: u32, _mode: PinMode, _level: PinLevel) -> Result<(), GpioError> {
            Ok(())
        }

        fn set_mode(&mut self, _pin: u32, _mode: PinMode) -> Result<(), GpioError> {
            Ok(())
        }

        fn write(&mut self, _pin: u32, _level: PinLevel) -> Result<(), GpioError> {
            Ok(())
        }

        fn sleep(&mut self, _duration: Duration) {}
    }

    fn create_null() -> Box<dyn GpioBackend> {
        Box::new(NullBackend)
    }

    fn null_info() -> BackendInfo {
        BackendInfo {
            name: "null",
            summary: "discards everything",
            factory: create_null,
        }
    }

    #[test]
    fn builtin_backends_are_listed_in_order() {
        let reg = GpioRegistry::with_builtin();
        assert_eq!(reg.names(), vec!["simulation", "sysfs"]);
        assert!(reg.backends().all(|info| !info.summary.is_empty()));
        assert_eq!(reg.create("simulation").unwrap().name(), "simulation");
        assert_eq!(reg.create("sysfs").unwrap().name(), "sysfs");
    }

    #[test]
    fn registered_backend_can_be_created() {
        let mut reg = GpioRegistry::with_builtin();
        reg.register(null_info()).unwrap();

        assert_eq!(reg.names(), vec!["null", "simulation", "sysfs"]);
        assert_eq!(reg.create("null").unwrap().name(), "null");
    }

    #[test]
    fn unknown_backend_is_an_error() {
        let reg = GpioRegistry::new();
        let result = reg.create("pigpio");
        assert!(matches!(result, Err(GpioError::BackendNotFound(ref n)) if n == "pigpio"));
    }

    #[test]
    fn duplicate_name_is_rejected_and_first_entry_kept() {
        let mut reg = GpioRegistry::with_builtin();
        let shadow = BackendInfo {
            name: "simulation",
            ..null_info()
        };

        assert_eq!(
            reg.register(shadow),
            Err(GpioError::DuplicateBackend("simulation".to_string()))
        );
        assert_eq!(reg.create("simulation").unwrap().name(), "simulation");
    }
}
