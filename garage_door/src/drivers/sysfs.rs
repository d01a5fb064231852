//! Linux sysfs GPIO backend.
//!
//! Drives pins through the legacy `/sys/class/gpio` interface:
//!
//! ```text
//! <root>/export            <- "12"
//! <root>/gpio12/direction  <- "high" | "low" | "in" | "out"
//! <root>/gpio12/value      <- "1" | "0"
//! <root>/unexport          <- "12"
//! ```
//!
//! The root is configurable so the backend can be exercised against a
//! plain directory.

use garage_common::consts::DEFAULT_SYSFS_GPIO_ROOT;
use garage_common::gpio::driver::{GpioBackend, GpioError};
use garage_common::gpio::types::{PinLevel, PinMode};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// sysfs GPIO backend.
#[derive(Debug)]
pub struct SysfsGpio {
    root: PathBuf,
    open_pins: HashSet<u32>,
}

impl SysfsGpio {
    /// Backend rooted at `/sys/class/gpio`.
    pub fn new() -> Self {
        Self::with_root(DEFAULT_SYSFS_GPIO_ROOT)
    }

    /// Backend rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            open_pins: HashSet::new(),
        }
    }

    /// sysfs root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pin_dir(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{pin}"))
    }

    fn write_file(&self, pin: u32, path: &Path, content: &str) -> Result<(), GpioError> {
        fs::write(path, content).map_err(|e| GpioError::Io {
            pin,
            reason: format!("{}: {e}", path.display()),
        })
    }

    fn ensure_open(&self, pin: u32) -> Result<(), GpioError> {
        if self.open_pins.contains(&pin) {
            Ok(())
        } else {
            Err(GpioError::PinNotOpen(pin))
        }
    }
}

impl Default for SysfsGpio {
    fn default() -> Self {
        Self::new()
    }
}

fn direction(mode: PinMode, level: PinLevel) -> &'static str {
    match (mode, level) {
        (PinMode::Input, _) => "in",
        (PinMode::Output, PinLevel::High) => "high",
        (PinMode::Output, PinLevel::Low) => "low",
    }
}

impl GpioBackend for SysfsGpio {
    fn name(&self) -> &'static str {
        "sysfs"
    }

    fn open(&mut self, pin: u32, mode: PinMode, level: PinLevel) -> Result<(), GpioError> {
        let dir = self.pin_dir(pin);
        if !dir.exists() {
            debug!("Exporting GPIO {pin} under {}", self.root.display());
            self.write_file(pin, &self.root.join("export"), &pin.to_string())?;
        }
        // "high"/"low" set direction and initial level atomically.
        self.write_file(pin, &dir.join("direction"), direction(mode, level))?;
        self.open_pins.insert(pin);
        Ok(())
    }

    fn set_mode(&mut self, pin: u32, mode: PinMode) -> Result<(), GpioError> {
        self.ensure_open(pin)?;
        let value = match mode {
            PinMode::Input => "in",
            PinMode::Output => "out",
        };
        self.write_file(pin, &self.pin_dir(pin).join("direction"), value)
    }

    fn write(&mut self, pin: u32, level: PinLevel) -> Result<(), GpioError> {
        self.ensure_open(pin)?;
        self.write_file(pin, &self.pin_dir(pin).join("value"), &level.as_bit().to_string())
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn close(&mut self, pin: u32) -> Result<(), GpioError> {
        if !self.open_pins.remove(&pin) {
            warn!("GPIO {pin} closed without being opened");
            return Ok(());
        }
        self.write_file(pin, &self.root.join("unexport"), &pin.to_string())
    }
}

/// Factory function to create a sysfs backend.
pub fn create_driver() -> Box<dyn GpioBackend> {
    Box::new(SysfsGpio::new())
}
