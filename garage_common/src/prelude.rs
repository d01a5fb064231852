//! Prelude module for common re-exports.
//!
//! ```rust
//! use garage_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel};
pub use crate::door::config::{DoorConfig, GpioActions, RawDoorConfig};

// ─── Door ───────────────────────────────────────────────────────────
pub use crate::door::types::{AutoClosingMode, DoorState, TargetState};

// ─── GPIO ───────────────────────────────────────────────────────────
pub use crate::gpio::driver::{GpioBackend, GpioError, GpioFactory};
pub use crate::gpio::types::{GpioAction, PinLevel, PinMode};
