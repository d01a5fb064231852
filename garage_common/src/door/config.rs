//! Door configuration schema.
//!
//! Configuration is read in two stages:
//!
//! 1. `RawDoorConfig` - loose TOML shape; every field optional, enums as strings
//! 2. `DoorConfig` - sanitized, validated and immutable
//!
//! Out-of-range enumerated values (`auto_closing_mode`, `initial_gpio_mode`,
//! `initial_gpio_value`) fall back to their defaults with a warning. A pulse
//! sequence that is still malformed after sanitization is a hard error.
//!
//! # TOML Example
//!
//! ```toml
//! name = "Garage"
//! simulate_time_opening = 12.0
//! simulate_time_closing = 14.0
//! auto_closing_delay = 60.0
//! auto_closing_mode = "force"
//! door_switch_pin = 18
//! gpio_action_delay = 0.5
//! gpio_open_actions = [
//!     { type = "write", value = "HIGH" },
//!     { type = "write", value = "LOW" },
//! ]
//! ```

use crate::config::{ConfigError, ConfigLoader, LogLevel, UnknownVariant};
use crate::consts::{
    DEFAULT_AUTO_CLOSING_DELAY, DEFAULT_DOOR_SWITCH_PIN, DEFAULT_GPIO_ACTION_DELAY, DEFAULT_NAME,
    DEFAULT_SIMULATE_TIME_CLOSING, DEFAULT_SIMULATE_TIME_OPENING, MAX_DURATION_SECS,
    MAX_GPIO_ACTIONS,
};
use crate::door::types::AutoClosingMode;
use crate::gpio::types::{GpioAction, PinLevel, PinMode};
use serde::Deserialize;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Ordered pulse sequence, bounded by `MAX_GPIO_ACTIONS`.
pub type GpioActions = heapless::Vec<GpioAction, MAX_GPIO_ACTIONS>;

/// One pulse step as written in the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGpioAction {
    /// Operation kind: `write` or `mode`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Operand: `HIGH`/`LOW` for writes, `INPUT`/`OUTPUT` for mode changes.
    pub value: String,
}

/// Configuration as found on disk, before sanitization.
///
/// camelCase aliases accept Homebridge-style accessory blocks as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDoorConfig {
    /// Accessory name.
    pub name: Option<String>,
    /// Log the effective configuration and motion completions.
    pub verbose: Option<bool>,
    /// Base log level.
    pub log_level: Option<LogLevel>,
    /// Full opening duration (seconds).
    #[serde(alias = "simulateTimeOpening")]
    pub simulate_time_opening: Option<f64>,
    /// Full closing duration (seconds).
    #[serde(alias = "simulateTimeClosing")]
    pub simulate_time_closing: Option<f64>,
    /// Delay after fully open before auto-close (seconds).
    #[serde(alias = "autoClosingDelay")]
    pub auto_closing_delay: Option<f64>,
    /// `none`, `self` or `force`.
    #[serde(alias = "autoClosingMode")]
    pub auto_closing_mode: Option<String>,
    /// Pin connected to the door switch.
    #[serde(alias = "doorSwitchPin")]
    pub door_switch_pin: Option<u32>,
    /// `input` or `output`.
    #[serde(alias = "initialGPIOMode")]
    pub initial_gpio_mode: Option<String>,
    /// `high` or `low`.
    #[serde(alias = "initialGPIOValue")]
    pub initial_gpio_value: Option<String>,
    /// Delay between pulse actions (seconds).
    #[serde(alias = "GPIOActionDelay")]
    pub gpio_action_delay: Option<f64>,
    /// Pulse sequence.
    #[serde(alias = "GPIOOpenActions")]
    pub gpio_open_actions: Option<Vec<RawGpioAction>>,
}

/// Sanitized door configuration. Immutable once the engine is built.
#[derive(Debug, Clone, PartialEq)]
pub struct DoorConfig {
    /// Accessory name.
    pub name: String,
    /// Log the effective configuration and motion completions.
    pub verbose: bool,
    /// Base log level.
    pub log_level: LogLevel,
    /// Full opening duration (seconds).
    pub simulate_time_opening: f64,
    /// Full closing duration (seconds).
    pub simulate_time_closing: f64,
    /// Delay after fully open before auto-close (seconds).
    pub auto_closing_delay: f64,
    /// Auto-close behavior.
    pub auto_closing_mode: AutoClosingMode,
    /// Pin connected to the door switch.
    pub door_switch_pin: u32,
    /// Pin direction applied when the pin is opened.
    pub initial_gpio_mode: PinMode,
    /// Pin level applied when the pin is opened.
    pub initial_gpio_value: PinLevel,
    /// Delay after each pulse action (seconds).
    pub gpio_action_delay: f64,
    /// Pulse sequence.
    pub gpio_open_actions: GpioActions,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            verbose: false,
            log_level: LogLevel::default(),
            simulate_time_opening: DEFAULT_SIMULATE_TIME_OPENING,
            simulate_time_closing: DEFAULT_SIMULATE_TIME_CLOSING,
            auto_closing_delay: DEFAULT_AUTO_CLOSING_DELAY,
            auto_closing_mode: AutoClosingMode::default(),
            door_switch_pin: DEFAULT_DOOR_SWITCH_PIN,
            initial_gpio_mode: PinMode::default(),
            initial_gpio_value: PinLevel::default(),
            gpio_action_delay: DEFAULT_GPIO_ACTION_DELAY,
            gpio_open_actions: default_open_actions(),
        }
    }
}

/// Default pulse: drive the switch high, then release it.
pub fn default_open_actions() -> GpioActions {
    [
        GpioAction::Write(PinLevel::High),
        GpioAction::Write(PinLevel::Low),
    ]
    .into_iter()
    .collect()
}

impl DoorConfig {
    /// Load, sanitize and validate a door configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading door configuration from {:?}", path);
        Self::from_raw(RawDoorConfig::load(path)?)
    }

    /// Sanitize and validate an in-memory TOML document.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Self::from_raw(RawDoorConfig::from_toml(content)?)
    }

    /// Build the typed configuration from its raw form.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the pulse sequence is
    /// malformed or a duration is negative, not finite or above
    /// `MAX_DURATION_SECS`.
    pub fn from_raw(raw: RawDoorConfig) -> Result<Self, ConfigError> {
        let gpio_open_actions = match raw.gpio_open_actions {
            Some(ref actions) => parse_actions(actions)?,
            None => default_open_actions(),
        };

        let config = Self {
            name: raw
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_NAME.to_string()),
            verbose: raw.verbose.unwrap_or(false),
            log_level: raw.log_level.unwrap_or_default(),
            simulate_time_opening: raw
                .simulate_time_opening
                .unwrap_or(DEFAULT_SIMULATE_TIME_OPENING),
            simulate_time_closing: raw
                .simulate_time_closing
                .unwrap_or(DEFAULT_SIMULATE_TIME_CLOSING),
            auto_closing_delay: raw.auto_closing_delay.unwrap_or(DEFAULT_AUTO_CLOSING_DELAY),
            auto_closing_mode: sanitize(
                "auto_closing_mode",
                raw.auto_closing_mode.as_deref(),
                AutoClosingMode::default(),
            ),
            door_switch_pin: raw.door_switch_pin.unwrap_or(DEFAULT_DOOR_SWITCH_PIN),
            initial_gpio_mode: sanitize(
                "initial_gpio_mode",
                raw.initial_gpio_mode.as_deref(),
                PinMode::default(),
            ),
            initial_gpio_value: sanitize(
                "initial_gpio_value",
                raw.initial_gpio_value.as_deref(),
                PinLevel::default(),
            ),
            gpio_action_delay: raw.gpio_action_delay.unwrap_or(DEFAULT_GPIO_ACTION_DELAY),
            gpio_open_actions,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the door configuration.
    ///
    /// # Validation Rules
    /// 1. All durations are finite, >= 0 and at most `MAX_DURATION_SECS`
    /// 2. The pulse sequence is not empty
    ///
    /// A duration of 0 is kept as-is (the motion completes on the next
    /// poll) rather than replaced by the default. An empty pulse sequence
    /// is rejected rather than accepted as a no-op.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("simulate_time_opening", self.simulate_time_opening),
            ("simulate_time_closing", self.simulate_time_closing),
            ("auto_closing_delay", self.auto_closing_delay),
            ("gpio_action_delay", self.gpio_action_delay),
        ];
        for (field, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{field} must be a non-negative number of seconds (got {value})"
                )));
            }
            if value > MAX_DURATION_SECS {
                return Err(ConfigError::ValidationError(format!(
                    "{field} must not exceed {MAX_DURATION_SECS} seconds (got {value})"
                )));
            }
        }

        if self.gpio_open_actions.is_empty() {
            return Err(ConfigError::ValidationError(
                "gpio_open_actions must contain at least one action".to_string(),
            ));
        }

        Ok(())
    }

    /// Full opening duration.
    pub fn opening_duration(&self) -> Duration {
        Duration::from_secs_f64(self.simulate_time_opening)
    }

    /// Full closing duration.
    pub fn closing_duration(&self) -> Duration {
        Duration::from_secs_f64(self.simulate_time_closing)
    }

    /// Auto-close delay.
    pub fn auto_closing_delay_duration(&self) -> Duration {
        Duration::from_secs_f64(self.auto_closing_delay)
    }

    /// Delay after each pulse action.
    pub fn action_delay(&self) -> Duration {
        Duration::from_secs_f64(self.gpio_action_delay)
    }

    /// Log the effective configuration.
    pub fn log_summary(&self) {
        info!("Verbose logging: {}", self.verbose);
        info!("Opening door time duration (sec): {}", self.simulate_time_opening);
        info!("Closing door time duration (sec): {}", self.simulate_time_closing);
        info!("Delay before autoclosing (sec): {}", self.auto_closing_delay);
        info!("Autoclosing mode: {}", self.auto_closing_mode);
        info!("Door switch pin: {}", self.door_switch_pin);
        info!("Initial GPIO mode: {}", self.initial_gpio_mode);
        info!("Initial GPIO value: {}", self.initial_gpio_value);
        let actions: Vec<String> = self.gpio_open_actions.iter().map(|a| a.to_string()).collect();
        info!("Open door GPIO actions: [{}]", actions.join(", "));
        info!("Delay between GPIO actions (sec): {}", self.gpio_action_delay);
    }
}

/// Parse an optional enumerated value, falling back to `default` when absent
/// or unknown.
fn sanitize<T>(field: &str, raw: Option<&str>, default: T) -> T
where
    T: FromStr<Err = UnknownVariant> + Display + Copy,
{
    let Some(value) = raw else {
        return default;
    };
    match value.parse() {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("{field}: {e}, using default '{default}'");
            default
        }
    }
}

/// Structural validation of the pulse sequence.
fn parse_actions(raw: &[RawGpioAction]) -> Result<GpioActions, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::ValidationError(
            "gpio_open_actions must contain at least one action".to_string(),
        ));
    }

    let mut actions = GpioActions::new();
    for (idx, item) in raw.iter().enumerate() {
        let invalid = |detail: String| {
            ConfigError::ValidationError(format!("gpio_open_actions[{idx}]: {detail}"))
        };

        let action = match item.kind.trim().to_ascii_lowercase().as_str() {
            "write" => GpioAction::Write(
                item.value
                    .parse::<PinLevel>()
                    .map_err(|e| invalid(format!("{e}, write expects HIGH or LOW")))?,
            ),
            "mode" => GpioAction::Mode(
                item.value
                    .parse::<PinMode>()
                    .map_err(|e| invalid(format!("{e}, mode expects INPUT or OUTPUT")))?,
            ),
            other => {
                return Err(invalid(format!(
                    "unknown action type '{other}', expected write or mode"
                )));
            }
        };

        actions.push(action).map_err(|_| {
            ConfigError::ValidationError(format!(
                "gpio_open_actions has more than {MAX_GPIO_ACTIONS} actions"
            ))
        })?;
    }

    Ok(actions)
}
