//! GPIO pin primitives.
//!
//! - `PinMode` / `PinLevel` - direction and logic level of a single line
//! - `GpioAction` - one step of the door switch pulse sequence

use crate::config::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinMode {
    /// Line is read.
    Input,
    /// Line is driven.
    #[default]
    Output,
}

impl fmt::Display for PinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinMode::Input => f.write_str("INPUT"),
            PinMode::Output => f.write_str("OUTPUT"),
        }
    }
}

impl FromStr for PinMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" | "in" => Ok(PinMode::Input),
            "output" | "out" => Ok(PinMode::Output),
            _ => Err(UnknownVariant::new("pin mode", s)),
        }
    }
}

/// Logic level of a GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinLevel {
    /// Logic 1.
    #[default]
    High,
    /// Logic 0.
    Low,
}

impl PinLevel {
    /// Level as a bit (`High` = 1).
    #[inline]
    pub const fn as_bit(self) -> u8 {
        match self {
            PinLevel::High => 1,
            PinLevel::Low => 0,
        }
    }
}

impl fmt::Display for PinLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinLevel::High => f.write_str("HIGH"),
            PinLevel::Low => f.write_str("LOW"),
        }
    }
}

impl FromStr for PinLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "1" => Ok(PinLevel::High),
            "low" | "0" => Ok(PinLevel::Low),
            _ => Err(UnknownVariant::new("pin level", s)),
        }
    }
}

/// One step of the pulse sequence sent to the door switch pin.
///
/// Serialized as `{ type = "write", value = "high" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum GpioAction {
    /// Drive the pin to a level.
    Write(PinLevel),
    /// Change the pin direction.
    Mode(PinMode),
}

impl fmt::Display for GpioAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioAction::Write(level) => write!(f, "write {level}"),
            GpioAction::Mode(mode) => write!(f, "mode {mode}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_mode_parse() {
        assert_eq!("INPUT".parse::<PinMode>(), Ok(PinMode::Input));
        assert_eq!("output".parse::<PinMode>(), Ok(PinMode::Output));
        assert!("HIGH".parse::<PinMode>().is_err());
    }

    #[test]
    fn test_pin_level_parse() {
        assert_eq!("HIGH".parse::<PinLevel>(), Ok(PinLevel::High));
        assert_eq!("low".parse::<PinLevel>(), Ok(PinLevel::Low));
        assert!("OUTPUT".parse::<PinLevel>().is_err());
    }

    #[test]
    fn test_defaults_match_initial_pin_setup() {
        assert_eq!(PinMode::default(), PinMode::Output);
        assert_eq!(PinLevel::default(), PinLevel::High);
        assert_eq!(PinLevel::High.as_bit(), 1);
        assert_eq!(PinLevel::Low.as_bit(), 0);
    }

    #[test]
    fn test_action_serde_shape() {
        #[derive(Debug, Serialize, Deserialize)]
        struct Wrapper {
            actions: Vec<GpioAction>,
        }

        let w: Wrapper = toml::from_str(
            r#"actions = [{ type = "write", value = "high" }, { type = "mode", value = "input" }]"#,
        )
        .unwrap();
        assert_eq!(
            w.actions,
            vec![GpioAction::Write(PinLevel::High), GpioAction::Mode(PinMode::Input)]
        );
    }

    #[test]
    fn test_action_display() {
        assert_eq!(GpioAction::Write(PinLevel::Low).to_string(), "write LOW");
        assert_eq!(GpioAction::Mode(PinMode::Output).to_string(), "mode OUTPUT");
    }
}
