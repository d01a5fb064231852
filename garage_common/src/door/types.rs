//! Door state enumerations.
//!
//! - `DoorState` - physical state tracked by the door motion engine
//! - `TargetState` - requested state held by the accessory characteristic
//! - `AutoClosingMode` - behavior once the door has been fully open for a while

use crate::config::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical state of the door.
///
/// Every open passes through `Opening` and every close through `Closing`;
/// there is no direct `Closed` ↔ `Open` edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorState {
    /// Fully open.
    Open,
    /// Fully closed.
    Closed,
    /// Moving towards `Open`.
    Opening,
    /// Moving towards `Closed`.
    Closing,
}

impl DoorState {
    /// True while a simulated motion is in progress.
    #[inline]
    pub const fn is_moving(self) -> bool {
        matches!(self, DoorState::Opening | DoorState::Closing)
    }

    /// State reached once the current motion completes, or `self` at rest.
    pub const fn resting(self) -> DoorState {
        match self {
            DoorState::Opening | DoorState::Open => DoorState::Open,
            DoorState::Closing | DoorState::Closed => DoorState::Closed,
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DoorState::Open => "OPEN",
            DoorState::Closed => "CLOSED",
            DoorState::Opening => "OPENING",
            DoorState::Closing => "CLOSING",
        };
        f.write_str(s)
    }
}

/// Requested door state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetState {
    /// Door should be open.
    Open,
    /// Door should be closed.
    Closed,
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetState::Open => f.write_str("OPEN"),
            TargetState::Closed => f.write_str("CLOSED"),
        }
    }
}

impl FromStr for TargetState {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(TargetState::Open),
            "closed" | "close" => Ok(TargetState::Closed),
            _ => Err(UnknownVariant::new("target state", s)),
        }
    }
}

/// What happens once the door has been fully open for `auto_closing_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoClosingMode {
    /// Door stays open until commanded.
    #[default]
    None,
    /// Door closes on its own (gravity/spring); no pulse is issued.
    #[serde(rename = "self")]
    SelfClose,
    /// A regular close command is issued, pulsing the actuator.
    Force,
}

impl AutoClosingMode {
    /// True unless auto-closing is disabled.
    #[inline]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, AutoClosingMode::None)
    }
}

impl fmt::Display for AutoClosingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoClosingMode::None => f.write_str("none"),
            AutoClosingMode::SelfClose => f.write_str("self"),
            AutoClosingMode::Force => f.write_str("force"),
        }
    }
}

impl FromStr for AutoClosingMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(AutoClosingMode::None),
            "self" => Ok(AutoClosingMode::SelfClose),
            "force" => Ok(AutoClosingMode::Force),
            _ => Err(UnknownVariant::new("auto closing mode", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_states() {
        assert!(DoorState::Opening.is_moving());
        assert!(DoorState::Closing.is_moving());
        assert!(!DoorState::Open.is_moving());
        assert!(!DoorState::Closed.is_moving());
    }

    #[test]
    fn test_resting_state() {
        assert_eq!(DoorState::Opening.resting(), DoorState::Open);
        assert_eq!(DoorState::Closing.resting(), DoorState::Closed);
        assert_eq!(DoorState::Closed.resting(), DoorState::Closed);
    }

    #[test]
    fn test_auto_closing_mode_parse() {
        assert_eq!("force".parse::<AutoClosingMode>(), Ok(AutoClosingMode::Force));
        assert_eq!("SELF".parse::<AutoClosingMode>(), Ok(AutoClosingMode::SelfClose));
        assert_eq!(" none ".parse::<AutoClosingMode>(), Ok(AutoClosingMode::None));

        let err = "sometimes".parse::<AutoClosingMode>().unwrap_err();
        assert_eq!(err.value, "sometimes");
        assert!(err.to_string().contains("auto closing mode"));
    }

    #[test]
    fn test_target_state_parse() {
        assert_eq!("open".parse::<TargetState>(), Ok(TargetState::Open));
        assert_eq!("Closed".parse::<TargetState>(), Ok(TargetState::Closed));
        assert!("ajar".parse::<TargetState>().is_err());
    }

    #[test]
    fn test_serde_names() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Wrapper {
            mode: AutoClosingMode,
            state: DoorState,
        }

        let w: Wrapper = toml::from_str("mode = \"self\"\nstate = \"closing\"").unwrap();
        assert_eq!(w.mode, AutoClosingMode::SelfClose);
        assert_eq!(w.state, DoorState::Closing);
    }
}
