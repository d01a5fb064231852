//! Line commands accepted by the `garage_door` binary on stdin.

use garage_common::door::types::TargetState;
use std::str::FromStr;
use thiserror::Error;

/// Parse failure for a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command '{0}' (try: open, close, target, current, status, info, quit)")]
pub struct UnknownCommand(pub String);

/// One operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorCommand {
    /// Remote write of the target characteristic.
    SetTarget(TargetState),
    /// Remote read of the target characteristic.
    GetTarget,
    /// Remote read of the current characteristic.
    GetCurrent,
    /// Engine snapshot: state, motion record, pending timers.
    Status,
    /// Accessory information.
    Info,
    /// Stop the runtime.
    Quit,
}

impl FromStr for DoorCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim().to_ascii_lowercase();
        let mut words = line.split_whitespace();
        let cmd = match (words.next(), words.next()) {
            (Some("open"), None) => DoorCommand::SetTarget(TargetState::Open),
            (Some("close"), None) => DoorCommand::SetTarget(TargetState::Closed),
            (Some("target"), None) => DoorCommand::GetTarget,
            (Some("target"), Some(value)) => DoorCommand::SetTarget(
                value
                    .parse()
                    .map_err(|_| UnknownCommand(s.trim().to_string()))?,
            ),
            (Some("current"), None) => DoorCommand::GetCurrent,
            (Some("status"), None) => DoorCommand::Status,
            (Some("info"), None) => DoorCommand::Info,
            (Some("quit" | "exit"), None) => DoorCommand::Quit,
            _ => return Err(UnknownCommand(s.trim().to_string())),
        };
        if words.next().is_some() {
            return Err(UnknownCommand(s.trim().to_string()));
        }
        Ok(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> DoorCommand {
        line.parse().expect("valid command")
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse("open"), DoorCommand::SetTarget(TargetState::Open));
        assert_eq!(parse(" Close \n"), DoorCommand::SetTarget(TargetState::Closed));
        assert_eq!(parse("target"), DoorCommand::GetTarget);
        assert_eq!(parse("target open"), DoorCommand::SetTarget(TargetState::Open));
        assert_eq!(parse("target closed"), DoorCommand::SetTarget(TargetState::Closed));
        assert_eq!(parse("current"), DoorCommand::GetCurrent);
        assert_eq!(parse("status"), DoorCommand::Status);
        assert_eq!(parse("info"), DoorCommand::Info);
        assert_eq!(parse("exit"), DoorCommand::Quit);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            "jump".parse::<DoorCommand>(),
            Err(UnknownCommand("jump".to_string()))
        );
        assert!("target ajar".parse::<DoorCommand>().is_err());
        assert!("open now".parse::<DoorCommand>().is_err());
        assert!("".parse::<DoorCommand>().is_err());
    }
}
