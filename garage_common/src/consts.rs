//! Workspace-wide defaults and limits.
//!
//! Single source of truth for default durations, pin numbers and bounds.
//! Imported by all crates.

use static_assertions::const_assert;

/// Default accessory name.
pub const DEFAULT_NAME: &str = "SimpleGarageDoorOpener";

/// Default full opening duration in seconds.
pub const DEFAULT_SIMULATE_TIME_OPENING: f64 = 15.0;

/// Default full closing duration in seconds.
pub const DEFAULT_SIMULATE_TIME_CLOSING: f64 = 15.0;

/// Default delay after fully open before auto-close fires, in seconds.
pub const DEFAULT_AUTO_CLOSING_DELAY: f64 = 30.0;

/// Default pin driving the door switch.
pub const DEFAULT_DOOR_SWITCH_PIN: u32 = 12;

/// Default delay between successive GPIO actions, in seconds.
pub const DEFAULT_GPIO_ACTION_DELAY: f64 = 0.5;

/// Upper bound for any configured duration in seconds (30 days).
pub const MAX_DURATION_SECS: f64 = 30.0 * 24.0 * 3600.0;

/// Maximum number of actions in one pulse sequence.
pub const MAX_GPIO_ACTIONS: usize = 16;

/// Default sysfs GPIO root used by the sysfs backend.
pub const DEFAULT_SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// Accessory manufacturer reported by the information service.
pub const ACCESSORY_MANUFACTURER: &str = "Simple Garage Door";

/// Accessory model reported by the information service.
pub const ACCESSORY_MODEL: &str = "A Remote Control";

/// Accessory serial number reported by the information service.
pub const ACCESSORY_SERIAL_NUMBER: &str = "0711";

// The default pulse is a two-step write sequence.
const_assert!(MAX_GPIO_ACTIONS >= 2);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        assert!(DEFAULT_SIMULATE_TIME_OPENING > 0.0);
        assert!(DEFAULT_SIMULATE_TIME_CLOSING > 0.0);
        assert!(DEFAULT_AUTO_CLOSING_DELAY > 0.0);
        assert!(DEFAULT_GPIO_ACTION_DELAY >= 0.0);
        assert!(!DEFAULT_NAME.is_empty());
    }
}
