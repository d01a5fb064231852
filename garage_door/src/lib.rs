//! # Garage Door Library
//!
//! Simulated garage door opener: a timed door motion engine driving a
//! GPIO pulse actuator, exposed through an accessory facade.
//!
//! There is no position sensor. The engine infers door position purely from
//! elapsed time since the last accepted command.
//!
//! # Module Structure
//!
//! - [`accessory`] - Remote-facing facade (target/current characteristics)
//! - [`engine`] - Door state machine, motion timing, auto-close
//! - [`timers`] - Cancelable delayed events
//! - [`actuator`] - Pulse sequence on the door switch pin
//! - [`characteristics`] - Characteristic store with change subscribers
//! - [`drivers`] - GPIO backend implementations and name lookup
//! - [`command`] - Operator line commands
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         garage_door                              │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────────────┐  │
//! │  │  Accessory  │───►│  DoorEngine  │───►│  Characteristics    │  │
//! │  │  (facade)   │    │              │    │  (subscribers)      │  │
//! │  └─────────────┘    └──┬────────┬──┘    └─────────────────────┘  │
//! │                        │        │                                │
//! │                        ▼        ▼                                │
//! │              ┌──────────┐   ┌──────────────┐                     │
//! │              │ TimerSet │   │ GpioActuator │                     │
//! │              └──────────┘   └──────┬───────┘                     │
//! │                                    ▼                             │
//! │                          ┌──────────────────┐                    │
//! │                          │ GpioBackend      │ (trait object)     │
//! │                          │ simulation/sysfs │                    │
//! │                          └──────────────────┘                    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod accessory;
pub mod actuator;
pub mod characteristics;
pub mod command;
pub mod drivers;
pub mod engine;
pub mod timers;

// Re-export key types for convenience
pub use crate::accessory::{AccessoryInformation, GarageDoorAccessory};
pub use crate::actuator::{Actuator, GpioActuator};
pub use crate::characteristics::{CharacteristicChange, CharacteristicStore, DoorCharacteristics};
pub use crate::engine::{CommandOutcome, DoorEngine, DoorError, DoorTimer, MotionRecord};
pub use crate::drivers::GpioRegistry;
pub use crate::timers::{TimerHandle, TimerSet};
