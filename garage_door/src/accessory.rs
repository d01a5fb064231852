//! Garage door accessory facade.
//!
//! Translates remote get/set requests on the target characteristic into
//! engine calls. Current-state changes reach remote readers through the
//! characteristic store the engine writes to.

use crate::actuator::Actuator;
use crate::characteristics::{CharacteristicStore, DoorCharacteristics};
use crate::engine::{CommandOutcome, DoorEngine, DoorError};
use garage_common::consts::{ACCESSORY_MANUFACTURER, ACCESSORY_MODEL, ACCESSORY_SERIAL_NUMBER};
use garage_common::door::config::DoorConfig;
use garage_common::door::types::{DoorState, TargetState};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

/// Static accessory identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessoryInformation {
    /// Display name from the configuration.
    pub name: String,
    /// Manufacturer string.
    pub manufacturer: &'static str,
    /// Model string.
    pub model: &'static str,
    /// Serial number.
    pub serial_number: &'static str,
}

impl AccessoryInformation {
    /// Information block for an accessory called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: ACCESSORY_MANUFACTURER,
            model: ACCESSORY_MODEL,
            serial_number: ACCESSORY_SERIAL_NUMBER,
        }
    }
}

/// A simulated garage door opener accessory.
pub struct GarageDoorAccessory<A, S = CharacteristicStore> {
    information: AccessoryInformation,
    engine: DoorEngine<A, S>,
}

impl<A: Actuator, S: DoorCharacteristics> GarageDoorAccessory<A, S> {
    /// Build the accessory and its engine.
    pub fn new(config: DoorConfig, actuator: A, store: S) -> Self {
        if config.verbose {
            config.log_summary();
        }
        let information = AccessoryInformation::new(config.name.clone());
        Self {
            information,
            engine: DoorEngine::new(config, actuator, store),
        }
    }

    /// Target state as seen by a remote reader.
    pub fn get_target_state(&self, now: Instant) -> TargetState {
        self.engine.target_state(now)
    }

    /// Remote write of the target state.
    ///
    /// Timers due at `now` fire first, so the request is judged against
    /// the door state at `now`. The characteristic is then updated and the
    /// engine runs the transition for `target`.
    pub fn set_target_state(
        &mut self,
        target: TargetState,
        now: Instant,
    ) -> Result<CommandOutcome, DoorError> {
        self.engine.poll(now)?;
        info!("Target state set to {target}");
        self.engine.store_mut().set_target(target);

        let outcome = self.engine.request(target, now);
        match &outcome {
            Ok(CommandOutcome::Ignored) => {
                warn!(
                    "Target {target} ignored while door is {}",
                    self.engine.current_state()
                );
            }
            Err(e) => warn!("Target {target} failed: {e}"),
            Ok(CommandOutcome::Started { .. }) => {}
        }
        outcome
    }

    /// Physical door state.
    pub fn get_current_state(&self) -> DoorState {
        self.engine.current_state()
    }

    /// Fire due timers. See [`DoorEngine::poll`].
    pub fn poll(&mut self, now: Instant) -> Result<usize, DoorError> {
        self.engine.poll(now)
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.engine.next_deadline()
    }

    /// Accessory identification.
    pub fn information(&self) -> &AccessoryInformation {
        &self.information
    }

    /// Underlying engine.
    pub fn engine(&self) -> &DoorEngine<A, S> {
        &self.engine
    }

    /// Underlying engine, mutably.
    pub fn engine_mut(&mut self) -> &mut DoorEngine<A, S> {
        &mut self.engine
    }
}
