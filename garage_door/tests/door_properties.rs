//! Property tests: arbitrary open/close sequences at arbitrary times never
//! produce a current-state change outside the allowed door edges.

use garage_common::door::config::DoorConfig;
use garage_common::door::types::{AutoClosingMode, DoorState, TargetState};
use garage_door::characteristics::{CharacteristicChange, CharacteristicStore};
use garage_door::drivers::simulation::SimulatedGpio;
use garage_door::{GarageDoorAccessory, GpioActuator};
use proptest::prelude::*;
use std::time::{Duration, Instant};

fn allowed(from: DoorState, to: DoorState) -> bool {
    use DoorState::*;
    matches!(
        (from, to),
        (Closed, Opening)
            | (Closed, Closing)
            | (Open, Opening)
            | (Open, Closing)
            | (Opening, Open)
            | (Opening, Closing)
            | (Closing, Closed)
            | (Closing, Opening)
    )
}

fn auto_closing_mode() -> impl Strategy<Value = AutoClosingMode> {
    prop_oneof![
        Just(AutoClosingMode::None),
        Just(AutoClosingMode::SelfClose),
        Just(AutoClosingMode::Force),
    ]
}

/// `(open?, milliseconds since the previous command)`.
fn commands() -> impl Strategy<Value = Vec<(bool, u64)>> {
    prop::collection::vec((any::<bool>(), 0u64..40_000), 1..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn current_state_only_follows_allowed_edges(
        mode in auto_closing_mode(),
        steps in commands(),
        poll_between in any::<bool>(),
    ) {
        let config = DoorConfig {
            auto_closing_mode: mode,
            ..DoorConfig::default()
        };
        let mut actuator = GpioActuator::from_config(SimulatedGpio::new().with_sleep(false), &config);
        actuator.init().expect("pin opens");
        let mut store = CharacteristicStore::new();
        let rx = store.subscribe();
        let mut accessory = GarageDoorAccessory::new(config, actuator, store);

        let t0 = Instant::now();
        let mut t = t0;
        for (open, offset_ms) in steps {
            t += Duration::from_millis(offset_ms);
            if poll_between {
                accessory.poll(t).expect("poll");
            }
            let target = if open { TargetState::Open } else { TargetState::Closed };
            accessory.set_target_state(target, t).expect("request");

            let engine = accessory.engine();
            prop_assert!(engine.pending_motion_timers() <= 1);
            prop_assert!(engine.pending_auto_close_timers() <= 1);
        }
        // Long enough for any motion plus auto-close plus the closing after it.
        accessory.poll(t + Duration::from_secs(120)).expect("poll");
        prop_assert!(!accessory.get_current_state().is_moving());

        let states: Vec<DoorState> = rx
            .try_iter()
            .filter_map(|c| match c {
                CharacteristicChange::Current(s) => Some(s),
                CharacteristicChange::Target(_) => None,
            })
            .collect();
        prop_assert_eq!(states.first(), Some(&DoorState::Closed));
        for pair in states.windows(2) {
            prop_assert!(allowed(pair[0], pair[1]), "{:?} -> {:?} in {:?}", pair[0], pair[1], states);
        }
    }
}
