//! Door motion engine.
//!
//! Tracks the physical door state against the requested target, pulses the
//! actuator and simulates open/close travel with timers.
//!
//! # State machine
//!
//! ```text
//!            open                      (timer)
//!   CLOSED ─────────► OPENING ───────────────────► OPEN
//!     ▲                 │  ▲                         │
//!     │ (timer)   close │  │ open                    │ close / auto-close
//!     │                 ▼  │                         ▼
//!     └─────────────── CLOSING ◄─────────────────────┘
//! ```
//!
//! | Request | Current  | Action                                         |
//! |---------|----------|------------------------------------------------|
//! | open    | CLOSED   | pulse, full opening                            |
//! | open    | OPEN     | pulse, full opening                            |
//! | open    | CLOSING  | pulse twice, opening for the estimated rest    |
//! | open    | OPENING  | ignored                                        |
//! | close   | OPEN     | pulse, full closing                            |
//! | close   | CLOSED   | pulse, full closing                            |
//! | close   | OPENING  | pulse twice, closing for the estimated rest    |
//! | close   | CLOSING  | ignored                                        |
//!
//! Every accepted command cancels all pending timers before anything new is
//! scheduled, so the last command always wins and at most one motion timer
//! plus one auto-close timer exist at any time.
//!
//! The engine is single-threaded: callers pass `now` into every operation
//! and drive timers with [`DoorEngine::poll`].

use crate::actuator::Actuator;
use crate::characteristics::DoorCharacteristics;
use crate::timers::TimerSet;
use garage_common::door::config::DoorConfig;
use garage_common::door::types::{AutoClosingMode, DoorState, TargetState};
use garage_common::gpio::driver::GpioError;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error types for door commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DoorError {
    /// The actuator pulse failed; the command was aborted.
    #[error("Actuator pulse failed: {0}")]
    Actuator(#[from] GpioError),
}

/// Events scheduled by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorTimer {
    /// Opening travel finished.
    Opened,
    /// Closing travel finished.
    Closed,
    /// Auto-close delay after reaching `Open` elapsed.
    AutoClose,
}

impl DoorTimer {
    /// True for motion-completion events.
    #[inline]
    pub const fn is_motion(self) -> bool {
        matches!(self, DoorTimer::Opened | DoorTimer::Closed)
    }
}

/// Result of an accepted or ignored command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandOutcome {
    /// A motion was started.
    Started {
        /// Motion state entered (`Opening` or `Closing`).
        state: DoorState,
        /// Travel time until the completion timer fires.
        duration: Duration,
        /// True if the command interrupted the opposite motion.
        forced: bool,
    },
    /// The request has no handling in the current state.
    Ignored,
}

/// When the last opening and closing commands were accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionRecord {
    /// Start of the last opening (shifted back after a forced reopen).
    pub last_opened: Option<Instant>,
    /// Start of the last commanded closing (shifted back after a forced reclose).
    pub last_closed: Option<Instant>,
}

/// Remaining travel after interrupting a motion.
///
/// `elapsed` seconds into a motion whose full length is `interrupted_full`,
/// reversing takes the same fraction of `reverse_full`. Returns `None` when
/// the interrupted motion had already logically completed
/// (`elapsed >= interrupted_full`), in which case the full reverse duration
/// applies.
pub fn remaining_after_interrupt(elapsed: f64, interrupted_full: f64, reverse_full: f64) -> Option<f64> {
    if elapsed < interrupted_full {
        Some(elapsed * reverse_full / interrupted_full)
    } else {
        None
    }
}

/// The door motion engine.
pub struct DoorEngine<A, S> {
    config: DoorConfig,
    actuator: A,
    store: S,
    state: DoorState,
    record: MotionRecord,
    timers: TimerSet<DoorTimer>,
}

impl<A: Actuator, S: DoorCharacteristics> DoorEngine<A, S> {
    /// Create an engine in `Closed` with target `Closed`.
    ///
    /// Both values are written to `store`.
    pub fn new(config: DoorConfig, actuator: A, mut store: S) -> Self {
        store.set_target(TargetState::Closed);
        store.set_current(DoorState::Closed);

        info!(
            "Door engine '{}' created: opening {}s, closing {}s, auto-close {} after {}s",
            config.name,
            config.simulate_time_opening,
            config.simulate_time_closing,
            config.auto_closing_mode,
            config.auto_closing_delay
        );

        Self {
            config,
            actuator,
            store,
            state: DoorState::Closed,
            record: MotionRecord::default(),
            timers: TimerSet::new(),
        }
    }

    /// Dispatch a target request to [`open`](Self::open) or [`close`](Self::close).
    pub fn request(&mut self, target: TargetState, now: Instant) -> Result<CommandOutcome, DoorError> {
        match target {
            TargetState::Open => self.open(now),
            TargetState::Closed => self.close(now),
        }
    }

    /// Handle an open request.
    ///
    /// # Errors
    /// `DoorError::Actuator` if a pulse fails. The door state and motion
    /// record are left untouched, but pending timers are already cancelled.
    pub fn open(&mut self, now: Instant) -> Result<CommandOutcome, DoorError> {
        let forced = match self.state {
            DoorState::Closed | DoorState::Open => false,
            DoorState::Closing => true,
            DoorState::Opening => {
                debug!("Open requested while already opening, ignoring");
                return Ok(CommandOutcome::Ignored);
            }
        };

        self.timers.cancel_all();
        self.actuator.pulse()?;

        let mut started = now;
        let mut travel = self.config.simulate_time_opening;
        if forced {
            info!("Garage was closing, forcing reopen");
            self.actuator.pulse()?;

            if let Some(closed_at) = self.record.last_closed {
                let elapsed = now.saturating_duration_since(closed_at).as_secs_f64();
                if let Some(remaining) = remaining_after_interrupt(
                    elapsed,
                    self.config.simulate_time_closing,
                    self.config.simulate_time_opening,
                ) {
                    info!(
                        "Calculated {:.3}s remaining (default: {}s) before opened",
                        remaining, self.config.simulate_time_opening
                    );
                    travel = remaining;
                    started = shift_back(now, remaining);
                }
            }
        }

        self.record.last_opened = Some(started);
        info!("Opening garage door...");
        let duration = secs(travel);
        self.begin_opening(now, duration);

        Ok(CommandOutcome::Started {
            state: DoorState::Opening,
            duration,
            forced,
        })
    }

    /// Handle a close request.
    ///
    /// # Errors
    /// `DoorError::Actuator` if a pulse fails. The door state and motion
    /// record are left untouched, but pending timers are already cancelled.
    pub fn close(&mut self, now: Instant) -> Result<CommandOutcome, DoorError> {
        let forced = match self.state {
            DoorState::Open | DoorState::Closed => false,
            DoorState::Opening => true,
            DoorState::Closing => {
                debug!("Close requested while already closing, ignoring");
                return Ok(CommandOutcome::Ignored);
            }
        };

        self.timers.cancel_all();
        self.actuator.pulse()?;

        let mut started = now;
        let mut travel = self.config.simulate_time_closing;
        if forced {
            info!("Garage was opening, forcing reclose");
            self.actuator.pulse()?;

            if let Some(opened_at) = self.record.last_opened {
                let elapsed = now.saturating_duration_since(opened_at).as_secs_f64();
                if let Some(remaining) = remaining_after_interrupt(
                    elapsed,
                    self.config.simulate_time_opening,
                    self.config.simulate_time_closing,
                ) {
                    info!(
                        "Calculated {:.3}s remaining (default: {}s) before closed",
                        remaining, self.config.simulate_time_closing
                    );
                    travel = remaining;
                    started = shift_back(now, remaining);
                }
            }
        }

        self.record.last_closed = Some(started);
        info!("Closing garage door...");
        let duration = secs(travel);
        self.begin_closing(now, duration);

        Ok(CommandOutcome::Started {
            state: DoorState::Closing,
            duration,
            forced,
        })
    }

    /// Fire every timer due at `now`, earliest first.
    ///
    /// Each event is handled as if it ran exactly at its own deadline, so a
    /// late poll replays motion and auto-close on the simulated timeline.
    /// Returns the number of events fired.
    ///
    /// # Errors
    /// Propagates an actuator failure from a forced auto-close. Events not
    /// yet fired stay pending only if they were scheduled after the failure;
    /// the failing close has already cancelled the rest.
    pub fn poll(&mut self, now: Instant) -> Result<usize, DoorError> {
        let mut fired = 0;
        while let Some((at, timer)) = self.timers.pop_due(now) {
            fired += 1;
            debug!(?timer, "timer fired");
            match timer {
                DoorTimer::Opened => self.complete_opening(at),
                DoorTimer::Closed => self.complete_closing(),
                DoorTimer::AutoClose => self.auto_close(at)?,
            }
        }
        Ok(fired)
    }

    /// Target state as reported to a remote reader.
    ///
    /// With auto-close enabled, a stored `Open` target whose opening started
    /// at least `auto_closing_delay` ago is reported as `Closed`, even if the
    /// auto-close timer has not fired yet. Nothing is mutated.
    pub fn target_state(&self, now: Instant) -> TargetState {
        let stored = self.store.target();
        if self.config.auto_closing_mode.is_enabled() && stored == TargetState::Open {
            if let Some(opened_at) = self.record.last_opened {
                let since_open = now.saturating_duration_since(opened_at).as_secs_f64();
                if since_open >= self.config.auto_closing_delay {
                    debug!("Reporting target state CLOSED past auto-close deadline");
                    return TargetState::Closed;
                }
            }
        }
        stored
    }

    /// Physical door state.
    #[inline]
    pub fn current_state(&self) -> DoorState {
        self.state
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Last accepted open/close timestamps.
    #[inline]
    pub fn motion_record(&self) -> MotionRecord {
        self.record
    }

    /// Pending timers.
    pub fn timers(&self) -> &TimerSet<DoorTimer> {
        &self.timers
    }

    /// Number of pending motion-completion timers (0 or 1).
    pub fn pending_motion_timers(&self) -> usize {
        self.timers.count_matching(|t| t.is_motion())
    }

    /// Number of pending auto-close timers (0 or 1).
    pub fn pending_auto_close_timers(&self) -> usize {
        self.timers.count_matching(|t| *t == DoorTimer::AutoClose)
    }

    /// Engine configuration.
    pub fn config(&self) -> &DoorConfig {
        &self.config
    }

    /// Actuator.
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Actuator, mutably.
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// Characteristic store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn begin_opening(&mut self, now: Instant, duration: Duration) {
        self.set_state(DoorState::Opening);
        self.timers.schedule(now, duration, DoorTimer::Opened);
    }

    fn begin_closing(&mut self, now: Instant, duration: Duration) {
        self.set_state(DoorState::Closing);
        self.store.set_target(TargetState::Closed);
        self.timers.schedule(now, duration, DoorTimer::Closed);
    }

    fn complete_opening(&mut self, at: Instant) {
        self.set_state(DoorState::Open);
        debug!("Garage is fully opened");

        if self.config.auto_closing_mode.is_enabled() {
            debug!("Garage should close in {}s", self.config.auto_closing_delay);
            self.timers
                .schedule(at, secs(self.config.auto_closing_delay), DoorTimer::AutoClose);
        }
    }

    fn complete_closing(&mut self) {
        self.set_state(DoorState::Closed);
        debug!("Garage is closed");
    }

    fn auto_close(&mut self, at: Instant) -> Result<(), DoorError> {
        match self.config.auto_closing_mode {
            AutoClosingMode::Force => {
                info!("Forcing auto closing...");
                self.close(at)?;
            }
            AutoClosingMode::SelfClose => {
                info!("Garage closing by itself...");
                self.begin_closing(at, secs(self.config.simulate_time_closing));
            }
            AutoClosingMode::None => {
                warn!("Auto-close timer fired with auto-closing disabled");
            }
        }
        Ok(())
    }

    fn set_state(&mut self, state: DoorState) {
        debug!("Door state {} -> {}", self.state, state);
        self.state = state;
        self.store.set_current(state);
    }
}

/// Seconds to `Duration`, saturating at `Duration::MAX` for values
/// `validate()` would have rejected.
fn secs(s: f64) -> Duration {
    Duration::try_from_secs_f64(s.max(0.0)).unwrap_or(Duration::MAX)
}

/// `now - seconds`, saturating at `now` if the monotonic clock cannot go back that far.
fn shift_back(now: Instant, seconds: f64) -> Instant {
    now.checked_sub(secs(seconds)).unwrap_or(now)
}
