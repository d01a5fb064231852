//! GPIO primitives and backend contract.
//!
//! The door actuator only needs two pin operations (`write`, `mode`) plus a
//! blocking pacing sleep; everything hardware-specific lives behind
//! [`driver::GpioBackend`].

pub mod driver;
pub mod types;
